//! Explicit query cache for contract reads.
//!
//! Every read of the FriendFi contract goes through one declared [`QueryKey`].
//! Each key belongs to a fixed TTL class derived from how quickly the
//! underlying value can change on chain. Concurrent callers of the same key
//! share a single in-flight fetch, and writes invalidate their dependent keys
//! explicitly. There is no background refresh; staleness is bounded by the
//! TTL alone.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::Address;
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::FriendFiError;
use crate::types::MessageDirection;

/// Cache identity for a single contract read.
///
/// The key space is closed: a read that is not representable here does not
/// get cached. Address-scoped variants carry the queried address so two
/// users never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum QueryKey {
    Owner,
    MinStakeAmount,
    RewardRate,
    RewardInterval,
    RewardToken,
    StakedAmount(Address),
    Username(Address),
    HasUsername(Address),
    MessageCount(Address),
    TipStats(Address),
    Stake(Address),
    LastActive(Address),
    Activity(Address),
    SentMessages(Address),
    ReceivedMessages(Address),
    Message(u64),
    MessageAt {
        user: Address,
        index: u64,
        direction: MessageDirection,
    },
    Rewards(Address),
    ActiveUsers,
    ActiveUserCount,
    TotalMessages,
    IsActiveUser(Address),
    AllUsersInfo,
    NativeBalance(Address),
}

impl QueryKey {
    pub(crate) fn ttl_class(&self) -> TtlClass {
        match self {
            QueryKey::AllUsersInfo | QueryKey::NativeBalance(_) => TtlClass::Fast,
            QueryKey::StakedAmount(_)
            | QueryKey::Stake(_)
            | QueryKey::MessageCount(_)
            | QueryKey::TipStats(_)
            | QueryKey::LastActive(_)
            | QueryKey::Activity(_)
            | QueryKey::SentMessages(_)
            | QueryKey::ReceivedMessages(_)
            | QueryKey::Rewards(_)
            | QueryKey::ActiveUsers
            | QueryKey::ActiveUserCount
            | QueryKey::TotalMessages
            | QueryKey::IsActiveUser(_) => TtlClass::Standard,
            QueryKey::Owner
            | QueryKey::Username(_)
            | QueryKey::HasUsername(_)
            | QueryKey::Message(_)
            | QueryKey::MessageAt { .. } => TtlClass::Slow,
            QueryKey::MinStakeAmount
            | QueryKey::RewardRate
            | QueryKey::RewardInterval
            | QueryKey::RewardToken => TtlClass::Static,
        }
    }
}

/// How long a cached snapshot stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TtlClass {
    /// Balances and the user directory.
    Fast,
    /// Stakes, counters, activity and message-id lists.
    Standard,
    /// Owner, usernames and individual message lookups.
    Slow,
    /// Contract parameters that only change through admin writes.
    Static,
}

impl TtlClass {
    pub(crate) fn duration(&self) -> Duration {
        match self {
            TtlClass::Fast => Duration::from_secs(5),
            TtlClass::Standard => Duration::from_secs(30),
            TtlClass::Slow => Duration::from_secs(60),
            TtlClass::Static => Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

/// Shared read-through cache over the chain client.
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    // One permit per key serializes fetches for that key.
    guards: DashMap<QueryKey, Arc<Semaphore>>,
}

impl QueryCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
            guards: DashMap::new(),
        }
    }

    /// Returns the cached value for `key` when fresh, otherwise runs `fetch`
    /// and stores the result. Only one fetch per key is in flight at a time;
    /// callers that arrive while a fetch runs await it and read its result
    /// instead of issuing their own.
    ///
    /// Fetch errors propagate to the caller that hit them and are never
    /// stored.
    pub(crate) async fn get_or_fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        fetch: F,
    ) -> Result<T, FriendFiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FriendFiError>>,
    {
        if let Some(value) = self.fresh_value(&key) {
            return Ok(serde_json::from_value(value)?);
        }

        let guard = self
            .guards
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone();
        let _permit = guard.acquire_owned().await.map_err(|_| {
            FriendFiError::Cache("Failed to acquire query guard permit".to_string())
        })?;

        // Another caller may have completed its fetch while this task waited
        // for the permit.
        if let Some(value) = self.fresh_value(&key) {
            return Ok(serde_json::from_value(value)?);
        }

        let fetched = fetch().await?;
        let snapshot = serde_json::to_value(&fetched)?;
        let ttl = key.ttl_class().duration();
        self.entries.insert(
            key,
            CacheEntry {
                value: snapshot,
                stored_at: Instant::now(),
                ttl,
            },
        );
        Ok(fetched)
    }

    /// Drops the given keys immediately. Missing keys are ignored.
    pub(crate) fn invalidate(&self, keys: &[QueryKey]) {
        let mut removed = 0;
        for key in keys {
            if self.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!("Invalidated {} cached queries", removed);
        }
    }

    /// Drops every entry. Used when the session changes hands.
    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    fn fresh_value(&self, key: &QueryKey) -> Option<Value> {
        let entry = self.entries.get(key)?;
        entry.is_fresh().then(|| entry.value.clone())
    }

    #[cfg(test)]
    pub(crate) fn insert_with_ttl(&self, key: QueryKey, value: Value, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }
}
