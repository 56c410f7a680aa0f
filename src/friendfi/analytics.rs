//! Usage numbers: the profile dashboard and the analytics view.
//!
//! Everything here is derived from contract counters and the already
//! cached message lists. Reads degrade to zeros and empty lists; only a
//! missing session is an error.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chain::abi::{DirectoryEntry, TipStats, UserActivity};
use crate::error::{FriendFiError, Result};
use crate::friendfi::FriendFi;
use crate::friendfi::cache::QueryKey;
use crate::friendfi::conversation::relative_time_label;
use crate::friendfi::sanitizer;
use crate::types::{Message, MessageDirection};

const RECENT_ACTIVITY_LIMIT: usize = 4;
const TOP_FRIENDS_LIMIT: usize = 5;

/// The connected wallet's profile numbers in one place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub staked_amount: U256,
    pub accrued_rewards: U256,
    pub native_balance: U256,
    pub message_count: u64,
    pub tips_sent: U256,
    pub tips_received: U256,
    /// Unix seconds of the wallet's last contract interaction, zero when
    /// it never interacted.
    pub last_active_seconds: u64,
}

/// One row of the recent-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntry {
    pub direction: MessageDirection,
    pub counterparty: Address,
    /// Filtered display name of the counterparty.
    pub counterparty_label: String,
    pub tip_amount: U256,
    pub timestamp_seconds: u64,
    pub relative_time: String,
}

/// A messaged counterparty ranked by their stake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopFriend {
    pub address: Address,
    pub username: String,
    pub staked_amount: U256,
    pub messages_exchanged: u64,
}

/// The analytics view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsSummary {
    /// Share of all platform messages sent by this user, in percent
    /// rounded to one decimal place.
    pub engagement_rate: f64,
    pub total_tips: U256,
    pub recent_activity: Vec<ActivityEntry>,
    pub top_friends: Vec<TopFriend>,
    pub total_messages: u64,
    pub active_users: u64,
}

impl FriendFi {
    /// The connected wallet's dashboard numbers.
    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        let (account, _signer) = self.connected_session().await?;
        let address = account.address;

        let (activity, staked_amount, accrued_rewards, native_balance) = tokio::join!(
            self.cached_activity(address),
            self.staked_amount(),
            self.accrued_rewards(),
            self.native_balance(),
        );

        Ok(DashboardSummary {
            staked_amount,
            accrued_rewards,
            native_balance,
            message_count: activity.message_count,
            tips_sent: activity.tips_sent,
            tips_received: activity.tips_received,
            last_active_seconds: activity.last_active_seconds,
        })
    }

    /// The analytics view for the connected wallet: engagement share,
    /// recent exchanges, the top staked friends, and platform totals.
    pub async fn analytics(&self) -> Result<AnalyticsSummary> {
        let (account, _signer) = self.connected_session().await?;
        let address = account.address;

        let (activity, sent, received, total_messages, active_users, directory) = tokio::join!(
            self.cached_activity(address),
            self.sent_messages(address),
            self.received_messages(address),
            self.total_messages(),
            self.active_user_count(),
            self.cached_directory(),
        );
        let sent = sent.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::analytics", "sent messages unavailable: {}", e);
            Vec::new()
        });
        let received = received.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::analytics", "received messages unavailable: {}", e);
            Vec::new()
        });
        let directory = directory.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::analytics", "user directory unavailable: {}", e);
            Vec::new()
        });

        let now_seconds = Utc::now().timestamp().max(0) as u64;
        let mut recent_activity = Vec::with_capacity(RECENT_ACTIVITY_LIMIT);
        for (direction, message) in merge_recent(&sent, &received, RECENT_ACTIVITY_LIMIT) {
            let counterparty = match direction {
                MessageDirection::Sent => message.receiver,
                MessageDirection::Received => message.sender,
            };
            let username = self.cached_username(counterparty).await;
            recent_activity.push(ActivityEntry {
                direction,
                counterparty,
                counterparty_label: sanitizer::display_username(&counterparty, username.as_deref()),
                tip_amount: message.tip_amount,
                timestamp_seconds: message.timestamp_seconds,
                relative_time: relative_time_label(message.timestamp_seconds, now_seconds),
            });
        }

        Ok(AnalyticsSummary {
            engagement_rate: engagement_rate(activity.message_count, total_messages),
            total_tips: activity.tips_sent + activity.tips_received,
            recent_activity,
            top_friends: top_friends(address, &directory, &sent, &received),
            total_messages,
            active_users,
        })
    }

    /// Activity counters for any address, via the public mapping getter.
    /// Zeroed counters when the read fails.
    pub async fn user_activity(&self, address: Address) -> UserActivity {
        self.cache
            .get_or_fetch(QueryKey::Activity(address), || async move {
                self.chain
                    .user_activity_by_address(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    target: "friendfi::analytics",
                    "activity read failed for {:#x}: {}",
                    address,
                    e
                );
                zeroed_activity()
            })
    }

    /// Total messages sent across the platform. Zero when the read fails.
    pub async fn total_messages(&self) -> u64 {
        self.cache
            .get_or_fetch(QueryKey::TotalMessages, || async move {
                self.chain
                    .total_messages()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "friendfi::analytics", "total messages read failed: {}", e);
                0
            })
    }

    /// Number of addresses that have interacted with the contract. Zero
    /// when the read fails.
    pub async fn active_user_count(&self) -> u64 {
        self.cache
            .get_or_fetch(QueryKey::ActiveUserCount, || async move {
                self.chain
                    .active_user_count()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "friendfi::analytics", "active user count read failed: {}", e);
                0
            })
    }

    /// The combined per-user counters, with per-field reads as the
    /// fallback when the combined call fails.
    pub(crate) async fn cached_activity(&self, address: Address) -> UserActivity {
        let combined = self
            .cache
            .get_or_fetch(QueryKey::Activity(address), || async move {
                self.chain
                    .user_activity(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await;
        match combined {
            Ok(activity) => activity,
            Err(e) => {
                tracing::debug!(
                    target: "friendfi::analytics",
                    "combined activity read failed for {:#x}, using field reads: {}",
                    address,
                    e
                );
                self.activity_from_field_reads(address).await
            }
        }
    }

    async fn activity_from_field_reads(&self, address: Address) -> UserActivity {
        let (message_count, tips, last_active_seconds, staked_amount) = tokio::join!(
            self.cached_message_count(address),
            self.cached_tip_stats(address),
            self.cached_last_active(address),
            async {
                self.cache
                    .get_or_fetch(QueryKey::StakedAmount(address), || async move {
                        self.chain
                            .staked_amount(address)
                            .await
                            .map_err(FriendFiError::from)
                    })
                    .await
                    .unwrap_or(U256::ZERO)
            },
        );
        UserActivity {
            message_count,
            tips_sent: tips.sent,
            tips_received: tips.received,
            last_active_seconds,
            staked_amount,
        }
    }

    async fn cached_message_count(&self, address: Address) -> u64 {
        self.cache
            .get_or_fetch(QueryKey::MessageCount(address), || async move {
                self.chain
                    .message_count(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_default()
    }

    async fn cached_tip_stats(&self, address: Address) -> TipStats {
        self.cache
            .get_or_fetch(QueryKey::TipStats(address), || async move {
                self.chain
                    .tip_stats(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or(TipStats {
                sent: U256::ZERO,
                received: U256::ZERO,
            })
    }

    async fn cached_last_active(&self, address: Address) -> u64 {
        self.cache
            .get_or_fetch(QueryKey::LastActive(address), || async move {
                self.chain
                    .last_active(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_default()
    }
}

fn zeroed_activity() -> UserActivity {
    UserActivity {
        message_count: 0,
        tips_sent: U256::ZERO,
        tips_received: U256::ZERO,
        last_active_seconds: 0,
        staked_amount: U256::ZERO,
    }
}

/// Share of all platform messages sent by this user, in percent rounded
/// to one decimal place. Zero when the platform has no messages.
fn engagement_rate(user_messages: u64, total_messages: u64) -> f64 {
    if total_messages == 0 {
        return 0.0;
    }
    let percent = user_messages as f64 / total_messages as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

/// The newest `limit` records across both directions, newest first.
fn merge_recent(
    sent: &[Message],
    received: &[Message],
    limit: usize,
) -> Vec<(MessageDirection, Message)> {
    let mut merged: Vec<(MessageDirection, Message)> =
        Vec::with_capacity(sent.len() + received.len());
    merged.extend(
        sent.iter()
            .cloned()
            .map(|message| (MessageDirection::Sent, message)),
    );
    merged.extend(
        received
            .iter()
            .cloned()
            .map(|message| (MessageDirection::Received, message)),
    );
    merged.sort_by(|a, b| b.1.timestamp_seconds.cmp(&a.1.timestamp_seconds));
    merged.truncate(limit);
    merged
}

/// Messaged counterparties ranked by stake. Directory users the wallet
/// never exchanged messages with do not qualify.
fn top_friends(
    current_user: Address,
    directory: &[DirectoryEntry],
    sent: &[Message],
    received: &[Message],
) -> Vec<TopFriend> {
    let mut friends: Vec<TopFriend> = directory
        .iter()
        .filter(|entry| entry.address != current_user)
        .filter_map(|entry| {
            let exchanged = count_exchanges(entry.address, sent, received);
            (exchanged > 0).then(|| TopFriend {
                address: entry.address,
                username: sanitizer::display_username(&entry.address, Some(entry.username.as_str())),
                staked_amount: entry.staked_amount,
                messages_exchanged: exchanged,
            })
        })
        .collect();
    friends.sort_by(|a, b| b.staked_amount.cmp(&a.staked_amount));
    friends.truncate(TOP_FRIENDS_LIMIT);
    friends
}

fn count_exchanges(counterparty: Address, sent: &[Message], received: &[Message]) -> u64 {
    let sent_count = sent
        .iter()
        .filter(|message| message.receiver == counterparty)
        .count();
    let received_count = received
        .iter()
        .filter(|message| message.sender == counterparty)
        .count();
    (sent_count + received_count) as u64
}
