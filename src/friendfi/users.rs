//! Usernames, the friends list, and the user directory.
//!
//! Registration runs the same validate, submit, notify pipeline as the
//! message sender. List reads degrade per source: a combined directory
//! read that fails falls back to the active-user set enriched one user
//! at a time, and message history failures leave that side of the
//! listing empty rather than erroring.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use futures::future::join_all;

use crate::chain::abi::DirectoryEntry;
use crate::chain::publisher::TransactionOutcome;
use crate::error::{FriendFiError, Result};
use crate::friendfi::FriendFi;
use crate::friendfi::accounts::Account;
use crate::friendfi::cache::QueryKey;
use crate::friendfi::conversation::FriendListing;
use crate::friendfi::operations::Operation;
use crate::friendfi::sanitizer::{self, sanitize};
use crate::types::Message;

/// Shortest username registration accepts.
pub const MIN_USERNAME_LENGTH: usize = 3;

impl FriendFi {
    /// Registers `username` for the connected wallet.
    ///
    /// The name is trimmed and validated before anything is signed. On
    /// success the cached name reads are dropped and the local account row
    /// picks up the name, so it shows without waiting for the next
    /// contract read.
    pub async fn register_username(&self, username: &str) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;

        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(FriendFiError::InvalidUsername(
                "cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() < MIN_USERNAME_LENGTH {
            return Err(FriendFiError::InvalidUsername(format!(
                "must be at least {MIN_USERNAME_LENGTH} characters"
            )));
        }
        if !sanitize(trimmed).is_clean {
            return Err(FriendFiError::InvalidUsername(
                "contains blocked words".to_string(),
            ));
        }

        let operation_id = self.tracker.begin(Operation::RegisterUsername);
        match self
            .chain
            .set_username(signer.as_ref(), trimmed.to_string())
            .await
        {
            Ok(outcome) => {
                self.tracker
                    .succeed(operation_id, Operation::RegisterUsername);
                self.cache.invalidate(&[
                    QueryKey::Username(account.address),
                    QueryKey::HasUsername(account.address),
                    QueryKey::AllUsersInfo,
                ]);
                self.store_local_username(&account, trimmed).await;
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker
                    .fail(operation_id, Operation::RegisterUsername, &e);
                Err(e)
            }
        }
    }

    /// Best effort: the registration is on chain either way.
    async fn store_local_username(&self, account: &Account, username: &str) {
        let mut updated = account.clone();
        updated.username = Some(username.to_string());
        match updated.save(self).await {
            Ok(saved) => {
                let mut session = self.session.write().await;
                if let Some(session) = session.as_mut() {
                    if session.account.address == saved.address {
                        session.account = saved;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    target: "friendfi::users",
                    "failed to store username locally for {:#x}: {}",
                    account.address,
                    e
                );
            }
        }
    }

    /// The registered username for `address`, if any. Read failures and
    /// unregistered users both come back as `None`.
    pub(crate) async fn cached_username(&self, address: Address) -> Option<String> {
        let result = self
            .cache
            .get_or_fetch(QueryKey::Username(address), || async move {
                self.chain
                    .username(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await;
        match result {
            Ok(name) if !name.trim().is_empty() => Some(name),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(
                    target: "friendfi::users",
                    "username unavailable for {:#x}: {}",
                    address,
                    e
                );
                None
            }
        }
    }

    /// Friends ordered by most recent exchange, plus registered users the
    /// wallet has never messaged. Display names are filtered, and each
    /// friend's newest message is resolved into a one-line preview.
    pub async fn friends(&self) -> Result<FriendListing> {
        let (account, _signer) = self.connected_session().await?;

        let (directory, sent, received) = tokio::join!(
            self.cached_directory(),
            self.sent_messages(account.address),
            self.received_messages(account.address),
        );
        let directory = directory.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::users", "user directory unavailable: {}", e);
            Vec::new()
        });
        let sent = sent.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::users", "sent messages unavailable: {}", e);
            Vec::new()
        });
        let received = received.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::users", "received messages unavailable: {}", e);
            Vec::new()
        });

        let now_seconds = Utc::now().timestamp().max(0) as u64;
        let mut listing = self.conversation.build_friend_list(
            account.address,
            &directory,
            &sent,
            &received,
            now_seconds,
        );

        for friend in &mut listing.friends {
            let display = sanitizer::display_username(&friend.address, Some(friend.username.as_str()));
            friend.username = display;
        }
        for suggestion in &mut listing.suggestions {
            let display =
                sanitizer::display_username(&suggestion.address, Some(suggestion.username.as_str()));
            suggestion.username = display;
        }

        let pointers: Vec<Option<String>> = listing
            .friends
            .iter()
            .map(|friend| newest_exchange_pointer(friend.address, &sent, &received))
            .collect();
        let previews = join_all(pointers.iter().map(|pointer| async move {
            match pointer.as_deref() {
                Some(pointer) => Some(
                    self.content_store
                        .resolve_to_state(pointer)
                        .await
                        .preview_text(),
                ),
                None => None,
            }
        }))
        .await;
        for (friend, preview) in listing.friends.iter_mut().zip(previews) {
            if let Some(preview) = preview {
                friend.last_message_preview = preview;
            }
        }

        Ok(listing)
    }

    /// Case-insensitive substring search over the friend list and the
    /// suggestions, matching either the display name or the address.
    pub async fn search_users(&self, query: &str) -> Result<FriendListing> {
        let mut listing = self.friends().await?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(listing);
        }
        listing
            .friends
            .retain(|friend| matches_user(&needle, &friend.username, &friend.address));
        listing
            .suggestions
            .retain(|suggestion| matches_user(&needle, &suggestion.username, &suggestion.address));
        Ok(listing)
    }

    /// Every registered user with their stake, display-filtered. Comes back
    /// empty when the chain is unreachable.
    pub async fn user_directory(&self) -> Vec<DirectoryEntry> {
        match self.cached_directory().await {
            Ok(mut entries) => {
                for entry in &mut entries {
                    let display =
                        sanitizer::display_username(&entry.address, Some(entry.username.as_str()));
                    entry.username = display;
                }
                entries
            }
            Err(e) => {
                tracing::warn!(target: "friendfi::users", "user directory unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Whether `address` has ever interacted with the contract. Defaults
    /// to `false` when the read fails.
    pub async fn is_user_active(&self, address: Address) -> bool {
        self.cache
            .get_or_fetch(QueryKey::IsActiveUser(address), || async move {
                self.chain
                    .is_active_user(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    target: "friendfi::users",
                    "active check failed for {:#x}: {}",
                    address,
                    e
                );
                false
            })
    }

    /// The full directory via the combined contract read, falling back to
    /// the active-user set enriched one user at a time when it fails.
    pub(crate) async fn cached_directory(&self) -> Result<Vec<DirectoryEntry>> {
        let combined = self
            .cache
            .get_or_fetch(QueryKey::AllUsersInfo, || async move {
                self.chain
                    .all_users_info()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await;
        match combined {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::debug!(
                    target: "friendfi::users",
                    "combined directory read failed, using active users: {}",
                    e
                );
                self.directory_from_active_users().await
            }
        }
    }

    async fn directory_from_active_users(&self) -> Result<Vec<DirectoryEntry>> {
        let users = self
            .cache
            .get_or_fetch(QueryKey::ActiveUsers, || async move {
                self.chain
                    .active_users()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await?;

        let entries = join_all(users.into_iter().map(|address| async move {
            let username = self
                .cache
                .get_or_fetch(QueryKey::Username(address), || async move {
                    self.chain
                        .username_by_address(address)
                        .await
                        .map_err(FriendFiError::from)
                })
                .await
                .unwrap_or_default();
            let staked_amount = self
                .cache
                .get_or_fetch(QueryKey::StakedAmount(address), || async move {
                    self.chain
                        .staked_amount(address)
                        .await
                        .map_err(FriendFiError::from)
                })
                .await
                .unwrap_or(U256::ZERO);
            DirectoryEntry {
                address,
                username,
                staked_amount,
            }
        }))
        .await;
        Ok(entries)
    }
}

/// Pointer of the newest record exchanged with `counterparty`, preferring
/// the received side on same-second ties.
fn newest_exchange_pointer(
    counterparty: Address,
    sent: &[Message],
    received: &[Message],
) -> Option<String> {
    let newest_sent = sent
        .iter()
        .filter(|message| message.receiver == counterparty)
        .max_by_key(|message| message.timestamp_seconds);
    let newest_received = received
        .iter()
        .filter(|message| message.sender == counterparty)
        .max_by_key(|message| message.timestamp_seconds);
    let newest = match (newest_sent, newest_received) {
        (Some(sent), Some(received)) => {
            if received.timestamp_seconds >= sent.timestamp_seconds {
                Some(received)
            } else {
                Some(sent)
            }
        }
        (sent, received) => sent.or(received),
    };
    newest.map(|message| message.content_pointer.clone())
}

/// Whether a pre-lowercased needle matches the username or the `0x` hex
/// form of the address.
fn matches_user(needle: &str, username: &str, address: &Address) -> bool {
    username.to_lowercase().contains(needle) || format!("{address:#x}").contains(needle)
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::{SolCall, SolValue};
    use mockito::Matcher;

    use super::*;
    use crate::chain::abi;
    use crate::friendfi::content_store::MessageMetadata;
    use crate::friendfi::test_utils::{create_friendfi_with_endpoints, create_mock_friendfi};

    fn selector_matcher<C: SolCall>() -> Matcher {
        Matcher::Regex(hex::encode(C::SELECTOR))
    }

    async fn mock_eth_call<C: SolCall>(
        server: &mut mockito::ServerGuard,
        return_data: &[u8],
    ) -> mockito::Mock {
        server
            .mock("POST", "/")
            .match_body(selector_matcher::<C>())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"jsonrpc":"2.0","id":1,"result":"0x{}"}}"#,
                hex::encode(return_data)
            ))
            .create_async()
            .await
    }

    fn record(id: u64, sender: Address, receiver: Address, pointer: &str, seconds: u64) -> Message {
        Message {
            id,
            sender,
            receiver,
            content_pointer: pointer.to_string(),
            timestamp_seconds: seconds,
            tip_amount: U256::ZERO,
            is_encrypted: false,
            sender_username: None,
            receiver_username: None,
        }
    }

    #[tokio::test]
    async fn test_register_username_requires_wallet() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi.register_username("alice").await;
        assert!(matches!(result, Err(FriendFiError::NoWalletConnected)));
    }

    #[tokio::test]
    async fn test_register_username_validates_input() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        let account = friendfi.connect_account().await.unwrap();

        let empty = friendfi.register_username("   ").await;
        assert!(matches!(empty, Err(FriendFiError::InvalidUsername(_))));

        let short = friendfi.register_username("ab").await;
        assert!(matches!(short, Err(FriendFiError::InvalidUsername(_))));

        let blocked = friendfi.register_username("dumbass").await;
        assert!(matches!(blocked, Err(FriendFiError::InvalidUsername(_))));

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_username_surfaces_chain_failure() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        let account = friendfi.connect_account().await.unwrap();

        let result = friendfi.register_username("alice").await;
        assert!(matches!(result, Err(FriendFiError::ChainClient(_))));

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_friends_requires_connected_wallet() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi.friends().await;
        assert!(matches!(result, Err(FriendFiError::NoWalletConnected)));
    }

    #[tokio::test]
    async fn test_friends_assembles_listing_with_previews() {
        let mut server = mockito::Server::new_async().await;
        let (friendfi, _data_temp, _logs_temp) =
            create_friendfi_with_endpoints(&server.url(), &server.url()).await;
        let account = friendfi.connect_account().await.unwrap();
        let me = account.address;
        let friend = Address::repeat_byte(0xBB);
        let stranger = Address::repeat_byte(0xCC);

        let directory = (
            vec![friend, stranger],
            vec!["bob".to_string(), "carol".to_string()],
            vec![U256::from(100u64), U256::from(50u64)],
        )
            .abi_encode();
        let _directory = mock_eth_call::<abi::getAllUsersInfoCall>(&mut server, &directory).await;
        let _sent_ids = mock_eth_call::<abi::getUserSentMessagesCall>(
            &mut server,
            &vec![U256::from(1u64)].abi_encode(),
        )
        .await;
        let _received_ids = mock_eth_call::<abi::getUserReceivedMessagesCall>(
            &mut server,
            &Vec::<U256>::new().abi_encode(),
        )
        .await;
        let _record = mock_eth_call::<abi::getMessageCall>(
            &mut server,
            &(me, friend, "ipfs://QmPrev".to_string(), U256::from(500u64), U256::ZERO, false)
                .abi_encode(),
        )
        .await;
        let _content = server
            .mock("GET", "/ipfs/QmPrev")
            .with_status(200)
            .with_body(
                serde_json::to_string(&MessageMetadata::text_message(
                    me,
                    friend,
                    "see you soon",
                    None,
                    false,
                ))
                .unwrap(),
            )
            .create_async()
            .await;

        let listing = friendfi.friends().await.unwrap();

        assert_eq!(listing.friends.len(), 1);
        assert_eq!(listing.friends[0].address, friend);
        assert_eq!(listing.friends[0].username, "bob");
        assert_eq!(listing.friends[0].last_message_preview, "see you soon");
        assert_eq!(listing.suggestions.len(), 1);
        assert_eq!(listing.suggestions[0].address, stranger);
        assert_eq!(listing.suggestions[0].username, "carol");

        friendfi.remove_account(&me).await.unwrap();
    }

    #[tokio::test]
    async fn test_user_directory_falls_back_to_active_users() {
        let mut server = mockito::Server::new_async().await;
        let (friendfi, _data_temp, _logs_temp) =
            create_friendfi_with_endpoints(&server.url(), &server.url()).await;
        let friend = Address::repeat_byte(0xBB);

        let _combined = server
            .mock("POST", "/")
            .match_body(selector_matcher::<abi::getAllUsersInfoCall>())
            .with_status(500)
            .create_async()
            .await;
        let _active =
            mock_eth_call::<abi::getActiveUsersCall>(&mut server, &vec![friend].abi_encode()).await;
        let _username =
            mock_eth_call::<abi::usernamesCall>(&mut server, &"bob".to_string().abi_encode()).await;
        let _stake = mock_eth_call::<abi::stakedAmountsCall>(
            &mut server,
            &U256::from(77u64).abi_encode(),
        )
        .await;

        let entries = friendfi.user_directory().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, friend);
        assert_eq!(entries[0].username, "bob");
        assert_eq!(entries[0].staked_amount, U256::from(77u64));
    }

    #[tokio::test]
    async fn test_user_directory_empty_when_unreachable() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let entries = friendfi.user_directory().await;
        assert!(entries.is_empty());
    }

    #[test]
    fn test_matches_user_by_name_or_address() {
        let address = Address::repeat_byte(0xBB);

        assert!(matches_user("bob", "BobCat", &address));
        assert!(matches_user("0xbb", "alice", &address));
        assert!(matches_user("bbbb", "alice", &address));
        assert!(!matches_user("zzz", "alice", &address));
    }

    #[test]
    fn test_newest_exchange_pointer_picks_latest() {
        let me = Address::repeat_byte(0xAA);
        let friend = Address::repeat_byte(0xBB);
        let other = Address::repeat_byte(0xCC);

        let sent = vec![
            record(1, me, friend, "ipfs://QmOld", 100),
            record(2, me, other, "ipfs://QmElsewhere", 900),
        ];
        let received = vec![record(3, friend, me, "ipfs://QmNew", 200)];

        assert_eq!(
            newest_exchange_pointer(friend, &sent, &received),
            Some("ipfs://QmNew".to_string())
        );
        assert_eq!(newest_exchange_pointer(other, &sent, &[]), Some("ipfs://QmElsewhere".to_string()));
        assert_eq!(newest_exchange_pointer(Address::repeat_byte(0xDD), &sent, &received), None);
    }
}
