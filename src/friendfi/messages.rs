//! Message reads and the send pipeline.
//!
//! Reads fan out over the cache: id lists first, then individual records,
//! then content resolution through the store. Sends run the full pipeline:
//! content filter, metadata upload, signed transaction, notification
//! lifecycle, cache invalidation.

use alloy_primitives::{Address, U256};
use futures::future::join_all;

use crate::chain::publisher::TransactionOutcome;
use crate::error::{FriendFiError, Result};
use crate::friendfi::FriendFi;
use crate::friendfi::cache::QueryKey;
use crate::friendfi::content_store::MessageMetadata;
use crate::friendfi::conversation::ThreadMessage;
use crate::friendfi::operations::Operation;
use crate::friendfi::sanitizer::sanitize;
use crate::friendfi::signers::WalletSigner;
use crate::friendfi::utils;
use crate::types::{Message, MessageDirection};

/// What a message carries: plain text, or an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl FriendFi {
    /// The ordered thread between the connected wallet and one counterparty,
    /// with content resolved as far as the store allows.
    ///
    /// Chain read failures degrade to an empty side of the exchange rather
    /// than an error; a counterparty of zero or the connected wallet itself
    /// is an error.
    pub async fn thread(&self, counterparty: Address) -> Result<Vec<ThreadMessage>> {
        let (account, _signer) = self.connected_session().await?;

        let (sent, received, counterparty_username) = tokio::join!(
            self.sent_messages(account.address),
            self.received_messages(account.address),
            self.cached_username(counterparty),
        );
        let sent = sent.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::messages", "sent messages unavailable: {}", e);
            Vec::new()
        });
        let received = received.unwrap_or_else(|e| {
            tracing::warn!(target: "friendfi::messages", "received messages unavailable: {}", e);
            Vec::new()
        });

        let mut thread = self.conversation.build_thread(
            account.address,
            counterparty,
            counterparty_username.as_deref(),
            &sent,
            &received,
        )?;

        for entry in &mut thread {
            match entry.direction {
                MessageDirection::Sent => {
                    entry.message.sender_username = account.username.clone();
                    entry.message.receiver_username = counterparty_username.clone();
                }
                MessageDirection::Received => {
                    entry.message.sender_username = counterparty_username.clone();
                    entry.message.receiver_username = account.username.clone();
                }
            }
        }

        let states = join_all(
            thread
                .iter()
                .map(|entry| self.content_store.resolve_to_state(&entry.message.content_pointer)),
        )
        .await;
        for (entry, state) in thread.iter_mut().zip(states) {
            entry.content = state;
        }

        Ok(thread)
    }

    /// One message record by its position in a user's sent or received list,
    /// without fetching the whole list. Stays on the contract's public
    /// array getters end to end, so it works against nodes that reject
    /// the batched view helpers.
    pub async fn message_at_index(
        &self,
        user: Address,
        index: u64,
        direction: MessageDirection,
    ) -> Result<Message> {
        let message_id = self
            .cache
            .get_or_fetch(
                QueryKey::MessageAt {
                    user,
                    index,
                    direction,
                },
                || async move {
                    let id = match direction {
                        MessageDirection::Sent => {
                            self.chain.sent_message_id_at(user, index).await?
                        }
                        MessageDirection::Received => {
                            self.chain.received_message_id_at(user, index).await?
                        }
                    };
                    Ok::<_, FriendFiError>(id)
                },
            )
            .await?;
        self.cache
            .get_or_fetch(QueryKey::Message(message_id), || async move {
                self.chain
                    .message_by_index(message_id)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
    }

    /// Sends a message to `receiver`, optionally carrying a native-token tip.
    ///
    /// Text bodies that fail the content filter are rejected before anything
    /// is uploaded or signed; the error carries the masked preview. The
    /// pending notification covers the upload and the transaction both.
    pub async fn send_message(
        &self,
        receiver: Address,
        body: MessageBody,
        tip_amount: Option<U256>,
        is_encrypted: bool,
    ) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;

        if receiver == Address::ZERO {
            return Err(FriendFiError::InvalidAddress(
                "receiver cannot be the zero address".to_string(),
            ));
        }
        if receiver == account.address {
            return Err(FriendFiError::InvalidAddress(
                "cannot send a message to yourself".to_string(),
            ));
        }
        if tip_amount.is_some_and(|tip| tip.is_zero()) {
            return Err(FriendFiError::InvalidAmount(
                "tip must be greater than zero".to_string(),
            ));
        }
        match &body {
            MessageBody::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(FriendFiError::EmptyMessage);
                }
                let filtered = sanitize(trimmed);
                if !filtered.is_clean {
                    return Err(FriendFiError::MessageRejected {
                        masked: filtered.sanitized_text,
                    });
                }
            }
            MessageBody::File { bytes, .. } => {
                if bytes.is_empty() {
                    return Err(FriendFiError::EmptyMessage);
                }
            }
        }

        let kind = if tip_amount.is_some() {
            Operation::SendMessageWithTip
        } else {
            Operation::SendMessage
        };
        let operation_id = self.tracker.begin(kind);

        let outcome = self
            .upload_and_submit(
                account.address,
                signer.as_ref(),
                receiver,
                &body,
                tip_amount,
                is_encrypted,
            )
            .await;

        match outcome {
            Ok(outcome) => {
                self.tracker.succeed(operation_id, kind);
                let mut stale = vec![
                    QueryKey::MessageCount(account.address),
                    QueryKey::Activity(account.address),
                    QueryKey::SentMessages(account.address),
                    QueryKey::ReceivedMessages(account.address),
                    QueryKey::TotalMessages,
                    QueryKey::AllUsersInfo,
                ];
                if tip_amount.is_some() {
                    stale.push(QueryKey::TipStats(account.address));
                }
                self.cache.invalidate(&stale);
                Ok(outcome)
            }
            Err(e) => {
                self.tracker.fail(operation_id, kind, &e);
                Err(e)
            }
        }
    }

    async fn upload_and_submit(
        &self,
        sender: Address,
        signer: &dyn WalletSigner,
        receiver: Address,
        body: &MessageBody,
        tip_amount: Option<U256>,
        is_encrypted: bool,
    ) -> Result<TransactionOutcome> {
        let tip_display = tip_amount.map(utils::format_native_amount);

        let metadata = match body {
            MessageBody::Text(text) => MessageMetadata::text_message(
                sender,
                receiver,
                text.trim(),
                tip_display.as_deref(),
                is_encrypted,
            ),
            MessageBody::File { file_name, bytes } => {
                let file_pointer = self
                    .content_store
                    .store_file(file_name, bytes.clone())
                    .await?;
                MessageMetadata::file_message(
                    sender,
                    receiver,
                    &file_pointer,
                    tip_display.as_deref(),
                    is_encrypted,
                )
            }
        };
        let content_pointer = self.content_store.store_metadata(&metadata).await?;

        tracing::debug!(
            target: "friendfi::send_message",
            "uploaded metadata {} for message to {:#x}",
            content_pointer,
            receiver
        );

        let outcome = match tip_amount {
            Some(tip) => {
                self.chain
                    .send_message_with_tip(signer, receiver, content_pointer, is_encrypted, tip)
                    .await?
            }
            None => {
                self.chain
                    .send_message(signer, receiver, content_pointer, is_encrypted)
                    .await?
            }
        };
        Ok(outcome)
    }

    /// All message records the user has sent, newest last.
    pub(crate) async fn sent_messages(&self, user: Address) -> Result<Vec<Message>> {
        let ids = self
            .cache
            .get_or_fetch(QueryKey::SentMessages(user), || async move {
                self.chain
                    .sent_message_ids(user)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await?;
        Ok(self.fetch_message_records(&ids).await)
    }

    /// All message records the user has received, newest last.
    pub(crate) async fn received_messages(&self, user: Address) -> Result<Vec<Message>> {
        let ids = self
            .cache
            .get_or_fetch(QueryKey::ReceivedMessages(user), || async move {
                self.chain
                    .received_message_ids(user)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await?;
        Ok(self.fetch_message_records(&ids).await)
    }

    pub(crate) async fn cached_message(&self, message_id: u64) -> Result<Message> {
        self.cache
            .get_or_fetch(QueryKey::Message(message_id), || async move {
                self.chain
                    .message(message_id)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
    }

    /// Fetches the records for a list of ids concurrently. Records that
    /// fail to fetch are skipped with a warning; the rest still render.
    async fn fetch_message_records(&self, ids: &[u64]) -> Vec<Message> {
        let fetched = join_all(ids.iter().map(|id| self.cached_message(*id))).await;
        let mut records = Vec::with_capacity(fetched.len());
        for (id, result) in ids.iter().zip(fetched) {
            match result {
                Ok(message) => records.push(message),
                Err(e) => {
                    tracing::warn!(
                        target: "friendfi::messages",
                        "skipping message {}: {}",
                        id,
                        e
                    );
                }
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::{SolCall, SolValue};
    use mockito::Matcher;

    use super::*;
    use crate::chain::abi;
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

    #[tokio::test]
    async fn test_thread_requires_connected_wallet() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi.thread(Address::repeat_byte(0xBB)).await;
        assert!(matches!(result, Err(FriendFiError::NoWalletConnected)));
    }

    #[tokio::test]
    async fn test_thread_rejects_self_counterparty() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        let account = friendfi.connect_account().await.unwrap();

        let result = friendfi.thread(account.address).await;
        assert!(matches!(result, Err(FriendFiError::Conversation(_))));

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_thread_assembles_and_resolves_content() {
        let mut server = mockito::Server::new_async().await;
        let (friendfi, _data_temp, _logs_temp) =
            create_friendfi_with_endpoints(&server.url(), &server.url()).await;
        let account = friendfi.connect_account().await.unwrap();
        let me = account.address;
        let friend = Address::repeat_byte(0xBB);

        let _sent_ids =
            mock_eth_call::<abi::getUserSentMessagesCall>(&mut server, &vec![U256::from(1u64)].abi_encode())
                .await;
        let _received_ids = mock_eth_call::<abi::getUserReceivedMessagesCall>(
            &mut server,
            &vec![U256::from(2u64)].abi_encode(),
        )
        .await;
        let _username =
            mock_eth_call::<abi::getUserUsernameCall>(&mut server, &"bob".to_string().abi_encode())
                .await;
        // getMessage is called once per id; return the record whose sender
        // distinguishes direction by matching the requested id's calldata.
        let _sent_record = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(hex::encode(abi::getMessageCall::SELECTOR)),
                Matcher::Regex(format!("{:064x}", 1)),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"jsonrpc":"2.0","id":1,"result":"0x{}"}}"#,
                hex::encode(
                    (me, friend, "ipfs://QmOut".to_string(), U256::from(100u64), U256::ZERO, false)
                        .abi_encode()
                )
            ))
            .create_async()
            .await;
        let _received_record = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(hex::encode(abi::getMessageCall::SELECTOR)),
                Matcher::Regex(format!("{:064x}", 2)),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"jsonrpc":"2.0","id":1,"result":"0x{}"}}"#,
                hex::encode(
                    (friend, me, "ipfs://QmIn".to_string(), U256::from(200u64), U256::ZERO, false)
                        .abi_encode()
                )
            ))
            .create_async()
            .await;
        let metadata = MessageMetadata::text_message(friend, me, "hello back", None, false);
        let _content_out = server
            .mock("GET", "/ipfs/QmOut")
            .with_status(200)
            .with_body(
                serde_json::to_string(&MessageMetadata::text_message(
                    me, friend, "hello", None, false,
                ))
                .unwrap(),
            )
            .create_async()
            .await;
        let _content_in = server
            .mock("GET", "/ipfs/QmIn")
            .with_status(200)
            .with_body(serde_json::to_string(&metadata).unwrap())
            .create_async()
            .await;

        let thread = friendfi.thread(friend).await.unwrap();

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].direction, MessageDirection::Sent);
        assert_eq!(thread[0].author_label, "You");
        assert_eq!(thread[0].message.receiver_username.as_deref(), Some("bob"));
        assert_eq!(
            thread[0].content,
            crate::friendfi::conversation::ContentState::Text {
                text: "hello".to_string()
            }
        );
        assert_eq!(thread[1].direction, MessageDirection::Received);
        assert_eq!(thread[1].author_label, "bob");
        assert_eq!(
            thread[1].content,
            crate::friendfi::conversation::ContentState::Text {
                text: "hello back".to_string()
            }
        );

        friendfi.remove_account(&me).await.unwrap();
    }

    #[tokio::test]
    async fn test_message_at_index_uses_paged_lookup() {
        let mut server = mockito::Server::new_async().await;
        let (friendfi, _data_temp, _logs_temp) =
            create_friendfi_with_endpoints(&server.url(), &server.url()).await;
        let user = Address::repeat_byte(0xAA);
        let friend = Address::repeat_byte(0xBB);

        let _id_at = mock_eth_call::<abi::userSentMessagesCall>(
            &mut server,
            &U256::from(7u64).abi_encode(),
        )
        .await;
        let _record = mock_eth_call::<abi::messagesCall>(
            &mut server,
            &(user, friend, "ipfs://QmSeven".to_string(), U256::from(300u64), U256::ZERO, false)
                .abi_encode(),
        )
        .await;

        let message = friendfi
            .message_at_index(user, 0, MessageDirection::Sent)
            .await
            .unwrap();
        assert_eq!(message.id, 7);
        assert_eq!(message.content_pointer, "ipfs://QmSeven");
        assert_eq!(message.timestamp_seconds, 300);
    }

    #[tokio::test]
    async fn test_send_message_requires_wallet() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi
            .send_message(
                Address::repeat_byte(0xBB),
                MessageBody::Text("hi".to_string()),
                None,
                false,
            )
            .await;
        assert!(matches!(result, Err(FriendFiError::NoWalletConnected)));
    }

    #[tokio::test]
    async fn test_send_message_validates_receiver() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        let account = friendfi.connect_account().await.unwrap();

        let to_zero = friendfi
            .send_message(Address::ZERO, MessageBody::Text("hi".to_string()), None, false)
            .await;
        assert!(matches!(to_zero, Err(FriendFiError::InvalidAddress(_))));

        let to_self = friendfi
            .send_message(
                account.address,
                MessageBody::Text("hi".to_string()),
                None,
                false,
            )
            .await;
        assert!(matches!(to_self, Err(FriendFiError::InvalidAddress(_))));

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_message_rejects_blocklisted_text_with_masked_preview() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        let account = friendfi.connect_account().await.unwrap();

        let result = friendfi
            .send_message(
                Address::repeat_byte(0xBB),
                MessageBody::Text("what the hell".to_string()),
                None,
                false,
            )
            .await;
        match result {
            Err(FriendFiError::MessageRejected { masked }) => {
                assert_eq!(masked, "what the ****");
            }
            other => panic!("Expected MessageRejected, got {:?}", other),
        }

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_message_rejects_empty_text_and_zero_tip() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        let account = friendfi.connect_account().await.unwrap();
        let friend = Address::repeat_byte(0xBB);

        let empty = friendfi
            .send_message(friend, MessageBody::Text("   ".to_string()), None, false)
            .await;
        assert!(matches!(empty, Err(FriendFiError::EmptyMessage)));

        let zero_tip = friendfi
            .send_message(
                friend,
                MessageBody::Text("hi".to_string()),
                Some(U256::ZERO),
                false,
            )
            .await;
        assert!(matches!(zero_tip, Err(FriendFiError::InvalidAmount(_))));

        friendfi.remove_account(&account.address).await.unwrap();
    }
}
