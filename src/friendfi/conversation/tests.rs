//! Test suite for conversation assembly
//!
//! Exercises the complete thread and friend-list pipeline over
//! hand-built message records, without any network or database setup.

#[cfg(test)]
mod integration_tests {
    use super::super::*;
    use crate::chain::abi::DirectoryEntry;
    use crate::types::{Message, MessageDirection};
    use alloy_primitives::{Address, U256};

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn message(id: u64, sender: Address, receiver: Address, timestamp_seconds: u64) -> Message {
        Message {
            id,
            sender,
            receiver,
            content_pointer: format!("ipfs://Qm{id}"),
            timestamp_seconds,
            tip_amount: U256::ZERO,
            is_encrypted: false,
            sender_username: None,
            receiver_username: None,
        }
    }

    fn directory_entry(address: Address, username: &str) -> DirectoryEntry {
        DirectoryEntry {
            address,
            username: username.to_string(),
            staked_amount: U256::from(1_000_000_000_000_000_000u64),
        }
    }

    #[test]
    fn test_two_party_exchange_builds_ordered_thread() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let builder = ConversationBuilder::new();

        let sent = vec![message(1, me, friend, 100)];
        let received = vec![message(2, friend, me, 200)];

        let thread = builder
            .build_thread(me, friend, Some("bob"), &sent, &received)
            .unwrap();

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].message.timestamp_seconds, 100);
        assert_eq!(thread[0].direction, MessageDirection::Sent);
        assert_eq!(thread[0].author_label, "You");
        assert_eq!(thread[1].message.timestamp_seconds, 200);
        assert_eq!(thread[1].direction, MessageDirection::Received);
        assert_eq!(thread[1].author_label, "bob");
        assert!(thread.iter().all(|m| m.content == ContentState::Pending));
    }

    #[test]
    fn test_thread_excludes_other_counterparties() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let stranger = addr(0xCC);
        let builder = ConversationBuilder::new();

        let sent = vec![
            message(1, me, friend, 100),
            message(2, me, stranger, 110),
        ];
        let received = vec![
            message(3, friend, me, 200),
            message(4, stranger, me, 210),
        ];

        let thread = builder
            .build_thread(me, friend, None, &sent, &received)
            .unwrap();

        assert_eq!(thread.len(), 2);
        assert!(thread.iter().all(|m| {
            m.message.sender == friend || m.message.receiver == friend
        }));
    }

    #[test]
    fn test_thread_is_idempotent() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let builder = ConversationBuilder::new();

        let sent = vec![message(1, me, friend, 300), message(2, me, friend, 100)];
        let received = vec![message(3, friend, me, 200)];

        let first = builder
            .build_thread(me, friend, None, &sent, &received)
            .unwrap();
        let second = builder
            .build_thread(me, friend, None, &sent, &received)
            .unwrap();

        assert_eq!(first, second);
        let timestamps: Vec<u64> = first.iter().map(|m| m.message.timestamp_seconds).collect();
        assert_eq!(timestamps, vec![100, 200, 300]);
    }

    #[test]
    fn test_thread_empty_inputs_yield_empty_thread() {
        let builder = ConversationBuilder::new();

        let thread = builder
            .build_thread(addr(0xAA), addr(0xBB), None, &[], &[])
            .unwrap();

        assert!(thread.is_empty());
    }

    #[test]
    fn test_thread_preserves_order_for_same_second_messages() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let builder = ConversationBuilder::new();

        // Contract timestamps are second-granularity, so collisions happen.
        // Sent records come before received records at the same second.
        let sent = vec![message(1, me, friend, 100), message(2, me, friend, 100)];
        let received = vec![message(3, friend, me, 100)];

        let thread = builder
            .build_thread(me, friend, None, &sent, &received)
            .unwrap();

        let ids: Vec<u64> = thread.iter().map(|m| m.message.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_thread_rejects_invalid_counterparty() {
        let builder = ConversationBuilder::new();

        let zero = builder.build_thread(addr(0xAA), Address::ZERO, None, &[], &[]);
        assert!(matches!(zero, Err(ProcessingError::InvalidCounterparty)));

        let self_thread = builder.build_thread(addr(0xAA), addr(0xAA), None, &[], &[]);
        assert!(matches!(
            self_thread,
            Err(ProcessingError::InvalidCounterparty)
        ));
    }

    #[test]
    fn test_thread_skips_malformed_records() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let builder = ConversationBuilder::new();

        let sent = vec![
            message(1, me, friend, 100),
            message(2, me, Address::ZERO, 110),
            message(3, Address::ZERO, friend, 120),
            message(4, me, friend, 0),
        ];

        let thread = builder.build_thread(me, friend, None, &sent, &[]).unwrap();

        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].message.id, 1);
    }

    #[test]
    fn test_thread_falls_back_to_truncated_address_label() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let builder = ConversationBuilder::new();

        let received = vec![message(1, friend, me, 100)];
        let thread = builder
            .build_thread(me, friend, None, &[], &received)
            .unwrap();

        assert_eq!(thread[0].author_label, "0xbbbb...bbbb");
    }

    #[test]
    fn test_friend_list_single_exchange() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let builder = ConversationBuilder::new();

        let directory = vec![
            directory_entry(me, "alice"),
            directory_entry(friend, "bob"),
        ];
        let sent = vec![message(1, me, friend, 100)];
        let received = vec![message(2, friend, me, 200)];

        let listing = builder.build_friend_list(me, &directory, &sent, &received, 230);

        assert_eq!(listing.friends.len(), 1);
        assert_eq!(listing.friends[0].address, friend);
        assert_eq!(listing.friends[0].username, "bob");
        assert_eq!(listing.friends[0].last_message_seconds, 200);
        assert_eq!(listing.friends[0].last_message_label, "Just now");
        assert_eq!(
            listing.friends[0].last_message_preview,
            ContentState::PENDING_PLACEHOLDER
        );
        assert!(listing.suggestions.is_empty());
    }

    #[test]
    fn test_friend_list_excludes_self_and_moves_strangers_to_suggestions() {
        let me = addr(0xAA);
        let friend = addr(0xBB);
        let stranger = addr(0xCC);
        let builder = ConversationBuilder::new();

        let directory = vec![
            directory_entry(me, "alice"),
            directory_entry(friend, "bob"),
            directory_entry(stranger, "carol"),
        ];
        let sent = vec![message(1, me, friend, 100)];

        let listing = builder.build_friend_list(me, &directory, &sent, &[], 150);

        assert_eq!(listing.friends.len(), 1);
        assert_eq!(listing.friends[0].address, friend);
        assert_eq!(listing.suggestions.len(), 1);
        assert_eq!(listing.suggestions[0].address, stranger);
        assert!(listing.friends.iter().all(|f| f.address != me));
        assert!(listing.suggestions.iter().all(|s| s.address != me));
    }

    #[test]
    fn test_friend_list_with_no_messages_is_all_suggestions() {
        let me = addr(0xAA);
        let builder = ConversationBuilder::new();

        let directory = vec![
            directory_entry(me, "alice"),
            directory_entry(addr(0xBB), "bob"),
            directory_entry(addr(0xCC), "carol"),
        ];

        let listing = builder.build_friend_list(me, &directory, &[], &[], 1_000);

        assert!(listing.friends.is_empty());
        assert_eq!(listing.suggestions.len(), 2);
    }

    #[test]
    fn test_friend_list_sorted_by_recency() {
        let me = addr(0xAA);
        let builder = ConversationBuilder::new();

        let directory = vec![
            directory_entry(addr(0xBB), "bob"),
            directory_entry(addr(0xCC), "carol"),
            directory_entry(addr(0xDD), "dave"),
        ];
        let sent = vec![
            message(1, me, addr(0xBB), 100),
            message(2, me, addr(0xCC), 300),
        ];
        let received = vec![message(3, addr(0xDD), me, 200)];

        let listing = builder.build_friend_list(me, &directory, &sent, &received, 400);

        let order: Vec<Address> = listing.friends.iter().map(|f| f.address).collect();
        assert_eq!(order, vec![addr(0xCC), addr(0xDD), addr(0xBB)]);
        assert!(
            listing
                .friends
                .windows(2)
                .all(|pair| pair[0].last_message_seconds >= pair[1].last_message_seconds)
        );
    }

    #[test]
    fn test_friend_list_every_friend_has_positive_timestamp() {
        let me = addr(0xAA);
        let builder = ConversationBuilder::new();

        let directory = vec![
            directory_entry(addr(0xBB), "bob"),
            directory_entry(addr(0xCC), "carol"),
        ];
        // The zero-timestamp record is malformed and must not promote
        // carol into the friends list.
        let sent = vec![
            message(1, me, addr(0xBB), 100),
            message(2, me, addr(0xCC), 0),
        ];

        let listing = builder.build_friend_list(me, &directory, &sent, &[], 200);

        assert_eq!(listing.friends.len(), 1);
        assert!(listing.friends.iter().all(|f| f.last_message_seconds > 0));
        assert_eq!(listing.suggestions.len(), 1);
        assert_eq!(listing.suggestions[0].address, addr(0xCC));
    }

    #[test]
    fn test_friend_list_is_deterministic() {
        let me = addr(0xAA);
        let builder = ConversationBuilder::new();

        let directory = vec![
            directory_entry(addr(0xBB), "bob"),
            directory_entry(addr(0xCC), "carol"),
        ];
        // Equal timestamps: directory order decides, on every call.
        let sent = vec![
            message(1, me, addr(0xBB), 100),
            message(2, me, addr(0xCC), 100),
        ];

        let first = builder.build_friend_list(me, &directory, &sent, &[], 200);
        let second = builder.build_friend_list(me, &directory, &sent, &[], 200);

        assert_eq!(first, second);
        let order: Vec<Address> = first.friends.iter().map(|f| f.address).collect();
        assert_eq!(order, vec![addr(0xBB), addr(0xCC)]);
    }

    #[test]
    fn test_content_state_display_text() {
        assert_eq!(ContentState::Pending.display_text(), None);
        assert_eq!(
            ContentState::Text {
                text: "hi".to_string()
            }
            .display_text(),
            Some("hi")
        );
        assert_eq!(
            ContentState::Unknown.display_text(),
            Some("Failed to load content")
        );
    }

    #[test]
    fn test_content_state_preview_text() {
        assert_eq!(ContentState::Pending.preview_text(), "...");
        assert_eq!(
            ContentState::Text {
                text: "see you at 5".to_string()
            }
            .preview_text(),
            "see you at 5"
        );
        assert_eq!(
            ContentState::File {
                url: "https://ipfs.io/ipfs/QmPic".to_string(),
                mime_type: None,
            }
            .preview_text(),
            "\u{1F4CE} File"
        );
        assert_eq!(ContentState::Unknown.preview_text(), "Failed to load content");
    }

    #[test]
    fn test_content_state_serializes_with_tag() {
        let state = ContentState::Text {
            text: "hello".to_string(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains(r#""state":"text""#));

        let round_trip: ContentState = serde_json::from_str(&json).unwrap();
        assert_eq!(round_trip, state);
    }

    #[test]
    fn test_builder_custom_config() {
        let config = BuilderConfig {
            enable_debug_logging: true,
        };
        let builder = ConversationBuilder::with_config(config.clone());
        assert_eq!(builder.config(), &config);

        let default_builder = ConversationBuilder::default();
        assert!(!default_builder.config().enable_debug_logging);
    }
}
