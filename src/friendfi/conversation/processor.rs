//! Core conversation assembly logic
//!
//! Transforms the contract's flat sent/received message records into
//! ordered two-party threads and a recency-sorted friends list.

use alloy_primitives::Address;

use super::types::{
    BuilderConfig, ContentState, FriendListing, FriendSummary, ProcessingError, SuggestedUser,
    ThreadMessage,
};
use crate::chain::abi::DirectoryEntry;
use crate::friendfi::{sanitizer, utils};
use crate::types::{Message, MessageDirection};

/// Assemble the ordered thread between the current user and one counterparty
pub(super) fn assemble_thread(
    current_user: Address,
    counterparty: Address,
    counterparty_username: Option<&str>,
    sent: &[Message],
    received: &[Message],
    config: &BuilderConfig,
) -> Result<Vec<ThreadMessage>, ProcessingError> {
    if counterparty == Address::ZERO || counterparty == current_user {
        return Err(ProcessingError::InvalidCounterparty);
    }

    let counterparty_label = display_name(counterparty, counterparty_username);

    let mut thread: Vec<ThreadMessage> = Vec::new();
    let mut skipped = 0usize;

    for message in sent {
        if !is_well_formed(message) {
            skipped += 1;
            continue;
        }
        if message.receiver == counterparty {
            thread.push(ThreadMessage {
                message: message.clone(),
                direction: MessageDirection::Sent,
                author_label: "You".to_string(),
                content: ContentState::Pending,
            });
        }
    }

    for message in received {
        if !is_well_formed(message) {
            skipped += 1;
            continue;
        }
        if message.sender == counterparty {
            thread.push(ThreadMessage {
                message: message.clone(),
                direction: MessageDirection::Received,
                author_label: counterparty_label.clone(),
                content: ContentState::Pending,
            });
        }
    }

    if skipped > 0 {
        tracing::debug!(
            "Skipped {} malformed message records while assembling thread with {}",
            skipped,
            counterparty
        );
    }

    // Stable sort: same-second messages keep their sent-then-received
    // concatenation order instead of being reordered arbitrarily.
    thread.sort_by_key(|entry| entry.message.timestamp_seconds);

    if config.enable_debug_logging {
        tracing::debug!(
            "Assembled thread of {} messages with {}",
            thread.len(),
            counterparty
        );
    }

    Ok(thread)
}

/// Split the user directory into interacted friends and suggestions
pub(super) fn assemble_friend_list(
    current_user: Address,
    directory: &[DirectoryEntry],
    sent: &[Message],
    received: &[Message],
    now_seconds: u64,
    config: &BuilderConfig,
) -> FriendListing {
    let mut listing = FriendListing::default();

    for entry in directory {
        if entry.address == current_user || entry.address == Address::ZERO {
            continue;
        }

        match last_interaction_seconds(entry.address, sent, received) {
            Some(seconds) => listing.friends.push(FriendSummary {
                address: entry.address,
                username: entry.username.clone(),
                staked_amount: entry.staked_amount,
                last_message_seconds: seconds,
                last_message_label: relative_time_label(seconds, now_seconds),
                last_message_preview: ContentState::Pending.preview_text(),
            }),
            None => listing.suggestions.push(SuggestedUser {
                address: entry.address,
                username: entry.username.clone(),
                staked_amount: entry.staked_amount,
            }),
        }
    }

    // Stable sort keeps directory order for equal timestamps
    listing
        .friends
        .sort_by_key(|friend| std::cmp::Reverse(friend.last_message_seconds));

    if config.enable_debug_logging {
        tracing::debug!(
            "Built friend list: {} friends, {} suggestions",
            listing.friends.len(),
            listing.suggestions.len()
        );
    }

    listing
}

/// Timestamp of the most recent exchange with a counterparty, if any
fn last_interaction_seconds(
    counterparty: Address,
    sent: &[Message],
    received: &[Message],
) -> Option<u64> {
    let sent_max = sent
        .iter()
        .filter(|m| is_well_formed(m) && m.receiver == counterparty)
        .map(|m| m.timestamp_seconds)
        .max();
    let received_max = received
        .iter()
        .filter(|m| is_well_formed(m) && m.sender == counterparty)
        .map(|m| m.timestamp_seconds)
        .max();
    sent_max.max(received_max)
}

/// Relative-time label for a timestamp against a reference instant.
///
/// Thresholds: under a minute "Just now", under an hour "{n}m ago",
/// under a day "{n}h ago", under a week "{n}d ago", otherwise the
/// calendar date.
pub(crate) fn relative_time_label(timestamp_seconds: u64, now_seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const WEEK: u64 = 7 * DAY;

    let elapsed = now_seconds.saturating_sub(timestamp_seconds);

    if elapsed < MINUTE {
        "Just now".to_string()
    } else if elapsed < HOUR {
        format!("{}m ago", elapsed / MINUTE)
    } else if elapsed < DAY {
        format!("{}h ago", elapsed / HOUR)
    } else if elapsed < WEEK {
        format!("{}d ago", elapsed / DAY)
    } else {
        utils::format_date(timestamp_seconds)
    }
}

/// Records with a zero party address or zero timestamp never match any
/// counterparty. The contract cannot produce them, so their presence
/// means a decode bug upstream; they are excluded rather than fatal.
fn is_well_formed(message: &Message) -> bool {
    message.sender != Address::ZERO
        && message.receiver != Address::ZERO
        && message.timestamp_seconds > 0
}

fn display_name(address: Address, username: Option<&str>) -> String {
    sanitizer::display_username(&address, username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

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

    #[test]
    fn test_relative_time_label_thresholds() {
        let now = 1_000_000;

        assert_eq!(relative_time_label(now, now), "Just now");
        assert_eq!(relative_time_label(now - 59, now), "Just now");
        assert_eq!(relative_time_label(now - 60, now), "1m ago");
        assert_eq!(relative_time_label(now - 3_599, now), "59m ago");
        assert_eq!(relative_time_label(now - 3_600, now), "1h ago");
        assert_eq!(relative_time_label(now - 86_399, now), "23h ago");
        assert_eq!(relative_time_label(now - 86_400, now), "1d ago");
        assert_eq!(relative_time_label(now - 604_799, now), "6d ago");
    }

    #[test]
    fn test_relative_time_label_falls_back_to_date() {
        // 2021-01-01T00:00:00Z, observed more than a week later
        let label = relative_time_label(1_609_459_200, 1_609_459_200 + 604_800);
        assert_eq!(label, "1/1/2021");
    }

    #[test]
    fn test_relative_time_label_future_timestamp() {
        // Clock skew between node and client saturates to "Just now"
        assert_eq!(relative_time_label(2_000, 1_000), "Just now");
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed(&message(1, addr(0xAA), addr(0xBB), 100)));
        assert!(!is_well_formed(&message(2, Address::ZERO, addr(0xBB), 100)));
        assert!(!is_well_formed(&message(3, addr(0xAA), Address::ZERO, 100)));
        assert!(!is_well_formed(&message(4, addr(0xAA), addr(0xBB), 0)));
    }

    #[test]
    fn test_display_name_prefers_username() {
        assert_eq!(display_name(addr(0xBB), Some("bob")), "bob");
        assert_eq!(display_name(addr(0xBB), Some("  ")), "0xbbbb...bbbb");
        assert_eq!(display_name(addr(0xBB), None), "0xbbbb...bbbb");
        // Blocklisted names fall back like missing ones
        assert_eq!(display_name(addr(0xBB), Some("dumbass")), "0xbbbb...bbbb");
    }

    #[test]
    fn test_last_interaction_seconds_takes_max_of_both_sides() {
        let me = addr(0xAA);
        let other = addr(0xBB);
        let sent = vec![message(1, me, other, 100), message(2, me, other, 150)];
        let received = vec![message(3, other, me, 200)];

        assert_eq!(last_interaction_seconds(other, &sent, &received), Some(200));
        assert_eq!(last_interaction_seconds(addr(0xCC), &sent, &received), None);
    }
}
