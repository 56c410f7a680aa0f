use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::types::{Message, MessageDirection};

/// A message positioned within a two-party conversation, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadMessage {
    /// The underlying contract message record
    pub message: Message,

    /// Whether the current user sent or received this message
    pub direction: MessageDirection,

    /// "You" for own messages, otherwise the counterparty's display name
    pub author_label: String,

    /// Resolution state of the pointed-to content
    pub content: ContentState,
}

/// Resolution state for a message's pointed-to content.
///
/// Thread assembly emits every message as `Pending`; the content store
/// fills in the terminal states as pointers resolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ContentState {
    Pending,
    Text {
        text: String,
    },
    File {
        url: String,
        mime_type: Option<String>,
    },
    Unknown,
}

impl ContentState {
    /// Fallback text shown when content could not be resolved.
    pub const FAILED_FALLBACK: &'static str = "Failed to load content";

    /// Placeholder shown before a pointer has been resolved.
    pub const PENDING_PLACEHOLDER: &'static str = "...";

    /// The text to render for this state, if any is known yet.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            ContentState::Text { text } => Some(text),
            ContentState::Unknown => Some(Self::FAILED_FALLBACK),
            ContentState::Pending | ContentState::File { .. } => None,
        }
    }

    /// Single-line preview for friend-list rows. File messages render a
    /// fixed attachment label rather than their gateway URL.
    pub fn preview_text(&self) -> String {
        match self {
            ContentState::Text { text } => text.clone(),
            ContentState::File { .. } => "\u{1F4CE} File".to_string(),
            ContentState::Unknown => Self::FAILED_FALLBACK.to_string(),
            ContentState::Pending => Self::PENDING_PLACEHOLDER.to_string(),
        }
    }
}

/// One interacted-with user in the friends list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendSummary {
    pub address: Address,

    pub username: String,

    pub staked_amount: U256,

    /// Timestamp of the most recent message in either direction, seconds
    pub last_message_seconds: u64,

    /// Relative-time label for the most recent message
    pub last_message_label: String,

    /// Preview of the newest message's content. Starts as the pending
    /// placeholder; the API layer fills it in as pointers resolve.
    pub last_message_preview: String,
}

/// A registered user the current user has never exchanged messages with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedUser {
    pub address: Address,
    pub username: String,
    pub staked_amount: U256,
}

/// Friends ordered by interaction recency, plus not-yet-contacted suggestions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FriendListing {
    pub friends: Vec<FriendSummary>,
    pub suggestions: Vec<SuggestedUser>,
}

/// Configuration for the conversation builder
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BuilderConfig {
    /// Whether to enable detailed logging of processing steps
    pub enable_debug_logging: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            enable_debug_logging: false,
        }
    }
}

/// Errors that can occur during conversation assembly
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Counterparty must be a non-zero address other than the current user")]
    InvalidCounterparty,

    #[error("Internal processing error: {0}")]
    Internal(String),
}
