//! Conversation Assembly Module
//!
//! The contract stores messages as flat per-user arrays of sent and
//! received records. This module rebuilds what the user actually sees:
//! an ordered two-party thread per counterparty, and a friends list
//! ordered by how recently each counterparty was spoken to. It is pure
//! data transformation over already-fetched records; fetching and
//! content resolution live elsewhere.

mod processor;
mod types;

#[cfg(test)]
mod tests;

pub use types::{
    BuilderConfig, ContentState, FriendListing, FriendSummary, ProcessingError, SuggestedUser,
    ThreadMessage,
};

pub(crate) use processor::relative_time_label;

use alloy_primitives::Address;

use crate::chain::abi::DirectoryEntry;
use crate::types::Message;

/// Main conversation builder - designed to be a singleton per FriendFi instance
pub struct ConversationBuilder {
    config: BuilderConfig,
}

impl ConversationBuilder {
    /// Create a new conversation builder with default configuration
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Create a new conversation builder with custom configuration
    pub fn with_config(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Build the ordered message thread between the current user and one
    /// counterparty. The pipeline:
    /// 1. Keep sent records addressed to the counterparty and received
    ///    records authored by them
    /// 2. Merge both sides and sort ascending by contract timestamp,
    ///    preserving input order for same-second collisions
    /// 3. Attach direction, an author label, and a pending content state
    ///    for each message
    ///
    /// Empty inputs yield an empty thread. Records with a zero address
    /// or zero timestamp are skipped and logged, never fatal.
    pub fn build_thread(
        &self,
        current_user: Address,
        counterparty: Address,
        counterparty_username: Option<&str>,
        sent: &[Message],
        received: &[Message],
    ) -> Result<Vec<ThreadMessage>, ProcessingError> {
        if self.config.enable_debug_logging {
            tracing::debug!(
                "Building thread between {} and {} ({} sent, {} received)",
                current_user,
                counterparty,
                sent.len(),
                received.len()
            );
        }

        processor::assemble_thread(
            current_user,
            counterparty,
            counterparty_username,
            sent,
            received,
            &self.config,
        )
    }

    /// Split the user directory into friends the current user has
    /// exchanged messages with, ordered by most recent exchange, and
    /// suggestions they have not. `now_seconds` is the reference instant
    /// for relative-time labels, passed in so output is deterministic.
    pub fn build_friend_list(
        &self,
        current_user: Address,
        directory: &[DirectoryEntry],
        sent: &[Message],
        received: &[Message],
        now_seconds: u64,
    ) -> FriendListing {
        processor::assemble_friend_list(
            current_user,
            directory,
            sent,
            received,
            now_seconds,
            &self.config,
        )
    }

    /// Get the current configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }
}

impl Default for ConversationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
