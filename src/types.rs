use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A message record as recorded by the FriendFi contract.
///
/// Records are immutable once observed. Identity for deduplication and
/// display purposes is the (sender, receiver, timestamp_seconds) tuple;
/// the contract-assigned `id` is only used to fetch the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Contract-assigned message id.
    pub id: u64,

    /// Address that sent the message.
    pub sender: Address,

    /// Address the message was sent to.
    pub receiver: Address,

    /// Content-addressed pointer to the message metadata (`ipfs://…`).
    pub content_pointer: String,

    /// Contract timestamp, second granularity.
    pub timestamp_seconds: u64,

    /// Tip attached to the message, in the smallest native-token unit.
    pub tip_amount: U256,

    /// Whether the payload was marked encrypted by the sender.
    pub is_encrypted: bool,

    /// Sender's registered username, when known.
    pub sender_username: Option<String>,

    /// Receiver's registered username, when known.
    pub receiver_username: Option<String>,
}

impl Message {
    /// Stable display identity: `{sender}-{receiver}-{timestamp}`.
    pub fn display_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.sender, self.receiver, self.timestamp_seconds
        )
    }
}

/// Direction of a message relative to the current user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MessageDirection {
    Sent,
    Received,
}
