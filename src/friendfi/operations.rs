//! Write-operation lifecycle and user-facing notifications.
//!
//! Every contract write runs the same machine: a pending notice when the
//! transaction is submitted, then exactly one completion carrying success or
//! error copy. Events flow over an mpsc channel the embedding shell drains;
//! the completion reuses the pending event's operation id so the shell can
//! dismiss the right notice. Failed writes are reported once and never
//! retried here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::FriendFiError;

const EVENT_BUFFER_SIZE: usize = 100;

/// How long completion notices should stay visible.
const COMPLETED_DISPLAY: Duration = Duration::from_secs(5);

/// The contract writes this client can submit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    SendMessage,
    SendMessageWithTip,
    Stake,
    Unstake,
    RegisterUsername,
    ClaimRewards,
    SetMinStakeAmount,
    SetRewardRate,
    SetRewardInterval,
    WithdrawTokens,
}

impl Operation {
    /// Sentence shown while the write is in flight.
    pub fn loading_message(&self) -> &'static str {
        match self {
            Operation::SendMessage => "Sending your message...",
            Operation::SendMessageWithTip => "Sending your message and tip...",
            Operation::Stake => "Staking your tokens...",
            Operation::Unstake => "Unstaking your tokens...",
            Operation::RegisterUsername => "Registering your account...",
            Operation::ClaimRewards => "Claiming your rewards...",
            Operation::SetMinStakeAmount => "Setting minimum stake amount...",
            Operation::SetRewardRate => "Setting reward rate...",
            Operation::SetRewardInterval => "Setting reward interval...",
            Operation::WithdrawTokens => "Withdrawing tokens...",
        }
    }

    /// Sentence shown when the write confirms.
    pub fn success_message(&self) -> &'static str {
        match self {
            Operation::SendMessage => "Your message has been sent successfully!",
            Operation::SendMessageWithTip => "Your message and tip have been sent successfully!",
            Operation::Stake => "Your tokens have been staked successfully!",
            Operation::Unstake => "Your tokens have been unstaked successfully!",
            Operation::RegisterUsername => "Your account has been registered successfully!",
            Operation::ClaimRewards => "Your rewards have been claimed successfully!",
            Operation::SetMinStakeAmount => "Minimum stake amount has been updated successfully!",
            Operation::SetRewardRate => "Reward rate has been updated successfully!",
            Operation::SetRewardInterval => "Reward interval has been updated successfully!",
            Operation::WithdrawTokens => "Tokens have been withdrawn successfully!",
        }
    }

    /// Sentence shown when the write fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::SendMessage => "Failed to send message. Please try again.",
            Operation::SendMessageWithTip => "Failed to send message with tip. Please try again.",
            Operation::Stake => "Failed to stake tokens. Please try again.",
            Operation::Unstake => "Failed to unstake tokens. Please try again.",
            Operation::RegisterUsername => "Failed to register user. Please try again.",
            Operation::ClaimRewards => "Failed to claim rewards. Please try again.",
            Operation::SetMinStakeAmount => {
                "Failed to update minimum stake amount. Please try again."
            }
            Operation::SetRewardRate => "Failed to update reward rate. Please try again.",
            Operation::SetRewardInterval => "Failed to update reward interval. Please try again.",
            Operation::WithdrawTokens => "Failed to withdraw tokens. Please try again.",
        }
    }
}

/// Terminal result of a tracked write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OperationOutcome {
    Success { message: String },
    Error { message: String },
}

impl OperationOutcome {
    pub fn message(&self) -> &str {
        match self {
            OperationOutcome::Success { message } | OperationOutcome::Error { message } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success { .. })
    }
}

/// One notification for the embedding shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NotificationEvent {
    #[serde(rename_all = "camelCase")]
    Pending {
        operation_id: Uuid,
        kind: Operation,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        operation_id: Uuid,
        kind: Operation,
        outcome: OperationOutcome,
    },
}

impl NotificationEvent {
    pub fn operation_id(&self) -> Uuid {
        match self {
            NotificationEvent::Pending { operation_id, .. }
            | NotificationEvent::Completed { operation_id, .. } => *operation_id,
        }
    }

    /// How long the notice should stay on screen. `None` means it stays
    /// until the completion event with the same operation id arrives.
    pub fn display_duration(&self) -> Option<Duration> {
        match self {
            NotificationEvent::Pending { .. } => None,
            NotificationEvent::Completed { .. } => Some(COMPLETED_DISPLAY),
        }
    }
}

/// Emits lifecycle notifications for contract writes.
///
/// Delivery is best effort: a full or closed channel drops the event with a
/// warning and the write itself is unaffected.
#[derive(Debug, Clone)]
pub(crate) struct OperationTracker {
    events: mpsc::Sender<NotificationEvent>,
}

impl OperationTracker {
    pub(crate) fn new() -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (events, receiver) = mpsc::channel(EVENT_BUFFER_SIZE);
        (Self { events }, receiver)
    }

    /// Announces a new write and returns the id its completion must carry.
    pub(crate) fn begin(&self, kind: Operation) -> Uuid {
        let operation_id = Uuid::new_v4();
        self.emit(NotificationEvent::Pending {
            operation_id,
            kind,
            message: kind.loading_message().to_string(),
        });
        operation_id
    }

    pub(crate) fn succeed(&self, operation_id: Uuid, kind: Operation) {
        self.emit(NotificationEvent::Completed {
            operation_id,
            kind,
            outcome: OperationOutcome::Success {
                message: kind.success_message().to_string(),
            },
        });
    }

    /// Reports a failed write. The mapped chain error is appended to the
    /// kind's failure sentence when it says something the sentence does not.
    pub(crate) fn fail(&self, operation_id: Uuid, kind: Operation, error: &FriendFiError) {
        let message = completion_error_message(kind, &user_facing_message(error));
        self.emit(NotificationEvent::Completed {
            operation_id,
            kind,
            outcome: OperationOutcome::Error { message },
        });
    }

    fn emit(&self, event: NotificationEvent) {
        if let Err(e) = self.events.try_send(event) {
            tracing::warn!("Dropped notification event: {}", e);
        }
    }
}

fn completion_error_message(kind: Operation, mapped: &str) -> String {
    let generic = kind.failure_message();
    if mapped != generic && !generic.contains(mapped) {
        format!("{generic}: {mapped}")
    } else {
        generic.to_string()
    }
}

/// Maps a write error onto the sentence shown to the user.
///
/// Known chain failure modes are recognized by substring; anything else
/// passes through unchanged.
pub(crate) fn user_facing_message(error: &FriendFiError) -> String {
    let raw = error.to_string();

    if raw.contains("insufficient funds") {
        return "Insufficient funds for transaction. Please check your balance.".to_string();
    }
    if raw.contains("user rejected") {
        return "Transaction was cancelled by user.".to_string();
    }
    if raw.contains("nonce too low") {
        return "Transaction nonce is too low. Please try again.".to_string();
    }
    if raw.contains("gas required exceeds allowance") {
        return "Insufficient gas for transaction. Please increase gas limit.".to_string();
    }
    if raw.contains("execution reverted") {
        return "Transaction failed. Please check your input parameters.".to_string();
    }
    if raw.contains("already processed") {
        return "This transaction has already been processed.".to_string();
    }
    if raw.contains("position not found") {
        return "Position not found. It may have been already unstaked.".to_string();
    }
    if raw.contains("no rewards to claim") {
        return "No rewards available to claim at this time.".to_string();
    }
    if raw.contains("position not active") {
        return "Position is not active. It may have expired or been unstaked.".to_string();
    }
    if raw.contains("insufficient balance") {
        return "Insufficient token balance for this operation.".to_string();
    }
    if raw.contains("duration not allowed") {
        return "Selected duration is not allowed for this staking type.".to_string();
    }
    if raw.contains("minimum stake not met") {
        return "Minimum stake amount not met. Please increase your stake.".to_string();
    }
    if raw.contains("maximum stake exceeded") {
        return "Maximum stake amount exceeded. Please reduce your stake.".to_string();
    }
    if raw.contains("network") || raw.contains("connection") {
        return "Network connection error. Please check your internet connection.".to_string();
    }
    if raw.contains("timeout") {
        return "Request timed out. Please try again.".to_string();
    }
    if raw.contains("wallet") || raw.contains("account") {
        return "Wallet connection error. Please reconnect your wallet.".to_string();
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainClientError;

    fn chain_error(message: &str) -> FriendFiError {
        FriendFiError::ChainClient(ChainClientError::Rpc {
            code: -32000,
            message: message.to_string(),
        })
    }

    #[test]
    fn test_error_mapping_recognizes_known_failures() {
        let cases = [
            (
                "insufficient funds for gas * price + value",
                "Insufficient funds for transaction. Please check your balance.",
            ),
            (
                "user rejected the request",
                "Transaction was cancelled by user.",
            ),
            ("nonce too low", "Transaction nonce is too low. Please try again."),
            (
                "gas required exceeds allowance (21000)",
                "Insufficient gas for transaction. Please increase gas limit.",
            ),
            (
                "execution reverted: something bad",
                "Transaction failed. Please check your input parameters.",
            ),
            (
                "minimum stake not met",
                "Minimum stake amount not met. Please increase your stake.",
            ),
            (
                "request timeout exceeded",
                "Request timed out. Please try again.",
            ),
        ];

        for (raw, expected) in cases {
            assert_eq!(
                user_facing_message(&chain_error(raw)),
                expected,
                "raw error: {raw}"
            );
        }
    }

    #[test]
    fn test_error_mapping_priority_and_passthrough() {
        // "network" outranks "timeout" in the substring chain.
        assert_eq!(
            user_facing_message(&chain_error("network timeout while polling")),
            "Network connection error. Please check your internet connection."
        );
        // Unrecognized errors pass through unchanged.
        let passthrough = user_facing_message(&chain_error("something nobody anticipated"));
        assert!(passthrough.contains("something nobody anticipated"));
    }

    #[test]
    fn test_wallet_errors_map_to_reconnect_sentence() {
        assert_eq!(
            user_facing_message(&FriendFiError::NoWalletConnected),
            "Wallet connection error. Please reconnect your wallet."
        );
    }

    #[tokio::test]
    async fn test_tracker_emits_pending_then_success() {
        let (tracker, mut receiver) = OperationTracker::new();

        let id = tracker.begin(Operation::Stake);
        tracker.succeed(id, Operation::Stake);

        let pending = receiver.recv().await.unwrap();
        match &pending {
            NotificationEvent::Pending { kind, message, .. } => {
                assert_eq!(*kind, Operation::Stake);
                assert_eq!(message, "Staking your tokens...");
            }
            other => panic!("Expected pending event, got {:?}", other),
        }
        assert!(pending.display_duration().is_none());

        let completed = receiver.recv().await.unwrap();
        match &completed {
            NotificationEvent::Completed { kind, outcome, .. } => {
                assert_eq!(*kind, Operation::Stake);
                assert!(outcome.is_success());
                assert_eq!(outcome.message(), "Your tokens have been staked successfully!");
            }
            other => panic!("Expected completed event, got {:?}", other),
        }
        assert_eq!(pending.operation_id(), completed.operation_id());
        assert_eq!(completed.display_duration(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_tracker_appends_mapped_error_detail() {
        let (tracker, mut receiver) = OperationTracker::new();

        let id = tracker.begin(Operation::SendMessage);
        tracker.fail(
            id,
            Operation::SendMessage,
            &chain_error("insufficient funds for transfer"),
        );

        let _pending = receiver.recv().await.unwrap();
        let completed = receiver.recv().await.unwrap();
        match completed {
            NotificationEvent::Completed { outcome, .. } => {
                assert!(!outcome.is_success());
                assert_eq!(
                    outcome.message(),
                    "Failed to send message. Please try again.: \
                     Insufficient funds for transaction. Please check your balance."
                );
            }
            other => panic!("Expected completed event, got {:?}", other),
        }
    }

    #[test]
    fn test_completion_message_skips_detail_that_adds_nothing() {
        // Identical or contained detail is not appended twice.
        assert_eq!(
            completion_error_message(
                Operation::Unstake,
                "Failed to unstake tokens. Please try again."
            ),
            "Failed to unstake tokens. Please try again."
        );
        assert_eq!(
            completion_error_message(Operation::Unstake, "Please try again."),
            "Failed to unstake tokens. Please try again."
        );
        assert_eq!(
            completion_error_message(Operation::Unstake, "gateway exploded"),
            "Failed to unstake tokens. Please try again.: gateway exploded"
        );
    }

    #[tokio::test]
    async fn test_tracker_tolerates_dropped_receiver() {
        let (tracker, receiver) = OperationTracker::new();
        drop(receiver);

        // Must not panic or error; delivery is best effort.
        let id = tracker.begin(Operation::ClaimRewards);
        tracker.succeed(id, Operation::ClaimRewards);
    }

    #[test]
    fn test_events_serialize_with_tags() {
        let event = NotificationEvent::Pending {
            operation_id: Uuid::nil(),
            kind: Operation::SendMessage,
            message: "Sending your message...".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "pending");
        assert_eq!(json["kind"], "sendMessage");
        assert_eq!(json["operationId"], Uuid::nil().to_string());
    }
}
