use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{FriendFiError, MessageBody};

/// Sends a text message and verifies the transaction mines and the
/// sender's message count moves.
pub struct SendTextMessageTestCase {
    sender: &'static str,
    receiver: &'static str,
}

impl SendTextMessageTestCase {
    pub fn new(sender: &'static str, receiver: &'static str) -> Self {
        Self { sender, receiver }
    }
}

#[async_trait]
impl TestCase for SendTextMessageTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.sender).await?;
        let receiver = context.get_account(self.receiver)?.address;
        let sender_address = context.get_account(self.sender)?.address;

        let activity_before = context.friendfi.user_activity(sender_address).await;

        let text = format!(
            "hello from {} at {:04x}",
            self.sender,
            rand::random::<u16>()
        );
        tracing::info!("Sending '{}' to '{}'...", text, self.receiver);
        let outcome = context
            .friendfi
            .send_message(receiver, MessageBody::Text(text.clone()), None, false)
            .await?;

        assert!(!outcome.tx_hash.is_empty());
        assert!(outcome.block_number.is_some(), "Message was not mined");
        tracing::info!("Message mined: {}", outcome.tx_hash);

        let expected = activity_before.message_count + 1;
        retry_until(
            RetryConfig::default(),
            || async {
                let activity = context.friendfi.user_activity(sender_address).await;
                if activity.message_count >= expected {
                    Ok(())
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "message count still {}",
                        activity.message_count
                    )))
                }
            },
            "sender message count",
        )
        .await?;

        tracing::info!("✓ Message count advanced to at least {}", expected);
        context.add_sent_text(&format!("{}-text", self.sender), text);
        Ok(())
    }
}
