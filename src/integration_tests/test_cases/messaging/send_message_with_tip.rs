use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{FriendFiError, MessageBody};

/// A hundredth of a token, plenty for a devnet tip.
const TIP_AMOUNT: u64 = 10_000_000_000_000_000;

/// Sends a tipped message and verifies the tip lands in both wallets'
/// tip statistics.
pub struct SendMessageWithTipTestCase {
    sender: &'static str,
    receiver: &'static str,
}

impl SendMessageWithTipTestCase {
    pub fn new(sender: &'static str, receiver: &'static str) -> Self {
        Self { sender, receiver }
    }
}

#[async_trait]
impl TestCase for SendMessageWithTipTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.sender).await?;
        let sender_address = context.get_account(self.sender)?.address;
        let receiver_address = context.get_account(self.receiver)?.address;
        let tip = U256::from(TIP_AMOUNT);

        let sender_before = context.friendfi.user_activity(sender_address).await;
        let receiver_before = context.friendfi.user_activity(receiver_address).await;

        let text = format!("tip from {} at {:04x}", self.sender, rand::random::<u16>());
        tracing::info!("Sending tipped message with {} attached...", tip);
        let outcome = context
            .friendfi
            .send_message(
                receiver_address,
                MessageBody::Text(text.clone()),
                Some(tip),
                false,
            )
            .await?;
        assert!(outcome.block_number.is_some(), "Tipped message not mined");

        let expected_sent = sender_before.tips_sent + tip;
        let expected_received = receiver_before.tips_received + tip;
        retry_until(
            RetryConfig::outlast_cache(),
            || async {
                let sender_after = context.friendfi.user_activity(sender_address).await;
                let receiver_after = context.friendfi.user_activity(receiver_address).await;
                if sender_after.tips_sent >= expected_sent
                    && receiver_after.tips_received >= expected_received
                {
                    Ok(())
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "tip stats not updated yet"
                    )))
                }
            },
            "tip statistics update",
        )
        .await?;

        tracing::info!("✓ Tip of {} reflected in both wallets' stats", tip);
        context.add_sent_text(&format!("{}-tip-text", self.sender), text);
        Ok(())
    }
}
