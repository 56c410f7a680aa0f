use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{FriendFiError, MessageBody};

/// A hundredth of a token, so the tip counters have something to show.
const SEED_TIP: u64 = 10_000_000_000_000_000;

/// Sends one plain and one tipped message so the dashboard and analytics
/// views have non-zero numbers to verify against.
pub struct SeedActivityTestCase {
    sender: &'static str,
    receiver: &'static str,
}

impl SeedActivityTestCase {
    pub fn new(sender: &'static str, receiver: &'static str) -> Self {
        Self { sender, receiver }
    }
}

#[async_trait]
impl TestCase for SeedActivityTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.sender).await?;
        let receiver_address = context.get_account(self.receiver)?.address;

        let text = format!(
            "activity seed from {} at {:04x}",
            self.sender,
            rand::random::<u16>()
        );
        let plain = context
            .friendfi
            .send_message(
                receiver_address,
                MessageBody::Text(text.clone()),
                None,
                false,
            )
            .await?;
        assert!(plain.block_number.is_some(), "Seed message not mined");

        let tipped = context
            .friendfi
            .send_message(
                receiver_address,
                MessageBody::Text(format!("tipped {}", text)),
                Some(U256::from(SEED_TIP)),
                false,
            )
            .await?;
        assert!(tipped.block_number.is_some(), "Seed tip not mined");

        tracing::info!(
            "✓ Seeded two messages from '{}' to '{}' ({} and {})",
            self.sender,
            self.receiver,
            plain.tx_hash,
            tipped.tx_hash
        );
        context.add_sent_text(&format!("{}-seed-text", self.sender), text);
        Ok(())
    }
}
