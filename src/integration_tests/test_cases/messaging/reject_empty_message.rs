use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{FriendFiError, MessageBody};

/// Whitespace-only text is refused before any upload or signing.
pub struct RejectEmptyMessageTestCase {
    sender: &'static str,
    receiver: &'static str,
}

impl RejectEmptyMessageTestCase {
    pub fn new(sender: &'static str, receiver: &'static str) -> Self {
        Self { sender, receiver }
    }
}

#[async_trait]
impl TestCase for RejectEmptyMessageTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.sender).await?;
        let receiver = context.get_account(self.receiver)?.address;

        let result = context
            .friendfi
            .send_message(receiver, MessageBody::Text("   ".to_string()), None, false)
            .await;

        assert!(
            matches!(result, Err(FriendFiError::EmptyMessage)),
            "Expected EmptyMessage, got {:?}",
            result.map(|o| o.tx_hash)
        );

        tracing::info!("✓ Empty message rejected locally");
        Ok(())
    }
}
