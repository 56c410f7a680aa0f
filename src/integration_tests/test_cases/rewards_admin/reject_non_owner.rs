use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

/// Verifies an admin write from a non-owner wallet fails with an
/// authorization error before anything is signed.
pub struct RejectNonOwnerTestCase {
    name: &'static str,
}

impl RejectNonOwnerTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for RejectNonOwnerTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        assert!(
            !context.friendfi.is_owner().await,
            "'{}' unexpectedly owns the contract",
            self.name
        );

        let result = context.friendfi.set_reward_rate(U256::from(1u64)).await;
        assert!(
            matches!(result, Err(FriendFiError::AccountNotAuthorized(_))),
            "Non-owner admin write did not fail with an authorization error: {:?}",
            result.map(|outcome| outcome.tx_hash)
        );

        tracing::info!("✓ Non-owner admin write rejected before signing");
        Ok(())
    }
}
