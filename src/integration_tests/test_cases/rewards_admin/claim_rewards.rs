use async_trait::async_trait;

use crate::chain::ChainClientError;
use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

/// Claims accrued rewards. A revert is tolerated: a freshly staked
/// wallet usually has nothing to claim yet.
pub struct ClaimRewardsTestCase {
    name: &'static str,
}

impl ClaimRewardsTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for ClaimRewardsTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        let accrued = context.friendfi.accrued_rewards().await;
        tracing::info!("'{}' has {} rewards accrued", self.name, accrued);

        match context.friendfi.claim_rewards().await {
            Ok(outcome) => {
                assert!(outcome.block_number.is_some(), "Claim not mined");
                tracing::info!("✓ Claimed rewards in {}", outcome.tx_hash);
            }
            Err(FriendFiError::ChainClient(ChainClientError::Reverted(reason))) => {
                tracing::warn!(
                    "Claim reverted ({}); nothing accrued yet on this deployment",
                    reason
                );
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }
}
