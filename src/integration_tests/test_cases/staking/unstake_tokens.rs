use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;
use crate::chain::ChainClientError;

/// Withdraws the whole stake. Some contract deployments refuse the
/// withdrawal while rewards are pending; that revert is tolerated and
/// logged, since the claim flow is covered separately.
pub struct UnstakeTokensTestCase {
    name: &'static str,
}

impl UnstakeTokensTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for UnstakeTokensTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        let staked_before = context.friendfi.staked_amount().await;
        assert!(
            !staked_before.is_zero(),
            "Nothing staked for '{}'; run the stake case first",
            self.name
        );

        tracing::info!("Unstaking {} for '{}'...", staked_before, self.name);
        match context.friendfi.unstake().await {
            Ok(outcome) => {
                assert!(outcome.block_number.is_some(), "Unstake was not mined");

                let staked_after = retry_until(
                    RetryConfig::default(),
                    || async {
                        let staked = context.friendfi.staked_amount().await;
                        if staked < staked_before {
                            Ok(staked)
                        } else {
                            Err(FriendFiError::Other(anyhow::anyhow!(
                                "stake read still at {}",
                                staked
                            )))
                        }
                    },
                    "stake withdrawal",
                )
                .await?;
                tracing::info!("✓ Stake withdrawn: {} -> {}", staked_before, staked_after);
            }
            Err(FriendFiError::ChainClient(ChainClientError::Reverted(reason))) => {
                tracing::warn!(
                    "Unstake reverted ({}); deployment requires claiming first",
                    reason
                );
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }
}
