use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

/// Raises the minimum stake by one wei and puts it back, verifying each
/// value lands in the parameter read. Skips when the wallet is not the
/// contract owner.
pub struct UpdateMinStakeTestCase {
    name: &'static str,
}

impl UpdateMinStakeTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for UpdateMinStakeTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        if !context.friendfi.is_owner().await {
            tracing::warn!(
                "'{}' does not own the contract; was it deployed by another key?",
                self.name
            );
            return Ok(());
        }

        let original = context.friendfi.min_stake_amount().await;
        let raised = original + U256::from(1u64);
        tracing::info!("Raising minimum stake from {} to {}...", original, raised);

        let outcome = context.friendfi.set_min_stake_amount(raised).await?;
        assert!(outcome.block_number.is_some(), "Parameter update not mined");
        retry_until(
            RetryConfig::default(),
            || async {
                let current = context.friendfi.min_stake_amount().await;
                if current == raised {
                    Ok(())
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "minimum stake still reads {}",
                        current
                    )))
                }
            },
            "raised minimum stake visible",
        )
        .await?;

        // Restore so the other scenarios see the deployment's value
        let outcome = context.friendfi.set_min_stake_amount(original).await?;
        assert!(outcome.block_number.is_some(), "Parameter restore not mined");
        retry_until(
            RetryConfig::default(),
            || async {
                let current = context.friendfi.min_stake_amount().await;
                if current == original {
                    Ok(())
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "minimum stake still reads {}",
                        current
                    )))
                }
            },
            "restored minimum stake visible",
        )
        .await?;

        tracing::info!("✓ Minimum stake raised and restored by the owner");
        Ok(())
    }
}
