use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

const DEFAULT_STAKE: u64 = 1_000_000_000_000_000_000;

/// Stakes the contract minimum and verifies the stake and balance reads
/// pick the change up once the transaction is mined.
pub struct StakeTokensTestCase {
    name: &'static str,
}

impl StakeTokensTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for StakeTokensTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        let minimum = context.friendfi.min_stake_amount().await;
        let amount = if minimum.is_zero() {
            U256::from(DEFAULT_STAKE)
        } else {
            minimum
        };
        let staked_before = context.friendfi.staked_amount().await;
        let balance_before = context.friendfi.native_balance().await;
        assert!(
            balance_before > amount,
            "Wallet '{}' cannot cover the stake of {}",
            self.name,
            amount
        );

        tracing::info!("Staking {} for '{}'...", amount, self.name);
        let outcome = context.friendfi.stake(amount).await?;
        assert!(!outcome.tx_hash.is_empty());
        assert!(outcome.block_number.is_some(), "Stake was not mined");
        tracing::info!("Stake mined: {}", outcome.tx_hash);

        // Writes drop the cached reads, so these hit the node directly
        let expected = staked_before + amount;
        let staked_after = retry_until(
            RetryConfig::default(),
            || async {
                let staked = context.friendfi.staked_amount().await;
                if staked >= expected {
                    Ok(staked)
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "stake read still at {}",
                        staked
                    )))
                }
            },
            "staked amount update",
        )
        .await?;

        let balance_after = context.friendfi.native_balance().await;
        assert!(
            balance_after <= balance_before - amount,
            "Balance did not drop by at least the staked amount"
        );

        tracing::info!(
            "✓ Stake verified: {} staked, balance {} -> {}",
            staked_after,
            balance_before,
            balance_after
        );
        Ok(())
    }
}
