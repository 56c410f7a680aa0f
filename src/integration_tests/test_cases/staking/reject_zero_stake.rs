use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

/// A zero stake is refused locally; no transaction is built.
pub struct RejectZeroStakeTestCase;

impl RejectZeroStakeTestCase {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TestCase for RejectZeroStakeTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let result = context.friendfi.stake(U256::ZERO).await;
        assert!(
            matches!(result, Err(FriendFiError::InvalidAmount(_))),
            "Expected InvalidAmount for a zero stake, got {:?}",
            result.map(|o| o.tx_hash)
        );

        tracing::info!("✓ Zero stake rejected before signing");
        Ok(())
    }
}
