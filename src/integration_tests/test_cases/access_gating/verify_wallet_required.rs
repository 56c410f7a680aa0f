use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::{AccessStatus, FriendFiError};

/// Without a connected wallet the gate reports the wallet step, as a
/// status rather than an error.
pub struct VerifyWalletRequiredTestCase;

impl VerifyWalletRequiredTestCase {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TestCase for VerifyWalletRequiredTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        context.friendfi.disconnect_account().await?;

        let status = context.friendfi.access_status().await;
        assert_eq!(
            status,
            AccessStatus::WalletRequired,
            "Disconnected session should report the wallet gate"
        );

        tracing::info!("✓ Wallet gate reported while disconnected");
        Ok(())
    }
}
