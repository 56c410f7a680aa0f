use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

/// Disconnects the session and verifies the account row survives, so the
/// wallet can log back in later.
pub struct DisconnectAccountTestCase {
    name: &'static str,
}

impl DisconnectAccountTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for DisconnectAccountTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let account = context.get_account(self.name)?.clone();
        assert_eq!(
            context.friendfi.connected_address().await,
            Some(account.address),
            "Wallet '{}' is not the connected session",
            self.name
        );

        tracing::info!("Disconnecting wallet '{}'...", self.name);
        context.friendfi.disconnect_account().await?;

        assert_eq!(context.friendfi.connected_address().await, None);
        let all = context.friendfi.all_accounts().await?;
        assert!(
            all.iter().any(|a| a.address == account.address),
            "Disconnect dropped the account row"
        );

        // The stored key lets the wallet come back without re-importing
        let key = context.get_key(self.name)?.clone();
        let relogged = context.friendfi.login_account(&key).await?;
        assert_eq!(relogged.address, account.address);

        tracing::info!("✓ Disconnect kept row and key for {:#x}", account.address);
        Ok(())
    }
}
