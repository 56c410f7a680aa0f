use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

/// Removes a wallet and verifies both the row and the stored key are gone.
pub struct RemoveAccountTestCase {
    name: &'static str,
}

impl RemoveAccountTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for RemoveAccountTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let account = context.get_account(self.name)?.clone();

        tracing::info!("Removing wallet '{}' ({:#x})...", self.name, account.address);
        context.friendfi.remove_account(&account.address).await?;

        let all = context.friendfi.all_accounts().await?;
        assert!(
            all.iter().all(|a| a.address != account.address),
            "Removed wallet still present in the account list"
        );

        // Removing again reports the missing row
        let repeat = context.friendfi.remove_account(&account.address).await;
        assert!(
            matches!(repeat, Err(FriendFiError::AccountNotFound)),
            "Expected AccountNotFound on repeat removal, got {:?}",
            repeat
        );

        tracing::info!("✓ Wallet {:#x} fully removed", account.address);
        context.accounts.remove(self.name);
        Ok(())
    }
}
