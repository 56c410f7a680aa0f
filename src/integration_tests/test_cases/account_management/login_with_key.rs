use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::{FriendFiError, SignerKind};

/// Imports a funded devnet key twice and verifies the second login lands
/// on the same row instead of creating a duplicate.
pub struct LoginWithKeyTestCase {
    name: &'static str,
}

impl LoginWithKeyTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for LoginWithKeyTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let key = context.claim_funded_key(self.name)?.to_string();

        tracing::info!("Logging in with an imported key...");
        let first = context.friendfi.login_account(&key).await?;
        assert_eq!(first.signer_kind, SignerKind::Local);
        assert_eq!(
            context.friendfi.connected_address().await,
            Some(first.address)
        );

        let count_after_first = context.friendfi.all_accounts().await?.len();

        tracing::info!("Logging in again with the same key...");
        let second = context.friendfi.login_account(&key).await?;
        assert_eq!(second.address, first.address);

        let count_after_second = context.friendfi.all_accounts().await?.len();
        assert_eq!(
            count_after_first, count_after_second,
            "Repeat login duplicated the account row"
        );

        tracing::info!("✓ Key login verified for {:#x}", first.address);
        context.add_account(self.name, second);
        Ok(())
    }
}
