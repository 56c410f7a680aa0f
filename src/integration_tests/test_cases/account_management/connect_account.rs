use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::{FriendFiError, SignerKind};

/// Connects a brand new generated wallet and verifies it occupies the
/// session and is persisted.
pub struct ConnectAccountTestCase {
    name: &'static str,
}

impl ConnectAccountTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for ConnectAccountTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        tracing::info!("Connecting a freshly generated wallet...");
        let account = context.friendfi.connect_account().await?;

        assert!(account.id.is_some(), "Account row was not persisted");
        assert_eq!(account.signer_kind, SignerKind::Ephemeral);
        assert!(account.username.is_none());
        assert_eq!(
            context.friendfi.connected_address().await,
            Some(account.address)
        );

        let all = context.friendfi.all_accounts().await?;
        assert!(
            all.iter().any(|a| a.address == account.address),
            "Connected wallet missing from the account list"
        );

        tracing::info!("✓ Generated wallet {:#x} connected", account.address);
        context.add_account(self.name, account);
        Ok(())
    }
}
