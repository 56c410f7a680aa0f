use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::{FriendFiError, SignerKind};

/// Logs a pre-funded devnet wallet in under a scenario-local name.
///
/// The first call for a name claims the next funded key; repeat calls
/// reuse the stored key, so the wallet keeps its address.
pub struct LoginFundedWalletTestCase {
    name: &'static str,
}

impl LoginFundedWalletTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for LoginFundedWalletTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let key = match context.keys.get(self.name) {
            Some(key) => key.clone(),
            None => context.claim_funded_key(self.name)?.to_string(),
        };

        tracing::info!("Logging in funded wallet '{}'...", self.name);
        let account = context.friendfi.login_account(&key).await?;

        assert_eq!(account.signer_kind, SignerKind::Local);
        assert_eq!(
            context.friendfi.connected_address().await,
            Some(account.address),
            "Login did not make the wallet the connected session"
        );

        let balance = context.friendfi.native_balance().await;
        assert!(
            !balance.is_zero(),
            "Devnet wallet '{}' ({:#x}) has no funds; is the devnet running?",
            self.name,
            account.address
        );

        tracing::info!(
            "✓ Wallet '{}' connected as {:#x} with balance {}",
            self.name,
            account.address,
            balance
        );
        context.add_account(self.name, account);
        Ok(())
    }
}
