use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{AccessStatus, FriendFiError};

/// Fallback stake when the contract reports no minimum: one whole token.
const DEFAULT_STAKE: u64 = 1_000_000_000_000_000_000;

/// Each gate step is one transaction, so a handful of passes suffices.
const MAX_GATE_STEPS: usize = 6;

/// Walks the named wallet through the access gate until it is granted:
/// registers a username if one is missing, stakes the minimum if nothing
/// is staked. Usernames get a random suffix so reruns against a shared
/// devnet do not collide.
pub struct EnsureChatAccessTestCase {
    name: &'static str,
}

impl EnsureChatAccessTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for EnsureChatAccessTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        for _ in 0..MAX_GATE_STEPS {
            match context.friendfi.access_status().await {
                AccessStatus::Granted => {
                    tracing::info!("✓ Wallet '{}' cleared the access gate", self.name);
                    return Ok(());
                }
                AccessStatus::WalletRequired => {
                    return Err(FriendFiError::NoWalletConnected);
                }
                AccessStatus::Checking => {
                    tracing::debug!("Gate reads for '{}' still resolving...", self.name);
                    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
                }
                AccessStatus::RegistrationRequired => {
                    let username = format!("{}-{:04x}", self.name, rand::random::<u16>());
                    tracing::info!("Registering username '{}' for '{}'", username, self.name);
                    context.friendfi.register_username(&username).await?;
                    context.add_username(self.name, username);
                }
                AccessStatus::StakeRequired { minimum } => {
                    let amount = if minimum.is_zero() {
                        U256::from(DEFAULT_STAKE)
                    } else {
                        minimum
                    };
                    tracing::info!("Staking {} for '{}'", amount, self.name);
                    context.friendfi.stake(amount).await?;
                }
            }
        }

        Err(FriendFiError::Other(anyhow::anyhow!(
            "Wallet '{}' was not granted access after {} gate steps",
            self.name,
            MAX_GATE_STEPS
        )))
    }
}
