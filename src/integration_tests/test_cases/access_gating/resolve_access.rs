use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{AccessStatus, FriendFiError};

const DEFAULT_STAKE: u64 = 1_000_000_000_000_000_000;
const MAX_GATE_STEPS: usize = 6;

/// Resolves each gate in turn and asserts the status never moves
/// backwards: wallet, then username, then stake, then granted. A wallet
/// reused from an earlier run may start partway through; it must still
/// only move forward.
pub struct ResolveAccessTestCase {
    name: &'static str,
}

impl ResolveAccessTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Position of a status along the gate progression.
    fn rank(status: &AccessStatus) -> Option<u8> {
        match status {
            AccessStatus::WalletRequired => Some(0),
            AccessStatus::RegistrationRequired => Some(1),
            AccessStatus::StakeRequired { .. } => Some(2),
            AccessStatus::Granted => Some(3),
            // Unresolved reads carry no position
            AccessStatus::Checking => None,
        }
    }
}

#[async_trait]
impl TestCase for ResolveAccessTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        let mut highest_rank = 1u8; // Logged in, so the wallet gate is behind us
        for step in 0..MAX_GATE_STEPS {
            let status = context.friendfi.access_status().await;
            tracing::info!("Gate step {}: {:?}", step, status);

            if let Some(rank) = Self::rank(&status) {
                assert!(
                    rank >= highest_rank,
                    "Access status moved backwards: {:?} after reaching rank {}",
                    status,
                    highest_rank
                );
                highest_rank = rank;
            }

            match status {
                AccessStatus::Granted => {
                    tracing::info!("✓ Access granted for '{}'", self.name);
                    return Ok(());
                }
                AccessStatus::WalletRequired => {
                    return Err(FriendFiError::NoWalletConnected);
                }
                AccessStatus::Checking => {
                    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
                }
                AccessStatus::RegistrationRequired => {
                    let username = format!("{}-{:04x}", self.name, rand::random::<u16>());
                    context.friendfi.register_username(&username).await?;
                    context.add_username(self.name, username);
                }
                AccessStatus::StakeRequired { minimum } => {
                    let amount = if minimum.is_zero() {
                        U256::from(DEFAULT_STAKE)
                    } else {
                        minimum
                    };
                    context.friendfi.stake(amount).await?;
                }
            }
        }

        Err(FriendFiError::Other(anyhow::anyhow!(
            "Access gate did not resolve to Granted within {} steps",
            MAX_GATE_STEPS
        )))
    }
}
