//! Access gating for the chat surfaces.
//!
//! One evaluation replaces scattered per-page checks: every gated surface
//! asks for the current [`AccessStatus`] and matches on it.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::FriendFiError;
use crate::friendfi::FriendFi;
use crate::friendfi::cache::QueryKey;

/// Where the connected wallet stands on the way into the chat.
///
/// Evaluated in a fixed order: no wallet, unresolved reads, missing
/// username, missing stake, granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AccessStatus {
    /// No account is connected.
    WalletRequired,
    /// The gating reads have not resolved; try again shortly.
    Checking,
    /// The wallet has no on-chain username yet.
    RegistrationRequired,
    /// The wallet has a username but nothing staked.
    #[serde(rename_all = "camelCase")]
    StakeRequired { minimum: U256 },
    /// All gates passed.
    Granted,
}

fn evaluate(has_username: bool, staked_amount: U256, minimum: U256) -> AccessStatus {
    if !has_username {
        return AccessStatus::RegistrationRequired;
    }
    if staked_amount.is_zero() {
        return AccessStatus::StakeRequired { minimum };
    }
    AccessStatus::Granted
}

impl FriendFi {
    /// Evaluates the access gates for the connected wallet.
    ///
    /// Gating reads that fail map to [`AccessStatus::Checking`] rather than
    /// an error; the minimum stake shown with
    /// [`AccessStatus::StakeRequired`] falls back to zero when its read
    /// fails, since by then the gate itself is already decided.
    pub async fn access_status(&self) -> AccessStatus {
        let Some(address) = self.connected_address().await else {
            return AccessStatus::WalletRequired;
        };

        let has_username = match self.gate_has_username(address).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(target: "friendfi::access", "username gate unresolved: {}", e);
                return AccessStatus::Checking;
            }
        };
        if !has_username {
            return AccessStatus::RegistrationRequired;
        }

        let staked_amount = match self.gate_staked_amount(address).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(target: "friendfi::access", "stake gate unresolved: {}", e);
                return AccessStatus::Checking;
            }
        };
        if staked_amount.is_zero() {
            let minimum = self.gate_min_stake_amount().await.unwrap_or_else(|e| {
                tracing::debug!(target: "friendfi::access", "minimum stake unresolved: {}", e);
                U256::ZERO
            });
            return AccessStatus::StakeRequired { minimum };
        }

        AccessStatus::Granted
    }

    async fn gate_has_username(&self, address: Address) -> Result<bool, FriendFiError> {
        self.cache
            .get_or_fetch(QueryKey::HasUsername(address), || async move {
                self.chain
                    .has_username(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
    }

    async fn gate_staked_amount(&self, address: Address) -> Result<U256, FriendFiError> {
        self.cache
            .get_or_fetch(QueryKey::StakedAmount(address), || async move {
                self.chain
                    .staked_amount(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
    }

    async fn gate_min_stake_amount(&self) -> Result<U256, FriendFiError> {
        self.cache
            .get_or_fetch(QueryKey::MinStakeAmount, || async move {
                self.chain
                    .min_stake_amount()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friendfi::test_utils::create_mock_friendfi;

    #[test]
    fn test_evaluate_requires_registration_first() {
        let status = evaluate(false, U256::from(1_000u64), U256::from(10u64));
        assert_eq!(status, AccessStatus::RegistrationRequired);
    }

    #[test]
    fn test_evaluate_requires_stake_after_registration() {
        let status = evaluate(true, U256::ZERO, U256::from(10u64));
        assert_eq!(
            status,
            AccessStatus::StakeRequired {
                minimum: U256::from(10u64)
            }
        );
    }

    #[test]
    fn test_evaluate_grants_with_username_and_stake() {
        let status = evaluate(true, U256::from(1u64), U256::from(10u64));
        assert_eq!(status, AccessStatus::Granted);
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_value(AccessStatus::StakeRequired {
            minimum: U256::from(5u64),
        })
        .unwrap();
        assert_eq!(json["status"], "stakeRequired");
        assert!(json.get("minimum").is_some());

        let json = serde_json::to_value(AccessStatus::WalletRequired).unwrap();
        assert_eq!(json["status"], "walletRequired");
    }

    #[tokio::test]
    async fn test_access_status_without_wallet() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;
        assert_eq!(friendfi.access_status().await, AccessStatus::WalletRequired);
    }

    #[tokio::test]
    async fn test_access_status_checking_when_chain_unreachable() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let account = friendfi.connect_account().await.unwrap();
        assert_eq!(friendfi.access_status().await, AccessStatus::Checking);

        friendfi.remove_account(&account.address).await.unwrap();
    }
}
