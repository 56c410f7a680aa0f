//! Staking rewards: accrual parameters, the accrued balance, claiming.

use alloy_primitives::{Address, U256};

use crate::chain::publisher::TransactionOutcome;
use crate::error::{FriendFiError, Result};
use crate::friendfi::FriendFi;
use crate::friendfi::cache::QueryKey;
use crate::friendfi::operations::Operation;

impl FriendFi {
    /// Reward tokens accrued per interval per staked token. Zero when the
    /// read fails.
    pub async fn reward_rate(&self) -> U256 {
        self.cache
            .get_or_fetch(QueryKey::RewardRate, || async move {
                self.chain.reward_rate().await.map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "friendfi::rewards", "reward rate read failed: {}", e);
                U256::ZERO
            })
    }

    /// Reward accrual interval in seconds. Zero when the read fails.
    pub async fn reward_interval(&self) -> u64 {
        self.cache
            .get_or_fetch(QueryKey::RewardInterval, || async move {
                self.chain
                    .reward_interval()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "friendfi::rewards", "reward interval read failed: {}", e);
                0
            })
    }

    /// Address of the ERC-20 token rewards pay out in. The zero address
    /// when the read fails.
    pub async fn reward_token(&self) -> Address {
        self.cache
            .get_or_fetch(QueryKey::RewardToken, || async move {
                self.chain.reward_token().await.map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "friendfi::rewards", "reward token read failed: {}", e);
                Address::ZERO
            })
    }

    /// Rewards the connected wallet has accrued but not claimed. Zero when
    /// no wallet is connected or the read fails.
    pub async fn accrued_rewards(&self) -> U256 {
        let Some(address) = self.connected_address().await else {
            return U256::ZERO;
        };
        self.cache
            .get_or_fetch(QueryKey::Rewards(address), || async move {
                self.chain
                    .accrued_rewards(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    target: "friendfi::rewards",
                    "rewards read failed for {:#x}: {}",
                    address,
                    e
                );
                U256::ZERO
            })
    }

    /// Claims all accrued rewards for the connected wallet.
    pub async fn claim_rewards(&self) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;

        let operation_id = self.tracker.begin(Operation::ClaimRewards);
        match self.chain.claim_rewards(signer.as_ref()).await {
            Ok(outcome) => {
                self.tracker.succeed(operation_id, Operation::ClaimRewards);
                self.cache.invalidate(&[
                    QueryKey::Rewards(account.address),
                    QueryKey::Activity(account.address),
                    QueryKey::NativeBalance(account.address),
                ]);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker.fail(operation_id, Operation::ClaimRewards, &e);
                Err(e)
            }
        }
    }
}
