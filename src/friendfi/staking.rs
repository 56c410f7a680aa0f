//! Native-token staking, the deposit that gates chat access.

use alloy_primitives::{Address, U256};

use crate::chain::publisher::TransactionOutcome;
use crate::error::{FriendFiError, Result};
use crate::friendfi::FriendFi;
use crate::friendfi::cache::QueryKey;
use crate::friendfi::operations::Operation;

impl FriendFi {
    /// The connected wallet's staked amount in wei. Zero when no wallet is
    /// connected or the read fails.
    pub async fn staked_amount(&self) -> U256 {
        let Some(address) = self.connected_address().await else {
            return U256::ZERO;
        };
        self.cache
            .get_or_fetch(QueryKey::Stake(address), || async move {
                self.chain
                    .user_stake(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    target: "friendfi::staking",
                    "stake read failed for {:#x}: {}",
                    address,
                    e
                );
                U256::ZERO
            })
    }

    /// The contract's minimum stake requirement in wei. Zero when the read
    /// fails.
    pub async fn min_stake_amount(&self) -> U256 {
        self.cache
            .get_or_fetch(QueryKey::MinStakeAmount, || async move {
                self.chain
                    .min_stake_amount()
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "friendfi::staking", "minimum stake read failed: {}", e);
                U256::ZERO
            })
    }

    /// The connected wallet's native balance in wei. Zero when no wallet is
    /// connected or the read fails.
    pub async fn native_balance(&self) -> U256 {
        let Some(address) = self.connected_address().await else {
            return U256::ZERO;
        };
        self.cache
            .get_or_fetch(QueryKey::NativeBalance(address), || async move {
                self.chain
                    .native_balance(address)
                    .await
                    .map_err(FriendFiError::from)
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    target: "friendfi::staking",
                    "balance read failed for {:#x}: {}",
                    address,
                    e
                );
                U256::ZERO
            })
    }

    /// Stakes `amount` of native tokens for the connected wallet. The
    /// amount rides along as the transaction value.
    pub async fn stake(&self, amount: U256) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;
        if amount.is_zero() {
            return Err(FriendFiError::InvalidAmount(
                "stake amount must be greater than zero".to_string(),
            ));
        }

        let operation_id = self.tracker.begin(Operation::Stake);
        match self.chain.stake(signer.as_ref(), amount).await {
            Ok(outcome) => {
                self.tracker.succeed(operation_id, Operation::Stake);
                self.invalidate_stake_reads(account.address);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker.fail(operation_id, Operation::Stake, &e);
                Err(e)
            }
        }
    }

    /// Withdraws the connected wallet's whole stake. The contract rejects
    /// the withdrawal while rewards are unclaimed or the stake is zero;
    /// that surfaces here as the node's revert reason.
    pub async fn unstake(&self) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;

        let operation_id = self.tracker.begin(Operation::Unstake);
        match self.chain.unstake(signer.as_ref()).await {
            Ok(outcome) => {
                self.tracker.succeed(operation_id, Operation::Unstake);
                self.invalidate_stake_reads(account.address);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker.fail(operation_id, Operation::Unstake, &e);
                Err(e)
            }
        }
    }

    fn invalidate_stake_reads(&self, address: Address) {
        self.cache.invalidate(&[
            QueryKey::Stake(address),
            QueryKey::StakedAmount(address),
            QueryKey::Activity(address),
            QueryKey::AllUsersInfo,
            QueryKey::NativeBalance(address),
        ]);
    }
}
