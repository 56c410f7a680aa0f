//! Owner-only contract administration.
//!
//! Every write here re-reads the owner slot before signing, so a session
//! that is not the owner fails with an authorization error instead of a
//! doomed transaction.

use alloy_primitives::{Address, U256};

use crate::chain::publisher::TransactionOutcome;
use crate::error::{FriendFiError, Result};
use crate::friendfi::FriendFi;
use crate::friendfi::cache::QueryKey;
use crate::friendfi::operations::Operation;

impl FriendFi {
    /// The contract owner. Unlike the degraded read surface this
    /// propagates failures: authorization must not be guessed.
    pub async fn contract_owner(&self) -> Result<Address> {
        self.cache
            .get_or_fetch(QueryKey::Owner, || async move {
                self.chain.owner().await.map_err(FriendFiError::from)
            })
            .await
    }

    /// Whether the connected wallet is the contract owner. `false` when no
    /// wallet is connected or the owner cannot be read.
    pub async fn is_owner(&self) -> bool {
        let Some(address) = self.connected_address().await else {
            return false;
        };
        match self.contract_owner().await {
            Ok(owner) => owner == address,
            Err(e) => {
                tracing::debug!(target: "friendfi::admin", "owner read failed: {}", e);
                false
            }
        }
    }

    /// Sets the minimum stake required to use the chat. Zero is allowed
    /// and opens the gate entirely.
    pub async fn set_min_stake_amount(&self, new_amount: U256) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;
        self.ensure_owner(account.address).await?;

        let operation_id = self.tracker.begin(Operation::SetMinStakeAmount);
        match self
            .chain
            .set_min_stake_amount(signer.as_ref(), new_amount)
            .await
        {
            Ok(outcome) => {
                self.tracker
                    .succeed(operation_id, Operation::SetMinStakeAmount);
                self.cache.invalidate(&[QueryKey::MinStakeAmount]);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker
                    .fail(operation_id, Operation::SetMinStakeAmount, &e);
                Err(e)
            }
        }
    }

    /// Sets the reward rate. Zero is allowed and stops further accrual.
    pub async fn set_reward_rate(&self, new_rate: U256) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;
        self.ensure_owner(account.address).await?;

        let operation_id = self.tracker.begin(Operation::SetRewardRate);
        match self.chain.set_reward_rate(signer.as_ref(), new_rate).await {
            Ok(outcome) => {
                self.tracker.succeed(operation_id, Operation::SetRewardRate);
                self.cache.invalidate(&[QueryKey::RewardRate]);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker
                    .fail(operation_id, Operation::SetRewardRate, &e);
                Err(e)
            }
        }
    }

    /// Sets the reward accrual interval. The contract divides by it, so
    /// zero is rejected here.
    pub async fn set_reward_interval(
        &self,
        new_interval_seconds: u64,
    ) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;
        if new_interval_seconds == 0 {
            return Err(FriendFiError::InvalidAmount(
                "reward interval must be greater than zero".to_string(),
            ));
        }
        self.ensure_owner(account.address).await?;

        let operation_id = self.tracker.begin(Operation::SetRewardInterval);
        match self
            .chain
            .set_reward_interval(signer.as_ref(), new_interval_seconds)
            .await
        {
            Ok(outcome) => {
                self.tracker
                    .succeed(operation_id, Operation::SetRewardInterval);
                self.cache.invalidate(&[QueryKey::RewardInterval]);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker
                    .fail(operation_id, Operation::SetRewardInterval, &e);
                Err(e)
            }
        }
    }

    /// Withdraws `amount` of an ERC-20 token held by the contract to the
    /// owner. No cached read depends on the contract's token balances, so
    /// nothing is invalidated.
    pub async fn withdraw_tokens(
        &self,
        token_address: Address,
        amount: U256,
    ) -> Result<TransactionOutcome> {
        let (account, signer) = self.connected_session().await?;
        if amount.is_zero() {
            return Err(FriendFiError::InvalidAmount(
                "withdrawal amount must be greater than zero".to_string(),
            ));
        }
        self.ensure_owner(account.address).await?;

        let operation_id = self.tracker.begin(Operation::WithdrawTokens);
        match self
            .chain
            .withdraw_tokens(signer.as_ref(), token_address, amount)
            .await
        {
            Ok(outcome) => {
                self.tracker.succeed(operation_id, Operation::WithdrawTokens);
                Ok(outcome)
            }
            Err(e) => {
                let e = FriendFiError::from(e);
                self.tracker
                    .fail(operation_id, Operation::WithdrawTokens, &e);
                Err(e)
            }
        }
    }

    async fn ensure_owner(&self, address: Address) -> Result<()> {
        let owner = self.contract_owner().await?;
        if address != owner {
            return Err(FriendFiError::AccountNotAuthorized(
                "only the contract owner can perform this operation".to_string(),
            ));
        }
        Ok(())
    }
}
