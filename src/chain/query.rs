use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde_json::json;

use crate::types::Message;

use super::{
    abi::{self, DirectoryEntry, TipStats, UserActivity},
    quantity_to_u256, ChainClient, ChainClientError, Result,
};

impl ChainClient {
    /// Encode a typed call, run it through `eth_call` and decode the returns.
    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let returned = self.eth_call(call.abi_encode()).await?;
        C::abi_decode_returns(&returned)
            .map_err(|e| ChainClientError::Decode(format!("{}: {e}", C::SIGNATURE)))
    }

    // Contract parameters

    pub async fn owner(&self) -> Result<Address> {
        self.call(abi::ownerCall {}).await
    }

    pub async fn min_stake_amount(&self) -> Result<U256> {
        self.call(abi::minStakeAmountCall {}).await
    }

    pub async fn reward_rate(&self) -> Result<U256> {
        self.call(abi::rewardRateCall {}).await
    }

    /// Reward accrual interval in seconds.
    pub async fn reward_interval(&self) -> Result<u64> {
        let interval = self.call(abi::rewardIntervalCall {}).await?;
        abi::u256_to_u64(interval, "reward interval")
    }

    pub async fn reward_token(&self) -> Result<Address> {
        self.call(abi::rewardTokenCall {}).await
    }

    // Per-user state

    /// Staked amount via the public `stakedAmounts` mapping getter.
    pub async fn staked_amount(&self, user: Address) -> Result<U256> {
        self.call(abi::stakedAmountsCall { user }).await
    }

    /// Staked amount via the `getUserStake` view function.
    pub async fn user_stake(&self, user: Address) -> Result<U256> {
        self.call(abi::getUserStakeCall { user }).await
    }

    pub async fn has_username(&self, user: Address) -> Result<bool> {
        self.call(abi::hasUsernameCall { user }).await
    }

    pub async fn username(&self, user: Address) -> Result<String> {
        self.call(abi::getUserUsernameCall { user }).await
    }

    /// Username via the public `usernames` mapping getter.
    pub async fn username_by_address(&self, user: Address) -> Result<String> {
        self.call(abi::usernamesCall { user }).await
    }

    pub async fn message_count(&self, user: Address) -> Result<u64> {
        let count = self.call(abi::getUserMessageCountCall { user }).await?;
        abi::u256_to_u64(count, "message count")
    }

    pub async fn tip_stats(&self, user: Address) -> Result<TipStats> {
        let decoded = self.call(abi::getUserTipStatsCall { user }).await?;
        Ok(TipStats {
            sent: decoded.sent,
            received: decoded.received,
        })
    }

    pub async fn last_active(&self, user: Address) -> Result<u64> {
        let last_active = self.call(abi::getLastActiveCall { user }).await?;
        abi::u256_to_u64(last_active, "last active")
    }

    pub async fn user_activity(&self, user: Address) -> Result<UserActivity> {
        let d = self.call(abi::getUserActivityCall { user }).await?;
        UserActivity::new(d.messageCount, d.tipSent, d.tipReceived, d.lastActive, d.stakeAmount)
    }

    /// Activity via the public `userActivities` mapping getter.
    pub async fn user_activity_by_address(&self, user: Address) -> Result<UserActivity> {
        let d = self.call(abi::userActivitiesCall { user }).await?;
        UserActivity::new(d.messageCount, d.tipSent, d.tipReceived, d.lastActive, d.stakeAmount)
    }

    // Message ids and records

    pub async fn sent_message_ids(&self, user: Address) -> Result<Vec<u64>> {
        let ids = self.call(abi::getUserSentMessagesCall { user }).await?;
        message_ids(ids)
    }

    pub async fn received_message_ids(&self, user: Address) -> Result<Vec<u64>> {
        let ids = self.call(abi::getUserReceivedMessagesCall { user }).await?;
        message_ids(ids)
    }

    pub async fn sent_message_id_at(&self, user: Address, index: u64) -> Result<u64> {
        let id = self
            .call(abi::userSentMessagesCall {
                user,
                index: U256::from(index),
            })
            .await?;
        abi::u256_to_u64(id, "sent message id")
    }

    pub async fn received_message_id_at(&self, user: Address, index: u64) -> Result<u64> {
        let id = self
            .call(abi::userReceivedMessagesCall {
                user,
                index: U256::from(index),
            })
            .await?;
        abi::u256_to_u64(id, "received message id")
    }

    pub async fn message(&self, message_id: u64) -> Result<Message> {
        let d = self
            .call(abi::getMessageCall {
                messageId: U256::from(message_id),
            })
            .await?;
        abi::message_from_parts(
            message_id,
            d.sender,
            d.receiver,
            d.contentIPFSHash,
            d.timestamp,
            d.tipAmount,
            d.isEncrypted,
        )
    }

    /// Message record via the public `messages` array getter.
    pub async fn message_by_index(&self, message_id: u64) -> Result<Message> {
        let d = self
            .call(abi::messagesCall {
                messageId: U256::from(message_id),
            })
            .await?;
        abi::message_from_parts(
            message_id,
            d.sender,
            d.receiver,
            d.contentIPFSHash,
            d.timestamp,
            d.tipAmount,
            d.isEncrypted,
        )
    }

    // Rewards and platform aggregates

    pub async fn accrued_rewards(&self, user: Address) -> Result<U256> {
        self.call(abi::calculateRewardsCall { user }).await
    }

    pub async fn active_users(&self) -> Result<Vec<Address>> {
        self.call(abi::getActiveUsersCall {}).await
    }

    pub async fn active_user_count(&self) -> Result<u64> {
        let count = self.call(abi::getActiveUsersCountCall {}).await?;
        abi::u256_to_u64(count, "active user count")
    }

    pub async fn total_messages(&self) -> Result<u64> {
        let total = self.call(abi::getTotalMessagesCall {}).await?;
        abi::u256_to_u64(total, "total messages")
    }

    pub async fn is_active_user(&self, user: Address) -> Result<bool> {
        self.call(abi::isActiveUserCall { user }).await
    }

    pub async fn all_users_info(&self) -> Result<Vec<DirectoryEntry>> {
        let d = self.call(abi::getAllUsersInfoCall {}).await?;
        abi::directory_entries(d.userAddresses, d.userUsernames, d.userStakes)
    }

    /// Native XFI balance of an address, in wei.
    pub async fn native_balance(&self, address: Address) -> Result<U256> {
        let result = self
            .rpc("eth_getBalance", json!([format!("{address:#x}"), "latest"]))
            .await?;
        quantity_to_u256(&result, "eth_getBalance")
    }
}

fn message_ids(ids: Vec<U256>) -> Result<Vec<u64>> {
    ids.into_iter()
        .map(|id| abi::u256_to_u64(id, "message id"))
        .collect()
}
