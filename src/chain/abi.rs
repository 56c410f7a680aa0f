use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use crate::types::Message;

use super::{ChainClientError, Result};

sol! {
    function owner() view returns (address);
    function minStakeAmount() view returns (uint256);
    function rewardRate() view returns (uint256);
    function rewardInterval() view returns (uint256);
    function rewardToken() view returns (address);

    function stakedAmounts(address user) view returns (uint256);
    function hasUsername(address user) view returns (bool);
    function getUserUsername(address user) view returns (string);
    function usernames(address user) view returns (string);
    function getUserMessageCount(address user) view returns (uint256);
    function getUserTipStats(address user) view returns (uint256 sent, uint256 received);
    function getUserStake(address user) view returns (uint256);
    function getLastActive(address user) view returns (uint256);
    function getUserActivity(address user) view returns (
        uint256 messageCount,
        uint256 tipSent,
        uint256 tipReceived,
        uint256 lastActive,
        uint256 stakeAmount
    );
    function userActivities(address user) view returns (
        uint256 messageCount,
        uint256 tipSent,
        uint256 tipReceived,
        uint256 lastActive,
        uint256 stakeAmount
    );
    function getUserSentMessages(address user) view returns (uint256[]);
    function getUserReceivedMessages(address user) view returns (uint256[]);
    function userSentMessages(address user, uint256 index) view returns (uint256);
    function userReceivedMessages(address user, uint256 index) view returns (uint256);

    function getMessage(uint256 messageId) view returns (
        address sender,
        address receiver,
        string contentIPFSHash,
        uint256 timestamp,
        uint256 tipAmount,
        bool isEncrypted
    );
    function messages(uint256 messageId) view returns (
        address sender,
        address receiver,
        string contentIPFSHash,
        uint256 timestamp,
        uint256 tipAmount,
        bool isEncrypted
    );

    function calculateRewards(address user) view returns (uint256);
    function getActiveUsers() view returns (address[]);
    function getActiveUsersCount() view returns (uint256);
    function getTotalMessages() view returns (uint256);
    function isActiveUser(address user) view returns (bool);
    function getAllUsersInfo() view returns (
        address[] userAddresses,
        string[] userUsernames,
        uint256[] userStakes
    );

    function stake() payable;
    function unstake();
    function setUsername(string username);
    function sendMessage(address receiver, string contentIPFSHash, bool isEncrypted);
    function sendMessageWithTip(address receiver, string contentIPFSHash, bool isEncrypted) payable;
    function claimRewards();
    function setMinStakeAmount(uint256 newAmount);
    function setRewardRate(uint256 newRate);
    function setRewardInterval(uint256 newInterval);
    function withdrawTokens(address tokenAddress, uint256 amount);
}

/// Per-user counters tracked by the contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserActivity {
    pub message_count: u64,
    pub tips_sent: U256,
    pub tips_received: U256,
    pub last_active_seconds: u64,
    pub staked_amount: U256,
}

impl UserActivity {
    pub(crate) fn new(
        message_count: U256,
        tip_sent: U256,
        tip_received: U256,
        last_active: U256,
        stake_amount: U256,
    ) -> Result<Self> {
        Ok(UserActivity {
            message_count: u256_to_u64(message_count, "activity message count")?,
            tips_sent: tip_sent,
            tips_received: tip_received,
            last_active_seconds: u256_to_u64(last_active, "activity last active")?,
            staked_amount: stake_amount,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TipStats {
    pub sent: U256,
    pub received: U256,
}

/// One row of the on-chain user directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub address: Address,
    pub username: String,
    pub staked_amount: U256,
}

/// Zip the parallel arrays returned by `getAllUsersInfo` into rows. The
/// arrays must have equal length or the response is rejected.
pub(crate) fn directory_entries(
    addresses: Vec<Address>,
    usernames: Vec<String>,
    stakes: Vec<U256>,
) -> Result<Vec<DirectoryEntry>> {
    if addresses.len() != usernames.len() || addresses.len() != stakes.len() {
        return Err(ChainClientError::Decode(format!(
            "getAllUsersInfo parallel array length mismatch: {} addresses, {} usernames, {} stakes",
            addresses.len(),
            usernames.len(),
            stakes.len()
        )));
    }
    Ok(addresses
        .into_iter()
        .zip(usernames)
        .zip(stakes)
        .map(|((address, username), staked_amount)| DirectoryEntry {
            address,
            username,
            staked_amount,
        })
        .collect())
}

/// Assemble a [`Message`] from decoded return fields. Usernames are not part
/// of the on-chain record and are attached later.
pub(crate) fn message_from_parts(
    id: u64,
    sender: Address,
    receiver: Address,
    content_pointer: String,
    timestamp: U256,
    tip_amount: U256,
    is_encrypted: bool,
) -> Result<Message> {
    Ok(Message {
        id,
        sender,
        receiver,
        content_pointer,
        timestamp_seconds: u256_to_u64(timestamp, "message timestamp")?,
        tip_amount,
        is_encrypted,
        sender_username: None,
        receiver_username: None,
    })
}

pub(crate) fn u256_to_u64(value: U256, context: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| ChainClientError::Decode(format!("{context} out of u64 range: {value}")))
}
