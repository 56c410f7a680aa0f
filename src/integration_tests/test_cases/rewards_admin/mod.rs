pub mod claim_rewards;
pub mod read_reward_parameters;
pub mod reject_non_owner;
pub mod update_min_stake;

pub use claim_rewards::ClaimRewardsTestCase;
pub use read_reward_parameters::ReadRewardParametersTestCase;
pub use reject_non_owner::RejectNonOwnerTestCase;
pub use update_min_stake::UpdateMinStakeTestCase;
