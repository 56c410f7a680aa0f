pub mod reject_zero_stake;
pub mod stake_tokens;
pub mod unstake_tokens;

pub use reject_zero_stake::*;
pub use stake_tokens::*;
pub use unstake_tokens::*;
