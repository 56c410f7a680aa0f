pub mod access_gating;
pub mod account_management;
pub mod analytics;
pub mod app_settings;
pub mod messaging;
pub mod rewards_admin;
pub mod shared;
pub mod staking;
pub mod user_directory;
