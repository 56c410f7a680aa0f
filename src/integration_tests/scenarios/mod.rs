pub mod access_gating;
pub mod account_management;
pub mod analytics;
pub mod app_settings;
pub mod messaging;
pub mod rewards_admin;
pub mod staking;
pub mod user_directory;

pub use access_gating::*;
pub use account_management::*;
pub use analytics::*;
pub use app_settings::*;
pub use messaging::*;
pub use rewards_admin::*;
pub use staking::*;
pub use user_directory::*;
