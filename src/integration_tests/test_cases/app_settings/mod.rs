pub mod fetch_app_settings;
pub mod toggle_hide_balances;
pub mod toggle_notifications;
pub mod update_theme_mode;

pub use fetch_app_settings::*;
pub use toggle_hide_balances::*;
pub use toggle_notifications::*;
pub use update_theme_mode::*;
