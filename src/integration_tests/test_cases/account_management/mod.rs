pub mod connect_account;
pub mod disconnect_account;
pub mod login_with_key;
pub mod remove_account;

pub use connect_account::*;
pub use disconnect_account::*;
pub use login_with_key::*;
pub use remove_account::*;
