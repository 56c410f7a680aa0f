pub mod resolve_access;
pub mod verify_wallet_required;

pub use resolve_access::*;
pub use verify_wallet_required::*;
