pub mod context;
pub mod retry;
pub mod scenario_result;
pub mod traits;

pub use context::*;
pub use retry::*;
pub use scenario_result::*;
pub use traits::*;
