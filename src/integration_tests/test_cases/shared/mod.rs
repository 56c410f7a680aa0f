pub mod ensure_chat_access;
pub mod login_funded_wallet;

pub use ensure_chat_access::*;
pub use login_funded_wallet::*;

use crate::integration_tests::core::ScenarioContext;
use crate::{Account, FriendFiError};

/// Makes the named wallet the connected session by logging in with its
/// stored key. The single session slot is how the app works; scenarios
/// that involve several wallets hop between them with this.
pub async fn switch_session(
    context: &ScenarioContext,
    name: &str,
) -> Result<Account, FriendFiError> {
    let key = context.get_key(name)?.clone();
    context.friendfi.login_account(&key).await
}
