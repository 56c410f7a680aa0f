use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

/// Every registered wallet shows up in the public directory with the
/// username it registered.
pub struct VerifyDirectoryTestCase {
    names: &'static [&'static str],
}

impl VerifyDirectoryTestCase {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }
}

#[async_trait]
impl TestCase for VerifyDirectoryTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let directory = retry_until(
            RetryConfig::default(),
            || async {
                let directory = context.friendfi.user_directory().await;
                if directory.is_empty() {
                    Err(FriendFiError::Other(anyhow::anyhow!("directory empty")))
                } else {
                    Ok(directory)
                }
            },
            "directory listing",
        )
        .await?;

        for name in self.names {
            let account = context.get_account(name)?;
            let entry = directory
                .iter()
                .find(|e| e.address == account.address)
                .unwrap_or_else(|| panic!("Wallet '{}' missing from the directory", name));

            assert!(!entry.username.is_empty());
            if let Some(registered) = context.usernames.get(*name) {
                assert_eq!(
                    &entry.username, registered,
                    "Directory shows a different name for '{}'",
                    name
                );
            }
        }

        tracing::info!(
            "✓ Directory lists all {} scenario wallets ({} entries total)",
            self.names.len(),
            directory.len()
        );
        Ok(())
    }
}
