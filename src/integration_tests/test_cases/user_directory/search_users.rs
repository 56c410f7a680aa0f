use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

/// Search narrows friends and suggestions by name substring or address.
pub struct SearchUsersTestCase {
    owner: &'static str,
    target: &'static str,
}

impl SearchUsersTestCase {
    pub fn new(owner: &'static str, target: &'static str) -> Self {
        Self { owner, target }
    }
}

#[async_trait]
impl TestCase for SearchUsersTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.owner).await?;
        let target_address = context.get_account(self.target)?.address;

        // Wallets reused from an earlier run kept their old name; read it
        // back from the directory instead of the scenario record.
        let target_username = match context.usernames.get(self.target) {
            Some(username) => username.clone(),
            None => context
                .friendfi
                .user_directory()
                .await
                .iter()
                .find(|e| e.address == target_address)
                .map(|e| e.username.clone())
                .ok_or_else(|| {
                    FriendFiError::Configuration(format!(
                        "Wallet '{}' has no directory entry to search for",
                        self.target
                    ))
                })?,
        };

        // The registered name is unique to this run, so exactly one match
        let by_name = context.friendfi.search_users(&target_username).await?;
        let name_matches = by_name.friends.len() + by_name.suggestions.len();
        assert_eq!(
            name_matches, 1,
            "Expected exactly one match for '{}'",
            target_username
        );

        // Address search finds the same wallet
        let by_address = context
            .friendfi
            .search_users(&format!("{:#x}", target_address))
            .await?;
        assert!(
            by_address
                .friends
                .iter()
                .map(|f| f.address)
                .chain(by_address.suggestions.iter().map(|s| s.address))
                .any(|a| a == target_address),
            "Address search missed the wallet"
        );

        // Nonsense matches nothing
        let by_garbage = context.friendfi.search_users("zzz-no-such-user").await?;
        assert!(by_garbage.friends.is_empty());
        assert!(by_garbage.suggestions.is_empty());

        tracing::info!("✓ Search by name, address and miss all behaved");
        Ok(())
    }
}
