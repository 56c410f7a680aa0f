use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

/// After an exchange, the counterparty is a friend; a registered wallet
/// with no exchanged messages stays in the suggestions.
pub struct VerifyFriendListTestCase {
    owner: &'static str,
    friend: &'static str,
    stranger: &'static str,
}

impl VerifyFriendListTestCase {
    pub fn new(owner: &'static str, friend: &'static str, stranger: &'static str) -> Self {
        Self {
            owner,
            friend,
            stranger,
        }
    }
}

#[async_trait]
impl TestCase for VerifyFriendListTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.owner).await?;
        let friend_address = context.get_account(self.friend)?.address;
        let stranger_address = context.get_account(self.stranger)?.address;
        let owner_address = context.get_account(self.owner)?.address;

        let listing = retry_until(
            RetryConfig::default(),
            || async {
                let listing = context.friendfi.friends().await?;
                if listing.friends.iter().any(|f| f.address == friend_address) {
                    Ok(listing)
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "exchange not reflected in friends yet"
                    )))
                }
            },
            "friend list update",
        )
        .await?;

        let friend = listing
            .friends
            .iter()
            .find(|f| f.address == friend_address)
            .expect("retry loop guarantees presence");
        assert!(!friend.username.is_empty());
        assert!(!friend.last_message_label.is_empty());
        assert!(friend.last_message_seconds > 0);

        // Nobody is their own friend or suggestion
        assert!(listing.friends.iter().all(|f| f.address != owner_address));
        assert!(
            listing
                .suggestions
                .iter()
                .all(|s| s.address != owner_address)
        );

        // The silent wallet is suggested, not listed as a friend
        assert!(
            listing.friends.iter().all(|f| f.address != stranger_address),
            "Wallet '{}' has no exchange yet but appears as a friend",
            self.stranger
        );
        assert!(
            listing
                .suggestions
                .iter()
                .any(|s| s.address == stranger_address),
            "Wallet '{}' should be suggested",
            self.stranger
        );
        assert!(
            listing
                .suggestions
                .iter()
                .all(|s| s.address != friend_address),
            "A friend should not also be suggested"
        );

        tracing::info!(
            "✓ Friend list has {} friends and {} suggestions",
            listing.friends.len(),
            listing.suggestions.len()
        );
        Ok(())
    }
}
