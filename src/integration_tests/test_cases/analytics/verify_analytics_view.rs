use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{FriendFiError, MessageDirection};

/// Fetches the analytics view for the seeding wallet and checks the
/// platform totals, the recent-activity feed and the top-friends ranking.
pub struct VerifyAnalyticsViewTestCase {
    owner: &'static str,
    friend: &'static str,
}

impl VerifyAnalyticsViewTestCase {
    pub fn new(owner: &'static str, friend: &'static str) -> Self {
        Self { owner, friend }
    }
}

#[async_trait]
impl TestCase for VerifyAnalyticsViewTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.owner).await?;
        let friend_address = context.get_account(self.friend)?.address;

        let analytics = context.friendfi.analytics().await?;
        tracing::info!(
            "Analytics for '{}': {}% engagement, {} platform messages, {} active users",
            self.owner,
            analytics.engagement_rate,
            analytics.total_messages,
            analytics.active_users
        );

        assert!(
            analytics.total_messages > 0,
            "Platform message total is zero after seeding"
        );
        assert!(
            analytics.active_users > 0,
            "Active user count is zero with registered wallets"
        );
        assert!(
            analytics.engagement_rate > 0.0,
            "Engagement rate is zero for a wallet that just sent messages"
        );
        assert!(
            analytics.total_tips > U256::ZERO,
            "Tip total is zero after a tipped seed message"
        );

        // The two seed messages are this wallet's newest activity
        assert!(
            !analytics.recent_activity.is_empty(),
            "Recent activity is empty after seeding"
        );
        let newest = &analytics.recent_activity[0];
        assert_eq!(
            newest.direction,
            MessageDirection::Sent,
            "Newest activity row is not the seed send"
        );
        assert_eq!(
            newest.counterparty, friend_address,
            "Newest activity row points at the wrong counterparty"
        );
        assert!(
            analytics
                .recent_activity
                .iter()
                .any(|entry| entry.tip_amount > U256::ZERO),
            "No tipped entry in recent activity after a tipped seed"
        );

        let ranked_friend = analytics
            .top_friends
            .iter()
            .find(|friend| friend.address == friend_address)
            .unwrap_or_else(|| panic!("'{}' missing from top friends", self.friend));
        assert!(
            ranked_friend.messages_exchanged >= 2,
            "Top-friend exchange count below the two seeded messages"
        );
        assert!(
            ranked_friend.staked_amount > U256::ZERO,
            "Top friend shows no stake despite chat access"
        );

        tracing::info!(
            "✓ Analytics view assembled: '{}' ranks with {} exchanges",
            self.friend,
            ranked_friend.messages_exchanged
        );
        Ok(())
    }
}
