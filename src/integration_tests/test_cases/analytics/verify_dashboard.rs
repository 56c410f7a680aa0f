use alloy_primitives::U256;
use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::FriendFiError;

/// Fetches the profile dashboard and checks every counter against the
/// activity the scenario just generated.
pub struct VerifyDashboardTestCase {
    name: &'static str,
}

impl VerifyDashboardTestCase {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TestCase for VerifyDashboardTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.name).await?;

        let dashboard = context.friendfi.dashboard().await?;
        tracing::info!(
            "Dashboard for '{}': {} messages, {} staked, {} tips sent",
            self.name,
            dashboard.message_count,
            dashboard.staked_amount,
            dashboard.tips_sent
        );

        // The wallet passed the stake gate, so its stake cannot be zero
        assert!(
            dashboard.staked_amount > U256::ZERO,
            "Dashboard shows no stake for a wallet with chat access"
        );
        assert!(
            dashboard.message_count > 0,
            "Dashboard shows no messages after seeding activity"
        );
        assert!(
            dashboard.tips_sent > U256::ZERO,
            "Dashboard shows no tips sent after a tipped seed message"
        );
        assert!(
            dashboard.native_balance > U256::ZERO,
            "Devnet wallet reports a zero native balance"
        );
        assert!(
            dashboard.last_active_seconds > 0,
            "Dashboard shows no last-active timestamp after a write"
        );

        tracing::info!("✓ Dashboard reflects the seeded activity");
        Ok(())
    }
}
