use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

pub struct ToggleHideBalancesTestCase {
    hidden: bool,
}

impl ToggleHideBalancesTestCase {
    pub fn new(hidden: bool) -> Self {
        Self { hidden }
    }
}

#[async_trait]
impl TestCase for ToggleHideBalancesTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        tracing::info!("Setting hide_balances to {}", self.hidden);
        context.friendfi.update_hide_balances(self.hidden).await?;

        let settings = context.friendfi.app_settings().await?;
        assert_eq!(
            settings.hide_balances, self.hidden,
            "Balance visibility was not updated correctly"
        );

        tracing::info!("✓ Balance visibility verified: {}", self.hidden);
        Ok(())
    }
}
