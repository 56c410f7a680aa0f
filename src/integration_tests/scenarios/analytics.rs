use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::analytics::*;
use crate::integration_tests::test_cases::shared::*;
use crate::{FriendFi, FriendFiError};

pub struct AnalyticsScenario {
    context: ScenarioContext,
}

impl AnalyticsScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for AnalyticsScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        LoginFundedWalletTestCase::new("alice")
            .execute(&mut self.context)
            .await?;
        EnsureChatAccessTestCase::new("alice")
            .execute(&mut self.context)
            .await?;

        LoginFundedWalletTestCase::new("bob")
            .execute(&mut self.context)
            .await?;
        EnsureChatAccessTestCase::new("bob")
            .execute(&mut self.context)
            .await?;

        // Generate activity so the numbers have something to show
        SeedActivityTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;

        // The profile dashboard reflects the wallet's stake and traffic
        VerifyDashboardTestCase::new("alice")
            .execute(&mut self.context)
            .await?;

        // The analytics view assembles totals, recents and top friends
        VerifyAnalyticsViewTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
