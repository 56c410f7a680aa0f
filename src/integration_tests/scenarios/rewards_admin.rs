use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::rewards_admin::*;
use crate::integration_tests::test_cases::shared::*;
use crate::{FriendFi, FriendFiError};

pub struct RewardsAdminScenario {
    context: ScenarioContext,
}

impl RewardsAdminScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for RewardsAdminScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        // The first devnet key deployed the contract and owns it
        LoginFundedWalletTestCase::new("operator")
            .execute(&mut self.context)
            .await?;
        EnsureChatAccessTestCase::new("operator")
            .execute(&mut self.context)
            .await?;

        ReadRewardParametersTestCase::new()
            .execute(&mut self.context)
            .await?;

        ClaimRewardsTestCase::new("operator")
            .execute(&mut self.context)
            .await?;

        // Owner can move the minimum stake and put it back
        UpdateMinStakeTestCase::new("operator")
            .execute(&mut self.context)
            .await?;

        // A second wallet is rejected before anything is signed
        LoginFundedWalletTestCase::new("intruder")
            .execute(&mut self.context)
            .await?;
        RejectNonOwnerTestCase::new("intruder")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
