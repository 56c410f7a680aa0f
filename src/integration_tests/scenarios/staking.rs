use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::*;
use crate::integration_tests::test_cases::staking::*;
use crate::{FriendFi, FriendFiError};

pub struct StakingScenario {
    context: ScenarioContext,
}

impl StakingScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for StakingScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        LoginFundedWalletTestCase::new("staker")
            .execute(&mut self.context)
            .await?;

        // Zero amounts are rejected before anything is signed
        RejectZeroStakeTestCase::new()
            .execute(&mut self.context)
            .await?;

        // Stake the contract minimum and watch the reads catch up
        StakeTokensTestCase::new("staker")
            .execute(&mut self.context)
            .await?;

        // Withdraw the whole stake again
        UnstakeTokensTestCase::new("staker")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
