use async_trait::async_trait;

use crate::integration_tests::test_cases::access_gating::*;
use crate::integration_tests::test_cases::shared::*;
use crate::integration_tests::core::*;
use crate::{FriendFi, FriendFiError};

pub struct AccessGatingScenario {
    context: ScenarioContext,
}

impl AccessGatingScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for AccessGatingScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        // Without a session the gate reports the wallet step
        VerifyWalletRequiredTestCase::new()
            .execute(&mut self.context)
            .await?;

        LoginFundedWalletTestCase::new("gated")
            .execute(&mut self.context)
            .await?;

        // Walk the wallet through registration and staking until granted
        ResolveAccessTestCase::new("gated")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
