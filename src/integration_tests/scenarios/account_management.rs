use async_trait::async_trait;

use crate::integration_tests::{core::*, test_cases::account_management::*};
use crate::{FriendFi, FriendFiError};

pub struct AccountManagementScenario {
    context: ScenarioContext,
}

impl AccountManagementScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for AccountManagementScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        // Fresh generated wallet becomes the session
        ConnectAccountTestCase::new("generated")
            .execute(&mut self.context)
            .await?;

        // Funded devnet key can be imported, twice, without duplicate rows
        LoginWithKeyTestCase::new("imported")
            .execute(&mut self.context)
            .await?;

        // Disconnect keeps the row and key for a later login
        DisconnectAccountTestCase::new("imported")
            .execute(&mut self.context)
            .await?;

        // Remove deletes the row and the stored key
        RemoveAccountTestCase::new("generated")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
