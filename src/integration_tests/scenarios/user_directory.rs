use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::messaging::SendTextMessageTestCase;
use crate::integration_tests::test_cases::shared::*;
use crate::integration_tests::test_cases::user_directory::*;
use crate::{FriendFi, FriendFiError};

pub struct UserDirectoryScenario {
    context: ScenarioContext,
}

impl UserDirectoryScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for UserDirectoryScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        // Three registered wallets; alice talks to bob, carol stays silent
        for name in ["alice", "bob", "carol"] {
            LoginFundedWalletTestCase::new(name)
                .execute(&mut self.context)
                .await?;
            EnsureChatAccessTestCase::new(name)
                .execute(&mut self.context)
                .await?;
        }

        // Every registered wallet is listed with its username
        VerifyDirectoryTestCase::new(&["alice", "bob", "carol"])
            .execute(&mut self.context)
            .await?;

        // An exchange makes bob a friend of alice; carol stays a suggestion
        SendTextMessageTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;
        VerifyFriendListTestCase::new("alice", "bob", "carol")
            .execute(&mut self.context)
            .await?;

        // Search narrows the directory by name or address
        SearchUsersTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
