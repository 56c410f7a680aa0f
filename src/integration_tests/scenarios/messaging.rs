use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::messaging::*;
use crate::integration_tests::test_cases::shared::*;
use crate::{FriendFi, FriendFiError};

pub struct MessagingScenario {
    context: ScenarioContext,
}

impl MessagingScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for MessagingScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        // Both wallets must clear the gate before they can chat
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

        // Empty bodies never reach the chain
        RejectEmptyMessageTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;

        // Text lands on IPFS and in both wallets' threads
        SendTextMessageTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;
        VerifyThreadTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;

        // A tip rides along as transaction value and shows in the stats
        SendMessageWithTipTestCase::new("bob", "alice")
            .execute(&mut self.context)
            .await?;

        // The paged record lookup agrees with the thread view
        VerifyPagedLookupTestCase::new("alice", "bob")
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
