use std::time::Instant;

use async_trait::async_trait;

use crate::FriendFiError;
use crate::integration_tests::core::{ScenarioContext, ScenarioResult};

#[async_trait]
pub trait TestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError>;

    async fn execute(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let result = self.run(context).await;
        context.record_test(result.is_ok());
        result
    }
}

#[async_trait]
pub trait Scenario {
    /// Get the name of this scenario for logging and reporting
    fn scenario_name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or(std::any::type_name::<Self>())
    }

    /// Get immutable access to the scenario's context
    fn context(&self) -> &ScenarioContext;

    /// Run the actual scenario logic - implement this in each scenario
    async fn run_scenario(&mut self) -> Result<(), FriendFiError>;

    /// Execute the scenario with consistent timing, logging and error handling
    /// Always returns a ScenarioResult to ensure consistent reporting
    async fn execute(mut self) -> (ScenarioResult, Option<FriendFiError>)
    where
        Self: Sized,
    {
        let start_time = Instant::now();
        let scenario_name = self.scenario_name();

        tracing::info!("=== Running Scenario: {} ===", scenario_name);

        let run_result = self.run_scenario().await;
        let duration = start_time.elapsed();

        let context = self.context();
        let tests_run = context.tests_count;
        let tests_passed = context.tests_passed;

        match run_result {
            Ok(()) => {
                tracing::info!(
                    "✓ {} Scenario completed ({}/{}) in {:?}",
                    scenario_name,
                    tests_passed,
                    tests_run,
                    duration
                );

                let cleanup_result = self.cleanup().await;
                if let Err(e) = cleanup_result {
                    tracing::error!("✗ {} Scenario cleanup failed: {}", scenario_name, e);
                }

                (
                    ScenarioResult::new(scenario_name, tests_run, tests_passed, duration),
                    None,
                )
            }
            Err(e) => {
                tracing::error!(
                    "✗ {} Scenario failed after {} completed tests in {:?}: {}",
                    scenario_name,
                    tests_passed,
                    duration,
                    e
                );

                (
                    ScenarioResult::failed(scenario_name, tests_run, tests_passed, duration),
                    Some(e),
                )
            }
        }
    }

    /// Removes the wallets the scenario connected so the next scenario
    /// starts from a clean local state. On-chain state stays; scenarios
    /// must not depend on a pristine contract.
    async fn cleanup(&mut self) -> Result<(), FriendFiError> {
        let context = self.context();

        context.friendfi.disconnect_account().await?;
        for account in context.accounts.values() {
            if let Err(e) = context.friendfi.remove_account(&account.address).await {
                match e {
                    FriendFiError::AccountNotFound => {} // Already removed
                    _ => return Err(e),
                }
            }
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        Ok(())
    }
}
