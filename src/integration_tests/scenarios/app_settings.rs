use async_trait::async_trait;

use crate::integration_tests::{core::*, test_cases::app_settings::*};
use crate::{FriendFi, FriendFiError, ThemeMode};

pub struct AppSettingsScenario {
    context: ScenarioContext,
}

impl AppSettingsScenario {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            context: ScenarioContext::new(friendfi),
        }
    }
}

#[async_trait]
impl Scenario for AppSettingsScenario {
    fn context(&self) -> &ScenarioContext {
        &self.context
    }

    async fn run_scenario(&mut self) -> Result<(), FriendFiError> {
        // Test fetching settings (row is created lazily on first access)
        FetchAppSettingsTestCase::basic()
            .execute(&mut self.context)
            .await?;

        // Test updating to dark mode
        UpdateThemeModeTestCase::to_dark()
            .execute(&mut self.context)
            .await?;

        // Test updating to light mode
        UpdateThemeModeTestCase::to_light()
            .execute(&mut self.context)
            .await?;

        // Test updating back to system mode
        UpdateThemeModeTestCase::new(ThemeMode::System)
            .execute(&mut self.context)
            .await?;

        // Test toggling notification delivery off and back on
        ToggleNotificationsTestCase::new(false)
            .execute(&mut self.context)
            .await?;
        ToggleNotificationsTestCase::new(true)
            .execute(&mut self.context)
            .await?;

        // Test hiding balances in the profile views
        ToggleHideBalancesTestCase::new(true)
            .execute(&mut self.context)
            .await?;
        ToggleHideBalancesTestCase::new(false)
            .execute(&mut self.context)
            .await?;

        Ok(())
    }
}
