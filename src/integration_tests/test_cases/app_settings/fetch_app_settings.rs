use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

/// Fetches the settings row, which is created on first access. The theme
/// itself is whatever the data dir last persisted, so only the shape is
/// checked here; the update cases pin concrete values.
pub struct FetchAppSettingsTestCase;

impl FetchAppSettingsTestCase {
    pub fn basic() -> Self {
        Self
    }
}

#[async_trait]
impl TestCase for FetchAppSettingsTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        tracing::info!("Fetching app settings...");
        let settings = context.friendfi.app_settings().await?;

        assert_eq!(settings.id, 1, "Settings should live in the singleton row");

        // A second fetch returns the same persisted row
        let again = context.friendfi.app_settings().await?;
        assert_eq!(settings.theme_mode, again.theme_mode);
        assert_eq!(settings.notifications_enabled, again.notifications_enabled);
        assert_eq!(settings.hide_balances, again.hide_balances);

        tracing::info!("✓ App settings fetched successfully");
        Ok(())
    }
}
