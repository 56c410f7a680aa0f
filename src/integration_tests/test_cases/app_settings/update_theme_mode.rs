use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::{FriendFiError, ThemeMode};

pub struct UpdateThemeModeTestCase {
    theme_mode: ThemeMode,
}

impl UpdateThemeModeTestCase {
    pub fn new(theme_mode: ThemeMode) -> Self {
        Self { theme_mode }
    }

    pub fn to_dark() -> Self {
        Self::new(ThemeMode::Dark)
    }

    pub fn to_light() -> Self {
        Self::new(ThemeMode::Light)
    }
}

#[async_trait]
impl TestCase for UpdateThemeModeTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        tracing::info!("Updating theme mode to: {:?}", self.theme_mode);
        context
            .friendfi
            .update_theme_mode(self.theme_mode.clone())
            .await?;

        // Verify the update worked
        let settings = context.friendfi.app_settings().await?;
        assert_eq!(
            settings.theme_mode, self.theme_mode,
            "Theme mode was not updated correctly"
        );

        tracing::info!("✓ Theme mode updated and verified: {:?}", self.theme_mode);
        Ok(())
    }
}
