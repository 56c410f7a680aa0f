use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::FriendFiError;

pub struct ToggleNotificationsTestCase {
    enabled: bool,
}

impl ToggleNotificationsTestCase {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl TestCase for ToggleNotificationsTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        tracing::info!("Setting notifications_enabled to {}", self.enabled);
        context
            .friendfi
            .update_notifications_enabled(self.enabled)
            .await?;

        let settings = context.friendfi.app_settings().await?;
        assert_eq!(
            settings.notifications_enabled, self.enabled,
            "Notification setting was not updated correctly"
        );

        tracing::info!("✓ Notification setting verified: {}", self.enabled);
        Ok(())
    }
}
