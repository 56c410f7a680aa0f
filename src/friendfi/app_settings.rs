use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::FriendFiError;
use crate::friendfi::FriendFi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

impl Default for ThemeMode {
    fn default() -> Self {
        Self::System
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
            ThemeMode::System => write!(f, "system"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(format!("Invalid theme mode: {}", s)),
        }
    }
}

/// The single row of UI preferences the embedding shell persists locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub id: i64,
    pub theme_mode: ThemeMode,
    pub notifications_enabled: bool,
    pub hide_balances: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            id: 1,
            theme_mode: ThemeMode::System,
            notifications_enabled: true,
            hide_balances: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl AppSettings {
    /// Loads the settings, creating and saving the defaults when no row
    /// exists yet. Called once during initialization.
    pub(crate) async fn find_or_create_default(
        friendfi: &FriendFi,
    ) -> Result<AppSettings, FriendFiError> {
        match AppSettings::load(friendfi).await {
            Ok(settings) => Ok(settings),
            Err(_) => {
                let defaults = AppSettings::default();
                AppSettings::save(&defaults, friendfi).await?;
                Ok(defaults)
            }
        }
    }
}

impl FriendFi {
    /// Loads the current application settings from the database.
    ///
    /// If no settings exist in the database, default settings will be
    /// created and saved.
    pub async fn app_settings(&self) -> Result<AppSettings, FriendFiError> {
        AppSettings::find_or_create_default(self).await
    }

    /// Updates only the theme mode in the application settings.
    pub async fn update_theme_mode(&self, theme_mode: ThemeMode) -> Result<(), FriendFiError> {
        AppSettings::update_theme_mode(theme_mode, self).await
    }

    /// Updates only the notifications toggle in the application settings.
    pub async fn update_notifications_enabled(&self, enabled: bool) -> Result<(), FriendFiError> {
        AppSettings::update_notifications_enabled(enabled, self).await
    }

    /// Updates only the balance visibility toggle in the application
    /// settings. When balances are hidden the embedding shell masks staked
    /// and native amounts.
    pub async fn update_hide_balances(&self, hidden: bool) -> Result<(), FriendFiError> {
        AppSettings::update_hide_balances(hidden, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friendfi::test_utils::create_mock_friendfi;

    #[tokio::test]
    async fn test_app_settings_created_with_defaults() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let settings = friendfi.app_settings().await.unwrap();
        assert_eq!(settings.id, 1);
        assert_eq!(settings.theme_mode, ThemeMode::System);
        assert!(settings.notifications_enabled);
        assert!(!settings.hide_balances);
    }

    #[tokio::test]
    async fn test_update_theme_mode_persists() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        friendfi.app_settings().await.unwrap();
        friendfi.update_theme_mode(ThemeMode::Dark).await.unwrap();

        let settings = friendfi.app_settings().await.unwrap();
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_update_toggles_persist() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        friendfi.app_settings().await.unwrap();
        friendfi.update_notifications_enabled(false).await.unwrap();
        friendfi.update_hide_balances(true).await.unwrap();

        let settings = friendfi.app_settings().await.unwrap();
        assert!(!settings.notifications_enabled);
        assert!(settings.hide_balances);
    }
}
