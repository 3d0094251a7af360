use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DerivedStatistics {
    pub daily_average: u64,
    pub weekly_average: u64,
    pub highest_day: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub daily: bool,
    pub weekly: bool,
    pub monthly: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            daily: NotificationKind::Daily.default_enabled(),
            weekly: NotificationKind::Weekly.default_enabled(),
            monthly: NotificationKind::Monthly.default_enabled(),
        }
    }
}

/// Reminder category; each one is persisted under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Daily,
    Weekly,
    Monthly,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Daily => "daily_reminder",
            Self::Weekly => "weekly_reminder",
            Self::Monthly => "monthly_reminder",
        }
    }

    pub fn default_enabled(self) -> bool {
        !matches!(self, Self::Monthly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| "kind must be 'daily', 'weekly' or 'monthly'".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub notifications: bool,
    pub dark_mode: bool,
    pub sound: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: SettingKind::Notifications.default_enabled(),
            dark_mode: SettingKind::DarkMode.default_enabled(),
            sound: SettingKind::Sound.default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Notifications,
    DarkMode,
    Sound,
}

impl SettingKind {
    pub const ALL: [SettingKind; 3] = [Self::Notifications, Self::DarkMode, Self::Sound];

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Notifications => "settings_notifications",
            Self::DarkMode => "settings_dark_mode",
            Self::Sound => "settings_sound",
        }
    }

    pub fn default_enabled(self) -> bool {
        true
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notifications => "notifications",
            Self::DarkMode => "dark_mode",
            Self::Sound => "sound",
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| "setting must be 'notifications', 'dark_mode' or 'sound'".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub date: String,
    pub total: u64,
    pub today: u64,
    pub degraded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: u64,
    pub today: u64,
    pub daily_average: u64,
    pub weekly_average: u64,
    pub highest_day: u64,
}

#[derive(Debug, Deserialize)]
pub struct NotificationUpdate {
    pub kind: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SettingUpdate {
    pub setting: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<usize>,
}
