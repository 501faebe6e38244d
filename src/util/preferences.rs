//! 用户偏好与主题持久化

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::DetectorResult;
use crate::model::{Theme, UserPreferences};
use crate::storage::Storage;
use crate::util::history::storage_error;
use crate::util::logging::events;

pub const PREFERENCES_KEY: &str = "ai_detector_preferences";
/// 主题以纯文本（`dark` / `light`）单独存放
pub const THEME_KEY: &str = "theme";

pub struct PreferencesManager {
    storage: Arc<dyn Storage>,
}

impl PreferencesManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 读取偏好；不存在或无法解析时返回默认值
    pub async fn load(&self) -> DetectorResult<UserPreferences> {
        let Some(raw) = self
            .storage
            .get(PREFERENCES_KEY)
            .await
            .map_err(storage_error)?
        else {
            return Ok(UserPreferences::default());
        };

        match serde_json::from_slice(&raw) {
            Ok(prefs) => Ok(prefs),
            Err(err) => {
                warn!(
                    event = events::PREFERENCES_CORRUPT,
                    error = %err,
                    "偏好设置无法解析，使用默认值"
                );
                Ok(UserPreferences::default())
            }
        }
    }

    pub async fn save(&self, prefs: &UserPreferences) -> DetectorResult<()> {
        let data = serde_json::to_vec(prefs)?;
        self.storage
            .put(PREFERENCES_KEY, &data)
            .await
            .map_err(storage_error)?;
        debug!(event = events::PREFERENCES_SAVE, key = PREFERENCES_KEY);
        Ok(())
    }

    /// 按 `camelCase` 键名修改单项偏好
    pub async fn set(&self, key: &str, value: &str) -> DetectorResult<UserPreferences> {
        let mut prefs = self.load().await?;
        apply_preference(&mut prefs, key, value)?;
        self.save(&prefs).await?;
        Ok(prefs)
    }

    pub async fn theme(&self) -> DetectorResult<Theme> {
        let raw = self.storage.get(THEME_KEY).await.map_err(storage_error)?;
        let theme = raw
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|s| s.trim().trim_matches('"').parse().ok())
            .unwrap_or_default();
        Ok(theme)
    }

    pub async fn set_theme(&self, theme: Theme) -> DetectorResult<()> {
        self.storage
            .put(THEME_KEY, theme.as_str().as_bytes())
            .await
            .map_err(storage_error)?;
        debug!(event = events::PREFERENCES_SAVE, key = THEME_KEY, theme = theme.as_str());
        Ok(())
    }

    /// 切换并持久化主题，返回新主题
    pub async fn toggle_theme(&self) -> DetectorResult<Theme> {
        let next = self.theme().await?.toggled();
        self.set_theme(next).await?;
        Ok(next)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn apply_preference(prefs: &mut UserPreferences, key: &str, value: &str) -> DetectorResult<()> {
    use crate::error::DetectorError;

    let invalid = |reason: String| DetectorError::validation(format!("Invalid value for {key}: {reason}"));

    match key {
        "theme" => prefs.theme = value.parse().map_err(invalid)?,
        "defaultMode" => prefs.default_mode = value.parse().map_err(invalid)?,
        "exportFormat" => prefs.export_format = value.parse().map_err(invalid)?,
        "autoSaveHistory" => {
            prefs.auto_save_history =
                parse_bool(value).ok_or_else(|| invalid(format!("expected true/false, got {value}")))?
        }
        "showHighlighting" => {
            prefs.show_highlighting =
                parse_bool(value).ok_or_else(|| invalid(format!("expected true/false, got {value}")))?
        }
        other => {
            return Err(DetectorError::validation(format!(
                "Unknown preference: {other}"
            )))
        }
    }
    Ok(())
}
