//! Persisted desktop settings, stored as JSON in the user config directory.

use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub api_url: String,
    pub text_scale: f32,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/api".to_string(),
            text_scale: 1.0,
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("po_manager").join("settings.json"))
}

impl PersistedSettings {
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!("settings: ignoring malformed {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let Some(path) = settings_path() else {
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };
        let serialized = match serde_json::to_string_pretty(self) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!("settings: serialize failed: {err}");
                return;
            }
        };
        if let Err(err) = fs::create_dir_all(parent).and_then(|()| fs::write(&path, serialized)) {
            tracing::warn!("settings: write to {} failed: {err}", path.display());
        }
    }

    pub fn clamped_text_scale(&self) -> f32 {
        self.text_scale.clamp(0.8, 1.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        let parsed: Result<PersistedSettings, _> = serde_json::from_str("{not json");
        assert!(parsed.is_err());
        assert_eq!(PersistedSettings::default().text_scale, 1.0);
    }

    #[test]
    fn text_scale_is_clamped_to_a_readable_range() {
        let settings = PersistedSettings {
            text_scale: 9.0,
            ..Default::default()
        };
        assert_eq!(settings.clamped_text_scale(), 1.4);
    }
}
