//! Application-level configuration loading, including activity tunables.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::activities::{ActivitySettings, strip_game::StripTimings};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DUEL_BACK_CONFIG_PATH";
/// Environment variable that overrides the content store root.
const CONTENT_BASE_URL_ENV: &str = "CONTENT_BASE_URL";

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Root of the static site serving `/data/...`; `None` runs on built-in content only.
    pub content_base_url: Option<String>,
    /// File backing the session slot; `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
    /// Activity tunables.
    pub activities: ActivitySettings,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    ///
    /// `CONTENT_BASE_URL` takes precedence over the file value.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Parse the JSON representation; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env::var(CONTENT_BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            self.content_base_url = Some(url);
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    content_base_url: Option<String>,
    session_file: Option<PathBuf>,
    wheel_segments: usize,
    card_deck_size: usize,
    strip_task_seconds: u32,
    strip_gamble_seconds: u32,
    winner_delay_ms: u64,
    reaction_min_delay_ms: u64,
    reaction_max_delay_ms: u64,
    tap_battle_seconds: u32,
    tap_battle_countdown: u32,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            content_base_url: None,
            session_file: None,
            wheel_segments: 16,
            card_deck_size: 10,
            strip_task_seconds: 60,
            strip_gamble_seconds: 30,
            winner_delay_ms: 1000,
            reaction_min_delay_ms: 2000,
            reaction_max_delay_ms: 5000,
            tap_battle_seconds: 10,
            tap_battle_countdown: 3,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            content_base_url: value.content_base_url.filter(|url| !url.trim().is_empty()),
            session_file: value.session_file,
            activities: ActivitySettings {
                wheel_segments: value.wheel_segments.max(1),
                card_deck_size: value.card_deck_size.max(1),
                strip: StripTimings {
                    task_seconds: value.strip_task_seconds,
                    gamble_seconds: value.strip_gamble_seconds,
                    winner_delay: Duration::from_millis(value.winner_delay_ms),
                },
                tap_battle_seconds: value.tap_battle_seconds,
                tap_battle_countdown: value.tap_battle_countdown,
                reaction_min_delay: Duration::from_millis(value.reaction_min_delay_ms),
                reaction_max_delay: Duration::from_millis(value.reaction_max_delay_ms),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_activity_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.activities, ActivitySettings::default());
        assert_eq!(config.content_base_url, None);
        assert_eq!(config.session_file, None);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = AppConfig::from_json(
            r#"{ "content_base_url": "http://localhost:5173", "wheel_segments": 8, "winner_delay_ms": 250 }"#,
        )
        .unwrap();
        assert_eq!(
            config.content_base_url.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(config.activities.wheel_segments, 8);
        assert_eq!(
            config.activities.strip.winner_delay,
            Duration::from_millis(250)
        );
        assert_eq!(config.activities.card_deck_size, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
