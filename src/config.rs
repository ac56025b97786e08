//! Configuration for the intrusion watcher.
//!
//! Non-secret settings live in a JSON file under the user's config
//! directory. The Telegram secrets are read from the environment only.

use crate::audit::{LOG_FILE_NAME, STATS_FILE_NAME};
use crate::capture::CaptureCommand;
use crate::collector::CollectorConfig;
use crate::notify::TELEGRAM_API_BASE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TG_BOT_TOKEN";

/// Environment variable holding the destination chat id.
pub const CHAT_ID_ENV: &str = "TG_CHAT_ID";

/// Main configuration for the watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the audit log, stats and captured photos
    pub output_dir: PathBuf,

    /// Which input sources to watch
    pub sources: SourceConfig,

    /// Minimum spacing between alerts
    #[serde(with = "duration_serde")]
    pub cooldown: Duration,

    /// Webcam capture command
    pub webcam: CaptureCommand,

    /// Screen capture command
    pub screen: CaptureCommand,

    /// Upper bound for one capture command
    #[serde(with = "duration_serde")]
    pub capture_timeout: Duration,

    /// Timeout for text notifications
    #[serde(with = "duration_serde")]
    pub text_timeout: Duration,

    /// Timeout for photo uploads
    #[serde(with = "duration_serde")]
    pub photo_timeout: Duration,

    /// Telegram Bot API base URL
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        let output_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("security");

        Self {
            output_dir,
            sources: SourceConfig::default(),
            cooldown: Duration::from_secs(3),
            webcam: CaptureCommand::webcam_default(),
            screen: CaptureCommand::screen_default(),
            capture_timeout: Duration::from_secs(10),
            text_timeout: Duration::from_secs(5),
            photo_timeout: Duration::from_secs(10),
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("intrusion-watcher")
            .join("config.json")
    }

    /// Path of the audit log file.
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(LOG_FILE_NAME)
    }

    /// Path of the persisted statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join(STATS_FILE_NAME)
    }

    /// Ensure the output directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration for which input sources to watch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub keyboard: bool,
    pub mouse: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            keyboard: true,
            mouse: true,
        }
    }
}

impl SourceConfig {
    /// Parse source configuration from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let sources: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();

        Self {
            keyboard: sources.iter().any(|s| s == "keyboard" || s == "all"),
            mouse: sources.iter().any(|s| s == "mouse" || s == "all"),
        }
    }

    /// Check if at least one source is enabled.
    pub fn any_enabled(&self) -> bool {
        self.keyboard || self.mouse
    }

    /// Collector settings for these sources.
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            capture_keyboard: self.keyboard,
            capture_mouse: self.mouse,
            ..Default::default()
        }
    }
}

/// Telegram secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Read `TG_BOT_TOKEN` and `TG_CHAT_ID` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingSecret(name))
        };
        Ok(Self {
            bot_token: read(BOT_TOKEN_ENV)?,
            chat_id: read(CHAT_ID_ENV)?,
        })
    }
}

// Keep the token out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    /// A required secret is not set
    MissingSecret(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::MissingSecret(name) => {
                write!(f, "Environment variable {name} is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_source_config_parsing() {
        let config = SourceConfig::from_csv("keyboard,mouse");
        assert!(config.keyboard);
        assert!(config.mouse);

        let config = SourceConfig::from_csv("keyboard");
        assert!(config.keyboard);
        assert!(!config.mouse);

        let config = SourceConfig::from_csv("all");
        assert!(config.any_enabled());
        assert!(!SourceConfig::from_csv("trackball").any_enabled());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cooldown, Duration::from_secs(3));
        assert_eq!(config.text_timeout, Duration::from_secs(5));
        assert_eq!(config.photo_timeout, Duration::from_secs(10));
        assert_eq!(config.webcam.program, "fswebcam");
        assert_eq!(config.screen.program, "scrot");
        assert!(config.output_dir.ends_with("security"));
        assert!(config.log_path().ends_with("intrusion_log.txt"));
    }

    #[test]
    fn test_config_json_roundtrip_uses_seconds() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["cooldown"], 3);
        let parsed: Config = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.cooldown, config.cooldown);
    }

    #[test]
    fn test_credentials_present() {
        let creds =
            Credentials::from_lookup(lookup(&[(BOT_TOKEN_ENV, "123:abc"), (CHAT_ID_ENV, "42")]))
                .unwrap();
        assert_eq!(creds.bot_token, "123:abc");
        assert_eq!(creds.chat_id, "42");
        assert!(!format!("{creds:?}").contains("123:abc"));
    }

    #[test]
    fn test_credentials_missing() {
        let err = Credentials::from_lookup(lookup(&[(CHAT_ID_ENV, "42")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(BOT_TOKEN_ENV)));

        let err = Credentials::from_lookup(lookup(&[(BOT_TOKEN_ENV, "t"), (CHAT_ID_ENV, " ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(CHAT_ID_ENV)));
    }
}
