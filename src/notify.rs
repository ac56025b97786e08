//! Telegram Bot API client for intrusion notifications.
//!
//! Only two calls are used: `sendMessage` for the caption and `sendPhoto`
//! for each captured image. Every call is a single attempt with its own
//! timeout; failures are returned to the caller, never retried.

use crate::config::{Config, Credentials};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default Bot API endpoint.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram client configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// API base URL (no trailing slash needed)
    pub api_base: String,
    pub credentials: Credentials,
    /// Timeout for `sendMessage`
    pub text_timeout: Duration,
    /// Timeout for `sendPhoto` uploads
    pub photo_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(api_base: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            api_base: api_base.into(),
            credentials,
            text_timeout: Duration::from_secs(5),
            photo_timeout: Duration::from_secs(10),
        }
    }

    /// Build the transport configuration from the watcher configuration.
    pub fn from_config(config: &Config, credentials: Credentials) -> Self {
        Self {
            api_base: config.api_base.clone(),
            credentials,
            text_timeout: config.text_timeout,
            photo_timeout: config.photo_timeout,
        }
    }

    /// URL of a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.credentials.bot_token,
            method
        )
    }
}

/// Notification transport errors.
#[derive(Debug)]
pub enum TransportError {
    /// HTTP client could not be built
    Client(String),
    /// Network/HTTP error (including timeouts)
    Network(String),
    /// The API rejected the request
    Api { status: u16, description: String },
    /// The photo file could not be read
    Io(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Client(msg) => write!(f, "Telegram client error: {msg}"),
            TransportError::Network(msg) => write!(f, "Telegram network error: {msg}"),
            TransportError::Api {
                status,
                description,
            } => write!(f, "Telegram API error ({status}): {description}"),
            TransportError::Io(msg) => write!(f, "Telegram upload error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Delivery of notifications to the owner.
pub trait Notifier {
    fn send_text(&self, message: &str) -> Result<(), TransportError>;

    fn send_photo(&self, path: &Path, caption: &str) -> Result<(), TransportError>;
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Async Telegram client.
pub struct TelegramClient {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramClient {
    /// Create a new client.
    pub fn new(config: TelegramConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Send a plain text message.
    pub async fn send_text(&self, message: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .timeout(self.config.text_timeout)
            .form(&[
                ("chat_id", self.config.credentials.chat_id.as_str()),
                ("text", message),
            ])
            .send()
            .await
            .map_err(network_error)?;

        check_response(response).await
    }

    /// Upload a photo with a caption.
    pub async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TransportError::Io(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.config.credentials.chat_id.clone())
            .text("caption", caption.to_string())
            .part(
                "photo",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let response = self
            .client
            .post(self.config.method_url("sendPhoto"))
            .timeout(self.config.photo_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;

        check_response(response).await
    }
}

/// reqwest errors carry the request URL, which embeds the bot token.
fn network_error(e: reqwest::Error) -> TransportError {
    TransportError::Network(e.without_url().to_string())
}

async fn check_response(response: reqwest::Response) -> Result<(), TransportError> {
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;

    match serde_json::from_str::<ApiResponse>(&body) {
        Ok(api) if api.ok && status.is_success() => Ok(()),
        Ok(api) => Err(TransportError::Api {
            status: status.as_u16(),
            description: api.description.unwrap_or(body),
        }),
        Err(_) if status.is_success() => Ok(()),
        Err(_) => Err(TransportError::Api {
            status: status.as_u16(),
            description: body,
        }),
    }
}

/// Blocking Telegram client for use from the dispatcher thread.
pub struct BlockingTelegramClient {
    inner: TelegramClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingTelegramClient {
    /// Create a new blocking client.
    pub fn new(config: TelegramConfig) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Client(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: TelegramClient::new(config)?,
            runtime,
        })
    }
}

impl Notifier for BlockingTelegramClient {
    fn send_text(&self, message: &str) -> Result<(), TransportError> {
        self.runtime.block_on(self.inner.send_text(message))
    }

    fn send_photo(&self, path: &Path, caption: &str) -> Result<(), TransportError> {
        self.runtime.block_on(self.inner.send_photo(path, caption))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("123:abc", "-10042")
    }

    #[test]
    fn test_method_url() {
        let config = TelegramConfig::new("https://api.telegram.org/", credentials());
        assert_eq!(
            config.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_default_timeouts() {
        let config = TelegramConfig::new(TELEGRAM_API_BASE, credentials());
        assert_eq!(config.text_timeout, Duration::from_secs(5));
        assert_eq!(config.photo_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Api {
            status: 400,
            description: "Bad Request: chat not found".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("400"));
        assert!(display.contains("chat not found"));
    }
}
