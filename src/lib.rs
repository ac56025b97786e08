//! Intrusion Watcher - NumLock-armed activity alarm for Linux desktops.
//!
//! While NumLock is OFF the watcher is armed: any key press, mouse click or
//! mouse movement takes a webcam photo and a screenshot, appends to a local
//! audit log and sends a Telegram alert. Alerts are rate limited by a global
//! cooldown. Turning NumLock ON disarms the watcher and clears the text typed
//! during the armed session.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Intrusion Watcher                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────┐   ┌──────────┐   ┌────────────┐  │
//! │  │ Collector │──▶│ Classifier │──▶│  Arming  │──▶│  Cooldown  │  │
//! │  │  (evdev)  │   │            │   │ machine  │   │    gate    │  │
//! │  └───────────┘   └────────────┘   └──────────┘   └────────────┘  │
//! │                                        │               │         │
//! │                                        ▼               ▼         │
//! │                                  ┌───────────┐   ┌───────────┐   │
//! │                                  │ Audit log │◀──│ Responder │   │
//! │                                  └───────────┘   └───────────┘   │
//! │                                              capture + Telegram  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use intrusion_watcher::collector::{Collector, CollectorConfig};
//!
//! // Requires read access to /dev/input
//! let collector = Collector::discover(CollectorConfig::default())
//!     .expect("no input devices");
//! for source in collector.sources() {
//!     println!("{} {:?}", source.path, source.roles.labels());
//! }
//! ```

pub mod audit;
pub mod capture;
pub mod collector;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod notify;
pub mod responder;

// Re-export key types at crate root for convenience
pub use audit::{AuditLog, AuditStats, SharedAuditLog};
pub use capture::{CaptureBackend, CaptureCommand, CaptureError, CaptureKind, CommandCapture};
pub use collector::{Collector, CollectorConfig, CollectorError, InputSource, SourceMessage};
pub use config::{Config, ConfigError, Credentials, SourceConfig};
pub use core::{ArmState, ArmingMachine, CooldownGate, IntrusionEvent, IntrusionSource};
pub use dispatcher::Dispatcher;
pub use notify::{BlockingTelegramClient, Notifier, TelegramClient, TelegramConfig, TransportError};
pub use responder::{IntrusionResponder, ResponseReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Notice describing what the watcher records, shown by `intrusion-watcher notice`.
pub const MONITORING_NOTICE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║              INTRUSION WATCHER - MONITORING NOTICE               ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This watcher guards an unattended machine you own.              ║
║                                                                  ║
║  NumLock ON  = disarmed, nothing is recorded.                    ║
║  NumLock OFF = armed.                                            ║
║                                                                  ║
║  WHILE ARMED IT RECORDS:                                         ║
║    • Keys typed (letters, digits, space, enter, placeholders)    ║
║    • Mouse clicks and movement (no coordinates)                  ║
║    • A webcam photo and a screenshot per alert                   ║
║                                                                  ║
║  Alerts go to your Telegram chat (TG_BOT_TOKEN / TG_CHAT_ID),    ║
║  at most one every few seconds. The local audit log lives in     ║
║  ~/security/intrusion_log.txt by default.                        ║
║                                                                  ║
║  Typed text is forgotten as soon as NumLock is turned ON.        ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
