//! Append-only audit log with session statistics.
//!
//! Every entry is written as one `[YYYY-MM-DD HH:MM:SS] text` record to the
//! log file in the output directory. Alongside the file the log keeps
//! counters for the current session, persisted between runs.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// File name of the audit log inside the output directory.
pub const LOG_FILE_NAME: &str = "intrusion_log.txt";

/// File name of the persisted statistics inside the output directory.
pub const STATS_FILE_NAME: &str = "stats.json";

/// Timestamp format used for log entries.
pub const ENTRY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format one log record (including the trailing newline).
pub fn format_entry(at: DateTime<Local>, entry: &str) -> String {
    format!("[{}] {}\n", at.format(ENTRY_TIME_FORMAT), entry)
}

/// The audit log.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    /// Serializes appends
    write_lock: Mutex<()>,
    key_presses: AtomicU64,
    mouse_clicks: AtomicU64,
    mouse_moves: AtomicU64,
    candidates: AtomicU64,
    triggers: AtomicU64,
    suppressed: AtomicU64,
    capture_failures: AtomicU64,
    delivery_failures: AtomicU64,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl AuditLog {
    /// Create an audit log writing to `path`. The parent directory is
    /// created if missing.
    pub fn open(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            key_presses: AtomicU64::new(0),
            mouse_clicks: AtomicU64::new(0),
            mouse_moves: AtomicU64::new(0),
            candidates: AtomicU64::new(0),
            triggers: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            capture_failures: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        })
    }

    /// Create an audit log whose counters are loaded from and saved to
    /// `stats_path`.
    pub fn with_persistence(path: PathBuf, stats_path: PathBuf) -> Result<Self, std::io::Error> {
        let mut log = Self::open(path)?;
        log.persist_path = Some(stats_path);

        if let Err(e) = log.load() {
            tracing::warn!("Could not load previous audit stats: {e}");
        }

        Ok(log)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped entry using the local clock.
    pub fn append(&self, entry: &str) -> Result<(), std::io::Error> {
        self.append_at(Local::now(), entry)
    }

    /// Append an entry with an explicit timestamp.
    pub fn append_at(&self, at: DateTime<Local>, entry: &str) -> Result<(), std::io::Error> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_entry(at, entry).as_bytes())
    }

    pub fn record_key_press(&self) {
        self.key_presses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mouse_click(&self) {
        self.mouse_clicks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mouse_move(&self) {
        self.mouse_moves.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate raised by the arming machine.
    pub fn record_candidate(&self) {
        self.candidates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate accepted by the cooldown gate.
    pub fn record_trigger(&self) {
        self.triggers.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate dropped by the cooldown gate.
    pub fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capture_failure(&self) {
        self.capture_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> AuditStats {
        AuditStats {
            key_presses: self.key_presses.load(Ordering::Relaxed),
            mouse_clicks: self.mouse_clicks.load(Ordering::Relaxed),
            mouse_moves: self.mouse_moves.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            triggers: self.triggers.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Key presses while armed: {}\n\
             - Mouse clicks while armed: {}\n\
             - Mouse movements while armed: {}\n\
             - Intrusion candidates: {}\n\
             - Alerts triggered: {}\n\
             - Suppressed by cooldown: {}\n\
             - Capture failures: {}\n\
             - Delivery failures: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Audit log: {}",
            stats.key_presses,
            stats.mouse_clicks,
            stats.mouse_moves,
            stats.candidates,
            stats.triggers,
            stats.suppressed,
            stats.capture_failures,
            stats.delivery_failures,
            stats.session_duration_secs,
            self.path.display()
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                key_presses: stats.key_presses,
                mouse_clicks: stats.mouse_clicks,
                mouse_moves: stats.mouse_moves,
                candidates: stats.candidates,
                triggers: stats.triggers,
                suppressed: stats.suppressed,
                capture_failures: stats.capture_failures,
                delivery_failures: stats.delivery_failures,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.key_presses
                    .store(persisted.key_presses, Ordering::Relaxed);
                self.mouse_clicks
                    .store(persisted.mouse_clicks, Ordering::Relaxed);
                self.mouse_moves
                    .store(persisted.mouse_moves, Ordering::Relaxed);
                self.candidates
                    .store(persisted.candidates, Ordering::Relaxed);
                self.triggers.store(persisted.triggers, Ordering::Relaxed);
                self.suppressed
                    .store(persisted.suppressed, Ordering::Relaxed);
                self.capture_failures
                    .store(persisted.capture_failures, Ordering::Relaxed);
                self.delivery_failures
                    .store(persisted.delivery_failures, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

/// Snapshot of audit statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub key_presses: u64,
    pub mouse_clicks: u64,
    pub mouse_moves: u64,
    pub candidates: u64,
    pub triggers: u64,
    pub suppressed: u64,
    pub capture_failures: u64,
    pub delivery_failures: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    key_presses: u64,
    mouse_clicks: u64,
    mouse_moves: u64,
    candidates: u64,
    triggers: u64,
    suppressed: u64,
    capture_failures: u64,
    delivery_failures: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared audit log.
pub type SharedAuditLog = Arc<AuditLog>;

/// Open a shared audit log.
pub fn create_shared_log(path: PathBuf) -> Result<SharedAuditLog, std::io::Error> {
    AuditLog::open(path).map(Arc::new)
}

/// Open a shared audit log with persisted statistics.
pub fn create_shared_log_with_persistence(
    path: PathBuf,
    stats_path: PathBuf,
) -> Result<SharedAuditLog, std::io::Error> {
    AuditLog::with_persistence(path, stats_path).map(Arc::new)
}
