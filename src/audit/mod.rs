//! Audit trail for the intrusion watcher.
//!
//! Keeps the append-only local log of everything observed while armed and
//! the counters summarizing a monitoring session.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, format_entry, AuditLog, AuditStats,
    SharedAuditLog, LOG_FILE_NAME, STATS_FILE_NAME,
};
