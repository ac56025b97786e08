//! Input device enumeration and event collection.
//!
//! This module classifies input devices into sources with role tags and
//! streams their raw events to the dispatcher over a single channel.

pub mod types;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(target_os = "linux"))]
pub mod noop;

// Re-export commonly used types
pub use types::{
    designate_indicator, Capabilities, CollectorConfig, CollectorError, EventKind, InputSource,
    RawEvent, SourceId, SourceMessage, SourceRoles,
};

#[cfg(target_os = "linux")]
pub use linux::EvdevCollector;

/// Platform-agnostic collector type alias
#[cfg(target_os = "linux")]
pub type Collector = EvdevCollector;

#[cfg(not(target_os = "linux"))]
pub use noop::NoopCollector;

/// Platform-agnostic collector type alias
#[cfg(not(target_os = "linux"))]
pub type Collector = NoopCollector;
