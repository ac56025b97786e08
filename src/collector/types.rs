//! Input source and raw event types shared by every collector backend.
//!
//! Collectors translate platform events into [`RawEvent`]s tagged with the
//! [`SourceId`] of the device they came from. Everything downstream of the
//! collector works only with these types.

use crate::core::codes::{EV_KEY, EV_LED, EV_REL};
use serde::{Deserialize, Serialize};

/// Opaque identity of an input source, stable for the process lifetime.
pub type SourceId = usize;

/// Kind of a raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Key or button state change (value: 0 release, 1 press, 2 repeat)
    KeyOrButton,
    /// Relative axis motion (mouse movement, wheel)
    RelativeMotion,
    /// Indicator LED change (value: 0 off, 1 on)
    IndicatorChange,
    /// Anything else (sync reports, misc, absolute axes)
    Other,
}

impl EventKind {
    /// Map a Linux input event type number to an event kind.
    pub fn from_type(event_type: u16) -> Self {
        match event_type {
            EV_KEY => EventKind::KeyOrButton,
            EV_REL => EventKind::RelativeMotion,
            EV_LED => EventKind::IndicatorChange,
            _ => EventKind::Other,
        }
    }
}

/// A single event read from an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub source: SourceId,
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(source: SourceId, kind: EventKind, code: u16, value: i32) -> Self {
        Self {
            source,
            kind,
            code,
            value,
        }
    }
}

/// Capabilities probed from a device, reduced to what role detection needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Device exposes a NumLock LED
    pub numlock_led: bool,
    /// Device reports `KEY_A`
    pub key_a: bool,
    /// Device reports `BTN_LEFT`
    pub btn_left: bool,
    /// Device reports any relative axis
    pub relative_axes: bool,
}

/// Role tags held by a source. A single device may hold several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRoles {
    pub indicator: bool,
    pub keyboard: bool,
    pub pointer: bool,
}

impl SourceRoles {
    /// Derive roles from device capabilities.
    pub fn from_capabilities(caps: &Capabilities) -> Self {
        Self {
            indicator: caps.numlock_led,
            keyboard: caps.key_a,
            pointer: caps.relative_axes || caps.btn_left,
        }
    }

    /// Drop the keyboard/pointer roles the configuration does not watch.
    ///
    /// The indicator role is never masked: arming must keep working even
    /// when keyboard capture is off.
    pub fn masked(self, config: &CollectorConfig) -> Self {
        Self {
            indicator: self.indicator,
            keyboard: self.keyboard && config.capture_keyboard,
            pointer: self.pointer && config.capture_mouse,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.indicator || self.keyboard || self.pointer)
    }

    /// Human-readable role names, in display order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.indicator {
            labels.push("indicator");
        }
        if self.keyboard {
            labels.push("keyboard");
        }
        if self.pointer {
            labels.push("pointer");
        }
        labels
    }
}

/// An enumerated input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    pub id: SourceId,
    /// Device node path
    pub path: String,
    /// Device name as reported by the kernel
    pub name: String,
    pub roles: SourceRoles,
}

/// Pick the single indicator source that drives arming: the first one
/// carrying the indicator role.
pub fn designate_indicator(sources: &[InputSource]) -> Option<SourceId> {
    sources.iter().find(|s| s.roles.indicator).map(|s| s.id)
}

/// Message delivered from a source reader to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMessage {
    /// An event read from a source
    Event(RawEvent),
    /// The source became unreadable and its reader stopped
    Lost { source: SourceId, error: String },
}

/// Configuration for which event sources to capture.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub capture_keyboard: bool,
    pub capture_mouse: bool,
    /// Capacity of the fan-in channel shared by all readers
    pub channel_capacity: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            capture_keyboard: true,
            capture_mouse: true,
            channel_capacity: 10_000,
        }
    }
}

/// Errors that can occur during device enumeration and collection.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    /// No readable device with a relevant role was found
    NoSources,
    /// A source could not be read
    DeviceRead { source: SourceId, message: String },
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::NoSources => write!(
                f,
                "No readable keyboard, mouse or indicator devices found (are you in the 'input' group?)"
            ),
            CollectorError::DeviceRead { source, message } => {
                write!(f, "Failed to read input source {source}: {message}")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: SourceId, roles: SourceRoles) -> InputSource {
        InputSource {
            id,
            path: format!("/dev/input/event{id}"),
            name: format!("device {id}"),
            roles,
        }
    }

    #[test]
    fn test_event_kind_from_type() {
        assert_eq!(EventKind::from_type(EV_KEY), EventKind::KeyOrButton);
        assert_eq!(EventKind::from_type(EV_REL), EventKind::RelativeMotion);
        assert_eq!(EventKind::from_type(EV_LED), EventKind::IndicatorChange);
        assert_eq!(EventKind::from_type(0), EventKind::Other);
        assert_eq!(EventKind::from_type(3), EventKind::Other);
    }

    #[test]
    fn test_roles_from_capabilities() {
        let keyboard = SourceRoles::from_capabilities(&Capabilities {
            numlock_led: true,
            key_a: true,
            ..Default::default()
        });
        assert!(keyboard.indicator && keyboard.keyboard && !keyboard.pointer);

        let touchpad = SourceRoles::from_capabilities(&Capabilities {
            btn_left: true,
            ..Default::default()
        });
        assert_eq!(touchpad.labels(), vec!["pointer"]);

        let combo = SourceRoles::from_capabilities(&Capabilities {
            key_a: true,
            relative_axes: true,
            ..Default::default()
        });
        assert!(combo.keyboard && combo.pointer);

        assert!(SourceRoles::from_capabilities(&Capabilities::default()).is_empty());
    }

    #[test]
    fn test_masking_keeps_indicator() {
        let roles = SourceRoles {
            indicator: true,
            keyboard: true,
            pointer: true,
        };
        let config = CollectorConfig {
            capture_keyboard: false,
            capture_mouse: false,
            ..Default::default()
        };
        let masked = roles.masked(&config);
        assert!(masked.indicator);
        assert!(!masked.keyboard);
        assert!(!masked.pointer);
    }

    #[test]
    fn test_designate_first_indicator() {
        let plain = SourceRoles {
            keyboard: true,
            ..Default::default()
        };
        let led = SourceRoles {
            indicator: true,
            keyboard: true,
            pointer: false,
        };
        let sources = vec![source(0, plain), source(1, led), source(2, led)];
        assert_eq!(designate_indicator(&sources), Some(1));
        assert_eq!(designate_indicator(&sources[..1]), None);
    }
}
