//! Stateless classification of raw input events.

use crate::collector::types::{EventKind, RawEvent};
use crate::core::codes::{is_button, VALUE_PRESS};

/// What a raw event means to the arming logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedEvent {
    /// An indicator LED changed. The code is checked against the arming
    /// indicator later, when routing.
    IndicatorToggle { code: u16, on: bool },
    /// A non-button key was pressed
    KeyPress { code: u16 },
    /// Key/button release or autorepeat
    KeyReleaseOrOther,
    /// A button (mouse, touchpad, gamepad) was pressed
    PointerClick { code: u16 },
    /// Relative motion
    PointerMotion,
    /// Nothing the watcher cares about
    Irrelevant,
}

/// Classify a raw event. Total over all inputs.
pub fn classify(event: &RawEvent) -> ClassifiedEvent {
    match event.kind {
        EventKind::IndicatorChange => ClassifiedEvent::IndicatorToggle {
            code: event.code,
            on: event.value != 0,
        },
        EventKind::KeyOrButton if event.value == VALUE_PRESS => {
            if is_button(event.code) {
                ClassifiedEvent::PointerClick { code: event.code }
            } else {
                ClassifiedEvent::KeyPress { code: event.code }
            }
        }
        EventKind::KeyOrButton => ClassifiedEvent::KeyReleaseOrOther,
        EventKind::RelativeMotion => ClassifiedEvent::PointerMotion,
        EventKind::Other => ClassifiedEvent::Irrelevant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codes::{BTN_LEFT, KEY_A, LED_NUML};

    fn raw(kind: EventKind, code: u16, value: i32) -> RawEvent {
        RawEvent::new(0, kind, code, value)
    }

    #[test]
    fn test_key_values() {
        assert_eq!(
            classify(&raw(EventKind::KeyOrButton, KEY_A, 1)),
            ClassifiedEvent::KeyPress { code: KEY_A }
        );
        assert_eq!(
            classify(&raw(EventKind::KeyOrButton, KEY_A, 0)),
            ClassifiedEvent::KeyReleaseOrOther
        );
        assert_eq!(
            classify(&raw(EventKind::KeyOrButton, KEY_A, 2)),
            ClassifiedEvent::KeyReleaseOrOther
        );
    }

    #[test]
    fn test_button_press_is_click() {
        assert_eq!(
            classify(&raw(EventKind::KeyOrButton, BTN_LEFT, 1)),
            ClassifiedEvent::PointerClick { code: BTN_LEFT }
        );
        assert_eq!(
            classify(&raw(EventKind::KeyOrButton, BTN_LEFT, 0)),
            ClassifiedEvent::KeyReleaseOrOther
        );
    }

    #[test]
    fn test_indicator_any_code() {
        assert_eq!(
            classify(&raw(EventKind::IndicatorChange, LED_NUML, 1)),
            ClassifiedEvent::IndicatorToggle {
                code: LED_NUML,
                on: true
            }
        );
        // CapsLock LED is still an indicator toggle here
        assert_eq!(
            classify(&raw(EventKind::IndicatorChange, 1, 0)),
            ClassifiedEvent::IndicatorToggle { code: 1, on: false }
        );
    }

    #[test]
    fn test_motion_and_other() {
        assert_eq!(
            classify(&raw(EventKind::RelativeMotion, 0, -3)),
            ClassifiedEvent::PointerMotion
        );
        assert_eq!(
            classify(&raw(EventKind::Other, 0, 0)),
            ClassifiedEvent::Irrelevant
        );
    }
}
