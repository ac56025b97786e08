//! NumLock-driven arming state machine.
//!
//! The machine is armed while the indicator LED is OFF. While armed, key
//! presses, clicks and motion produce intrusion candidates; key presses also
//! grow the typed-text buffer. Disarming clears the buffer so text never
//! leaks into the next armed session.

use crate::collector::types::{SourceId, SourceRoles};
use crate::core::classifier::ClassifiedEvent;
use crate::core::codes::{KEY_NUMLOCK, LED_NUML};
use crate::core::keymap::symbol_for;
use serde::{Deserialize, Serialize};

/// Monitoring state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmState {
    Armed,
    Disarmed,
}

impl ArmState {
    /// Indicator ON means disarmed.
    pub fn from_indicator(on: bool) -> Self {
        if on {
            ArmState::Disarmed
        } else {
            ArmState::Armed
        }
    }
}

impl std::fmt::Display for ArmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmState::Armed => write!(f, "armed"),
            ArmState::Disarmed => write!(f, "disarmed"),
        }
    }
}

/// Which kind of activity raised a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntrusionSource {
    Keyboard,
    MouseClick,
    MouseMove,
}

impl IntrusionSource {
    /// Tag used in captions and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntrusionSource::Keyboard => "keyboard",
            IntrusionSource::MouseClick => "mouse_click",
            IntrusionSource::MouseMove => "mouse_move",
        }
    }
}

impl std::fmt::Display for IntrusionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provisional intrusion signal, still subject to the cooldown gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrusionEvent {
    pub source: IntrusionSource,
    /// Typed buffer at the moment the candidate was raised
    pub typed: String,
}

/// What the machine decided for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Set when the event came from the arming indicator
    pub indicator: Option<ArmState>,
    /// Line to append to the audit log
    pub audit_entry: Option<String>,
    pub candidate: Option<IntrusionEvent>,
}

/// Owns the armed flag and the typed-text buffer.
#[derive(Debug, Clone)]
pub struct ArmingMachine {
    state: ArmState,
    typed: String,
    indicator: Option<SourceId>,
}

impl ArmingMachine {
    /// Create a machine for the given indicator source and its current LED
    /// state. Without an indicator the machine stays armed.
    pub fn new(indicator: Option<SourceId>, indicator_on: bool) -> Self {
        Self {
            state: ArmState::from_indicator(indicator.is_some() && indicator_on),
            typed: String::new(),
            indicator,
        }
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == ArmState::Armed
    }

    /// Text typed during the current armed session.
    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn indicator(&self) -> Option<SourceId> {
        self.indicator
    }

    /// Apply one classified event from `source`.
    pub fn handle(
        &mut self,
        source: SourceId,
        roles: SourceRoles,
        event: ClassifiedEvent,
    ) -> Reaction {
        if let ClassifiedEvent::IndicatorToggle { code, on } = event {
            if Some(source) != self.indicator || code != LED_NUML {
                return Reaction::default();
            }
            self.state = ArmState::from_indicator(on);
            if self.state == ArmState::Disarmed {
                self.typed.clear();
            }
            return Reaction {
                indicator: Some(self.state),
                ..Default::default()
            };
        }

        if !self.is_armed() {
            return Reaction::default();
        }

        match event {
            ClassifiedEvent::KeyPress { code } if roles.keyboard => self.keystroke(code),
            ClassifiedEvent::KeyPress { .. } if roles.pointer => self.click(),
            ClassifiedEvent::PointerClick { .. } if roles.pointer => self.click(),
            ClassifiedEvent::PointerClick { code } if roles.keyboard => self.keystroke(code),
            ClassifiedEvent::PointerMotion if roles.pointer => {
                self.candidate(IntrusionSource::MouseMove, "Mouse movement detected")
            }
            _ => Reaction::default(),
        }
    }

    fn keystroke(&mut self, code: u16) -> Reaction {
        // Pressing NumLock is the owner arming/disarming, not an intrusion.
        if code == KEY_NUMLOCK {
            return Reaction::default();
        }
        let symbol = symbol_for(code);
        self.typed.push_str(&symbol);
        self.candidate(IntrusionSource::Keyboard, &format!("Key pressed: {symbol}"))
    }

    fn click(&mut self) -> Reaction {
        self.candidate(IntrusionSource::MouseClick, "Mouse click detected")
    }

    fn candidate(&self, source: IntrusionSource, entry: &str) -> Reaction {
        Reaction {
            indicator: None,
            audit_entry: Some(entry.to_string()),
            candidate: Some(IntrusionEvent {
                source,
                typed: self.typed.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codes::{BTN_LEFT, KEY_A, KEY_H, KEY_I, KEY_X};

    const LED_SOURCE: SourceId = 0;
    const MOUSE: SourceId = 1;

    fn keyboard() -> SourceRoles {
        SourceRoles {
            indicator: true,
            keyboard: true,
            pointer: false,
        }
    }

    fn pointer() -> SourceRoles {
        SourceRoles {
            pointer: true,
            ..Default::default()
        }
    }

    fn led(on: bool) -> ClassifiedEvent {
        ClassifiedEvent::IndicatorToggle { code: LED_NUML, on }
    }

    fn key(code: u16) -> ClassifiedEvent {
        ClassifiedEvent::KeyPress { code }
    }

    #[test]
    fn test_initial_state_from_indicator() {
        assert_eq!(ArmingMachine::new(Some(0), true).state(), ArmState::Disarmed);
        assert_eq!(ArmingMachine::new(Some(0), false).state(), ArmState::Armed);
        assert_eq!(ArmingMachine::new(None, true).state(), ArmState::Armed);
    }

    #[test]
    fn test_arm_then_type() {
        let mut machine = ArmingMachine::new(Some(LED_SOURCE), true);

        let reaction = machine.handle(LED_SOURCE, keyboard(), led(false));
        assert_eq!(reaction.indicator, Some(ArmState::Armed));
        assert!(reaction.candidate.is_none());
        assert_eq!(machine.typed(), "");

        let reaction = machine.handle(LED_SOURCE, keyboard(), key(KEY_A));
        assert_eq!(machine.typed(), "a");
        assert_eq!(reaction.audit_entry.as_deref(), Some("Key pressed: a"));
        assert_eq!(
            reaction.candidate,
            Some(IntrusionEvent {
                source: IntrusionSource::Keyboard,
                typed: "a".to_string()
            })
        );
    }

    #[test]
    fn test_disarm_clears_buffer_and_blocks_events() {
        let mut machine = ArmingMachine::new(Some(LED_SOURCE), false);
        machine.handle(LED_SOURCE, keyboard(), key(KEY_H));
        machine.handle(LED_SOURCE, keyboard(), key(KEY_I));
        assert_eq!(machine.typed(), "hi");

        let reaction = machine.handle(LED_SOURCE, keyboard(), led(true));
        assert_eq!(reaction.indicator, Some(ArmState::Disarmed));
        assert_eq!(machine.typed(), "");

        let reaction = machine.handle(LED_SOURCE, keyboard(), key(KEY_X));
        assert_eq!(reaction, Reaction::default());
        assert_eq!(machine.typed(), "");

        let reaction = machine.handle(MOUSE, pointer(), ClassifiedEvent::PointerMotion);
        assert_eq!(reaction, Reaction::default());
    }

    #[test]
    fn test_numlock_key_is_filtered() {
        let mut machine = ArmingMachine::new(Some(LED_SOURCE), false);
        let reaction = machine.handle(LED_SOURCE, keyboard(), key(KEY_NUMLOCK));
        assert_eq!(reaction, Reaction::default());
        assert_eq!(machine.typed(), "");
    }

    #[test]
    fn test_unmapped_key_still_recorded() {
        let mut machine = ArmingMachine::new(None, false);
        let reaction = machine.handle(0, keyboard(), key(42));
        assert_eq!(machine.typed(), "[42]");
        assert_eq!(reaction.audit_entry.as_deref(), Some("Key pressed: [42]"));
        assert!(reaction.candidate.is_some());
    }

    #[test]
    fn test_pointer_events() {
        let mut machine = ArmingMachine::new(Some(LED_SOURCE), false);
        machine.handle(LED_SOURCE, keyboard(), key(KEY_A));

        let click = machine.handle(MOUSE, pointer(), ClassifiedEvent::PointerClick { code: BTN_LEFT });
        assert_eq!(click.audit_entry.as_deref(), Some("Mouse click detected"));
        let candidate = click.candidate.unwrap();
        assert_eq!(candidate.source, IntrusionSource::MouseClick);
        assert_eq!(candidate.typed, "a");

        let motion = machine.handle(MOUSE, pointer(), ClassifiedEvent::PointerMotion);
        assert_eq!(motion.audit_entry.as_deref(), Some("Mouse movement detected"));
        assert_eq!(motion.candidate.unwrap().source, IntrusionSource::MouseMove);

        // Clicks never touch the buffer
        assert_eq!(machine.typed(), "a");
    }

    #[test]
    fn test_combo_device_routes_by_event_kind() {
        let combo = SourceRoles {
            indicator: false,
            keyboard: true,
            pointer: true,
        };
        let mut machine = ArmingMachine::new(None, false);

        let keystroke = machine.handle(3, combo, key(KEY_A));
        assert_eq!(keystroke.candidate.unwrap().source, IntrusionSource::Keyboard);

        let click = machine.handle(3, combo, ClassifiedEvent::PointerClick { code: BTN_LEFT });
        assert_eq!(click.candidate.unwrap().source, IntrusionSource::MouseClick);
        assert_eq!(machine.typed(), "a");
    }

    #[test]
    fn test_motion_from_keyboard_only_source_ignored() {
        let mut machine = ArmingMachine::new(None, false);
        let reaction = machine.handle(0, keyboard(), ClassifiedEvent::PointerMotion);
        assert_eq!(reaction, Reaction::default());
    }

    #[test]
    fn test_foreign_indicator_ignored() {
        let mut machine = ArmingMachine::new(Some(LED_SOURCE), false);

        // LED change from a device that is not the designated indicator
        let reaction = machine.handle(5, keyboard(), led(true));
        assert!(reaction.indicator.is_none());
        assert!(machine.is_armed());

        // CapsLock LED on the designated indicator
        let reaction = machine.handle(
            LED_SOURCE,
            keyboard(),
            ClassifiedEvent::IndicatorToggle { code: 1, on: true },
        );
        assert!(reaction.indicator.is_none());
        assert!(machine.is_armed());
    }

    #[test]
    fn test_buffer_grows_across_candidates() {
        let mut machine = ArmingMachine::new(None, false);
        for code in [KEY_H, KEY_I, KEY_A] {
            machine.handle(0, keyboard(), key(code));
        }
        assert_eq!(machine.typed(), "hia");
    }

    #[test]
    fn test_releases_ignored() {
        let mut machine = ArmingMachine::new(None, false);
        let reaction = machine.handle(0, keyboard(), ClassifiedEvent::KeyReleaseOrOther);
        assert_eq!(reaction, Reaction::default());
        let reaction = machine.handle(0, keyboard(), ClassifiedEvent::Irrelevant);
        assert_eq!(reaction, Reaction::default());
    }
}
