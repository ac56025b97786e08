//! Linux input event codes used by the watcher.
//!
//! Values match `<linux/input-event-codes.h>`. They are kept here rather
//! than taken from evdev so the core logic stays platform-independent.

/// Event type: key or button
pub const EV_KEY: u16 = 0x01;
/// Event type: relative axis
pub const EV_REL: u16 = 0x02;
/// Event type: LED
pub const EV_LED: u16 = 0x11;

/// NumLock LED code (arming indicator)
pub const LED_NUML: u16 = 0x00;

/// Key value for a press
pub const VALUE_PRESS: i32 = 1;

pub const KEY_1: u16 = 2;
pub const KEY_2: u16 = 3;
pub const KEY_3: u16 = 4;
pub const KEY_4: u16 = 5;
pub const KEY_5: u16 = 6;
pub const KEY_6: u16 = 7;
pub const KEY_7: u16 = 8;
pub const KEY_8: u16 = 9;
pub const KEY_9: u16 = 10;
pub const KEY_0: u16 = 11;
pub const KEY_BACKSPACE: u16 = 14;
pub const KEY_Q: u16 = 16;
pub const KEY_W: u16 = 17;
pub const KEY_E: u16 = 18;
pub const KEY_R: u16 = 19;
pub const KEY_T: u16 = 20;
pub const KEY_Y: u16 = 21;
pub const KEY_U: u16 = 22;
pub const KEY_I: u16 = 23;
pub const KEY_O: u16 = 24;
pub const KEY_P: u16 = 25;
pub const KEY_ENTER: u16 = 28;
pub const KEY_A: u16 = 30;
pub const KEY_S: u16 = 31;
pub const KEY_D: u16 = 32;
pub const KEY_F: u16 = 33;
pub const KEY_G: u16 = 34;
pub const KEY_H: u16 = 35;
pub const KEY_J: u16 = 36;
pub const KEY_K: u16 = 37;
pub const KEY_L: u16 = 38;
pub const KEY_Z: u16 = 44;
pub const KEY_X: u16 = 45;
pub const KEY_C: u16 = 46;
pub const KEY_V: u16 = 47;
pub const KEY_B: u16 = 48;
pub const KEY_N: u16 = 49;
pub const KEY_M: u16 = 50;
pub const KEY_SPACE: u16 = 57;
/// The arming toggle key itself
pub const KEY_NUMLOCK: u16 = 69;

/// Mouse left button
pub const BTN_LEFT: u16 = 0x110;

/// Check whether a key code lies in one of the button ranges
/// (`BTN_MISC..=BTN_GEAR_UP`, the d-pad and the trigger-happy block).
pub fn is_button(code: u16) -> bool {
    matches!(code, 0x100..=0x151 | 0x220..=0x223 | 0x2c0..=0x2e7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_ranges() {
        assert!(is_button(BTN_LEFT));
        assert!(is_button(0x111)); // BTN_RIGHT
        assert!(is_button(0x2c0));
        assert!(!is_button(KEY_A));
        assert!(!is_button(KEY_NUMLOCK));
        assert!(!is_button(0x160)); // KEY_OK
    }
}
