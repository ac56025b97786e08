//! Key code to symbol mapping for the typed-text buffer.

use crate::core::codes::*;

/// Placeholder appended for backspace. The buffer never deletes.
pub const BACKSPACE_TOKEN: &str = "[BS]";

/// Map a key code to the symbol appended to the typed buffer.
///
/// Unmapped codes become `"[<code>]"` so no keystroke is lost.
pub fn symbol_for(code: u16) -> String {
    let symbol = match code {
        KEY_A => "a",
        KEY_B => "b",
        KEY_C => "c",
        KEY_D => "d",
        KEY_E => "e",
        KEY_F => "f",
        KEY_G => "g",
        KEY_H => "h",
        KEY_I => "i",
        KEY_J => "j",
        KEY_K => "k",
        KEY_L => "l",
        KEY_M => "m",
        KEY_N => "n",
        KEY_O => "o",
        KEY_P => "p",
        KEY_Q => "q",
        KEY_R => "r",
        KEY_S => "s",
        KEY_T => "t",
        KEY_U => "u",
        KEY_V => "v",
        KEY_W => "w",
        KEY_X => "x",
        KEY_Y => "y",
        KEY_Z => "z",
        KEY_1 => "1",
        KEY_2 => "2",
        KEY_3 => "3",
        KEY_4 => "4",
        KEY_5 => "5",
        KEY_6 => "6",
        KEY_7 => "7",
        KEY_8 => "8",
        KEY_9 => "9",
        KEY_0 => "0",
        KEY_SPACE => " ",
        KEY_ENTER => "\n",
        KEY_BACKSPACE => BACKSPACE_TOKEN,
        other => return format!("[{other}]"),
    };
    symbol.to_string()
}
