//! Windows keyboard constants, key names and key locations
//!
//! The numeric values mirror the Win32 headers so that the filter and the
//! naming helpers stay usable (and testable) without the `windows` crate.

/// Keyboard window messages delivered as the hook's `wParam`
pub mod messages {
    pub const WM_KEYDOWN: u32 = 0x0100;
    pub const WM_KEYUP: u32 = 0x0101;
    pub const WM_SYSKEYDOWN: u32 = 0x0104;
    pub const WM_SYSKEYUP: u32 = 0x0105;
}

/// `KBDLLHOOKSTRUCT::flags` bits
pub mod flags {
    /// Key is part of the extended set
    pub const LLKHF_EXTENDED: u32 = 0x01;
    /// Event was injected rather than produced by hardware
    pub const LLKHF_INJECTED: u32 = 0x10;
}

pub const VK_SHIFT: u32 = 0x10;
pub const VK_LSHIFT: u32 = 0xA0;
pub const VK_RSHIFT: u32 = 0xA1;

/// Scan code carried by the fake Shift transitions Windows synthesizes
/// around IME and AltGr input.
pub const SYNTHETIC_SHIFT_SCAN_CODE: u32 = 554;

/// Check if the virtual key is one of the Shift keys
pub fn is_shift(vk_code: u32) -> bool {
    matches!(vk_code, VK_SHIFT | VK_LSHIFT | VK_RSHIFT)
}

/// Physical block of the keyboard a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLocation {
    /// Main typing block, function row and navigation cluster
    Main,
    /// Numeric keypad
    Numpad,
}

impl std::fmt::Display for KeyLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyLocation::Main => f.pad("main"),
            KeyLocation::Numpad => f.pad("numpad"),
        }
    }
}

/// Keys that exist both in the navigation cluster and on the keypad.
/// The extended flag tells the two apart.
const DUAL_LOCATION_KEYS: [u32; 11] = [
    0x2D, // INSERT
    0x2E, // DELETE
    0x24, // HOME
    0x23, // END
    0x21, // PAGE UP
    0x22, // PAGE DOWN
    0x25, // LEFT
    0x26, // UP
    0x27, // RIGHT
    0x28, // DOWN
    0x0D, // ENTER
];

/// Locate a key from its virtual key code and extended flag
pub fn key_location(vk_code: u32, is_extended: bool) -> KeyLocation {
    if DUAL_LOCATION_KEYS.contains(&vk_code) {
        return if is_extended {
            KeyLocation::Main
        } else {
            KeyLocation::Numpad
        };
    }

    match vk_code {
        // Keypad digits and operators
        0x60..=0x6F => KeyLocation::Numpad,
        _ => KeyLocation::Main,
    }
}

/// Names that need a `MAIN` qualifier to be told apart from their keypad twin
pub(crate) fn is_dual_location_name(name: &str) -> bool {
    matches!(
        name,
        "INSERT" | "DELETE" | "HOME" | "END" | "PAGE UP" | "PAGE DOWN"
    )
}

const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

const NUMPAD_DIGITS: [&str; 10] = [
    "NUMPAD 0", "NUMPAD 1", "NUMPAD 2", "NUMPAD 3", "NUMPAD 4", "NUMPAD 5", "NUMPAD 6",
    "NUMPAD 7", "NUMPAD 8", "NUMPAD 9",
];

const FUNCTION_KEYS: [&str; 24] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14",
    "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
];

/// Standard upper-case name of a virtual key
pub fn key_name(vk_code: u32) -> Option<&'static str> {
    let name = match vk_code {
        0x08 => "BACKSPACE",
        0x09 => "TAB",
        0x0C => "CLEAR",
        0x0D => "ENTER",
        VK_SHIFT => "SHIFT",
        0x11 => "CTRL",
        0x12 => "ALT",
        0x13 => "PAUSE",
        0x14 => "CAPS LOCK",
        0x15 => "HANGUL",
        0x19 => "HANJA",
        0x1B => "ESCAPE",
        0x20 => "SPACE",
        0x21 => "PAGE UP",
        0x22 => "PAGE DOWN",
        0x23 => "END",
        0x24 => "HOME",
        0x25 => "LEFT ARROW",
        0x26 => "UP ARROW",
        0x27 => "RIGHT ARROW",
        0x28 => "DOWN ARROW",
        0x2C => "PRINT SCREEN",
        0x2D => "INSERT",
        0x2E => "DELETE",
        0x30..=0x39 => DIGITS[(vk_code - 0x30) as usize],
        0x41..=0x5A => LETTERS[(vk_code - 0x41) as usize],
        0x5B => "LEFT META",
        0x5C => "RIGHT META",
        0x5D => "MENU",
        0x60..=0x69 => NUMPAD_DIGITS[(vk_code - 0x60) as usize],
        0x6A => "NUMPAD MULTIPLY",
        0x6B => "NUMPAD PLUS",
        0x6C => "NUMPAD SEPARATOR",
        0x6D => "NUMPAD MINUS",
        0x6E => "NUMPAD DOT",
        0x6F => "NUMPAD DIVIDE",
        0x70..=0x87 => FUNCTION_KEYS[(vk_code - 0x70) as usize],
        0x90 => "NUM LOCK",
        0x91 => "SCROLL LOCK",
        VK_LSHIFT => "LEFT SHIFT",
        VK_RSHIFT => "RIGHT SHIFT",
        0xA2 => "LEFT CTRL",
        0xA3 => "RIGHT CTRL",
        0xA4 => "LEFT ALT",
        0xA5 => "RIGHT ALT",
        0xBA => "SEMICOLON",
        0xBB => "EQUALS",
        0xBC => "COMMA",
        0xBD => "MINUS",
        0xBE => "DOT",
        0xBF => "FORWARD SLASH",
        0xC0 => "BACKTICK",
        0xDB => "SQUARE BRACKET OPEN",
        0xDC => "BACKSLASH",
        0xDD => "SQUARE BRACKET CLOSE",
        0xDE => "QUOTE",
        _ => return None,
    };
    Some(name)
}
