//! Key event records delivered to the consumer
//!
//! A `KeyEvent` is a plain value: it is copied out of the OS buffer on the
//! hook thread and moved through the bridge queue to the consumer.

use serde::{Deserialize, Serialize};

use crate::hotkey::keys::{self, KeyLocation};

/// Direction of a key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyState {
    /// Key pressed (WM_KEYDOWN / WM_SYSKEYDOWN)
    Down,
    /// Key released (WM_KEYUP / WM_SYSKEYUP)
    Up,
}

impl KeyState {
    pub fn is_down(self) -> bool {
        matches!(self, KeyState::Down)
    }
}

impl std::fmt::Display for KeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyState::Down => f.pad("DOWN"),
            KeyState::Up => f.pad("UP"),
        }
    }
}

/// A single key transition captured by the hook
///
/// Serializes to the consumer record
/// `{"state":"DOWN","vkCode":65,"scanCode":30,"isExtended":false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    state: KeyState,
    vk_code: u32,
    scan_code: u32,
    is_extended: bool,
}

impl KeyEvent {
    pub fn new(state: KeyState, vk_code: u32, scan_code: u32, is_extended: bool) -> Self {
        Self {
            state,
            vk_code,
            scan_code,
            is_extended,
        }
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    /// OS virtual key code (layout dependent)
    pub fn vk_code(&self) -> u32 {
        self.vk_code
    }

    /// Hardware scan code
    pub fn scan_code(&self) -> u32 {
        self.scan_code
    }

    /// Key belongs to the extended set (right-hand modifiers, navigation cluster)
    pub fn is_extended(&self) -> bool {
        self.is_extended
    }

    /// Standard name for the virtual key, if known
    pub fn name(&self) -> Option<&'static str> {
        keys::key_name(self.vk_code)
    }

    /// Which block of the keyboard the key sits in
    pub fn location(&self) -> KeyLocation {
        keys::key_location(self.vk_code, self.is_extended)
    }

    /// Key name qualified with its location where that disambiguates it,
    /// e.g. `NUMPAD INSERT` vs `MAIN INSERT`.
    pub fn enhanced_name(&self) -> String {
        let base = self.name().unwrap_or("UNKNOWN");

        match self.location() {
            KeyLocation::Numpad if !base.starts_with("NUMPAD") => format!("NUMPAD {}", base),
            KeyLocation::Main if keys::is_dual_location_name(base) => format!("MAIN {}", base),
            _ => base.to_string(),
        }
    }

    /// Check the key by name, optionally pinned to one keyboard block
    ///
    /// `is_key_at("ENTER", Some(KeyLocation::Numpad))` matches only the
    /// keypad Enter; `None` accepts either location.
    pub fn is_key_at(&self, name: &str, location: Option<KeyLocation>) -> bool {
        if self.name() != Some(name) {
            return false;
        }
        location.map_or(true, |location| self.location() == location)
    }

    /// One-line description for diagnostics
    pub fn debug_info(&self) -> String {
        format!(
            "Key: {} | VK: 0x{:X} | Scan: {} | Location: {} | Extended: {} | State: {}",
            self.enhanced_name(),
            self.vk_code,
            self.scan_code,
            self.location(),
            self.is_extended,
            self.state,
        )
    }
}

impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>15} {:>4} [{}] VK:0x{:x}",
            self.name().unwrap_or("UNKNOWN"),
            self.state,
            self.location(),
            self.vk_code,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = KeyEvent::new(KeyState::Down, 0x41, 30, false);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"state":"DOWN","vkCode":65,"scanCode":30,"isExtended":false}"#
        );
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"state":"UP","vkCode":45,"scanCode":82,"isExtended":true}"#;
        let event: KeyEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.state(), KeyState::Up);
        assert_eq!(event.vk_code(), 0x2D);
        assert!(event.is_extended());
    }

    #[test]
    fn test_enhanced_name_distinguishes_insert() {
        let main = KeyEvent::new(KeyState::Down, 0x2D, 82, true);
        let numpad = KeyEvent::new(KeyState::Down, 0x2D, 82, false);
        assert_eq!(main.enhanced_name(), "MAIN INSERT");
        assert_eq!(numpad.enhanced_name(), "NUMPAD INSERT");
    }

    #[test]
    fn test_enhanced_name_keeps_numpad_prefix() {
        let event = KeyEvent::new(KeyState::Down, 0x60, 82, false);
        assert_eq!(event.enhanced_name(), "NUMPAD 0");
    }

    #[test]
    fn test_unknown_key_name() {
        let event = KeyEvent::new(KeyState::Up, 0xFF, 0, false);
        assert_eq!(event.name(), None);
        assert_eq!(event.enhanced_name(), "UNKNOWN");
    }

    #[test]
    fn test_debug_info() {
        let event = KeyEvent::new(KeyState::Down, 0x41, 30, false);
        assert_eq!(
            event.debug_info(),
            "Key: A | VK: 0x41 | Scan: 30 | Location: main | Extended: false | State: DOWN"
        );
    }

    #[test]
    fn test_is_key_at() {
        let numpad_enter = KeyEvent::new(KeyState::Down, 0x0D, 28, false);
        assert!(numpad_enter.is_key_at("ENTER", Some(KeyLocation::Numpad)));
        assert!(numpad_enter.is_key_at("ENTER", None));
        assert!(!numpad_enter.is_key_at("ENTER", Some(KeyLocation::Main)));
        assert!(!numpad_enter.is_key_at("INSERT", None));

        let unknown = KeyEvent::new(KeyState::Down, 0xFF, 0, false);
        assert!(!unknown.is_key_at("UNKNOWN", None));
    }

    #[test]
    fn test_display_pads_state_and_location() {
        let event = KeyEvent::new(KeyState::Down, 0x41, 30, false);
        assert_eq!(event.to_string(), "              A DOWN [main] VK:0x41");
        assert_eq!(format!("[{:<6}]", KeyState::Up), "[UP    ]");
    }

    #[test]
    fn test_display() {
        let event = KeyEvent::new(KeyState::Up, 0x0D, 28, true);
        assert_eq!(event.to_string(), "          ENTER   UP [main] VK:0xd");
    }
}
