//! Event filter for raw low-level keyboard events
//!
//! Pure decision logic: maps the hook's message code to a key state and
//! drops the synthetic Shift transitions Windows injects for IME/AltGr input.

use super::keys::{self, flags, messages};
use crate::events::{KeyEvent, KeyState};

/// Owned copy of the data the OS passes to the low-level keyboard hook
///
/// The OS buffer behind the hook's `lParam` is only valid for the duration
/// of the callback, so everything the filter needs is copied in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Window message (`wParam`), e.g. `WM_KEYDOWN`
    pub action: u32,
    pub vk_code: u32,
    pub scan_code: u32,
    /// `KBDLLHOOKSTRUCT::flags`
    pub flags: u32,
}

impl RawKeyEvent {
    pub fn is_injected(&self) -> bool {
        self.flags & flags::LLKHF_INJECTED != 0
    }

    pub fn is_extended(&self) -> bool {
        self.flags & flags::LLKHF_EXTENDED != 0
    }

    /// Shift transition synthesized by the OS rather than typed by the user
    pub fn is_synthetic_shift(&self) -> bool {
        keys::is_shift(self.vk_code)
            && (self.is_injected() || self.scan_code == keys::SYNTHETIC_SHIFT_SCAN_CODE)
    }
}

/// Map a keyboard window message to a key state
pub fn key_state(action: u32) -> Option<KeyState> {
    match action {
        messages::WM_KEYDOWN | messages::WM_SYSKEYDOWN => Some(KeyState::Down),
        messages::WM_KEYUP | messages::WM_SYSKEYUP => Some(KeyState::Up),
        _ => None,
    }
}

/// Decide whether a raw event reaches the consumer
///
/// Returns `None` for unknown message codes and for synthetic Shift events.
pub fn classify(raw: &RawKeyEvent) -> Option<KeyEvent> {
    let state = key_state(raw.action)?;

    if raw.is_synthetic_shift() {
        return None;
    }

    Some(KeyEvent::new(
        state,
        raw.vk_code,
        raw.scan_code,
        raw.is_extended(),
    ))
}
