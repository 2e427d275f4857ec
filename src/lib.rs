//! winkey-hook: system-wide keyboard capture for Windows
//!
//! Installs a low-level keyboard hook and relays every key transition to a
//! host-supplied handler:
//! - The hook lives on a dedicated thread running a Win32 message loop
//! - Synthetic Shift events injected for IME/AltGr input are filtered out
//! - Events cross to the consumer through a non-blocking FIFO queue
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> Result<(), winkey_hook::HookError> {
//! use winkey_hook::{HookController, KeyEvent};
//!
//! let mut hook = HookController::new();
//! hook.start(|event: KeyEvent| -> anyhow::Result<()> {
//!     println!("{}", event.debug_info());
//!     Ok(())
//! })?;
//! // ...
//! hook.stop();
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! Every keystroke in every application is visible to the handler while
//! the hook is installed.

pub mod bridge;
pub mod controller;
pub mod error;
pub mod events;
pub mod hotkey;

pub use bridge::{DeliveryError, ErrorSink, KeyEventHandler};
pub use controller::{HookController, HookOptions};
pub use error::HookError;
pub use events::{KeyEvent, KeyState};
pub use hotkey::{HookBackend, KeyLocation, ThreadIdentity};
#[cfg(windows)]
pub use hotkey::Win32Backend;
