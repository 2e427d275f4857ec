//! System-wide keyboard capture
//!
//! Installs a low-level keyboard hook on a dedicated thread, filters the
//! raw events and hands the survivors to the bridge queue.

mod backend;
pub mod capture;
pub mod filter;
pub mod keys;
mod thread;
#[cfg(windows)]
mod win32;

#[cfg(test)]
pub(crate) use backend::testing;
pub use backend::{HookBackend, PumpExit, ThreadIdentity};
pub use filter::{classify, RawKeyEvent};
pub use keys::KeyLocation;
pub(crate) use thread::HookThread;
#[cfg(windows)]
pub use win32::Win32Backend;
