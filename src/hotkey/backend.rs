//! OS seam for the hook thread
//!
//! The hook thread drives a `HookBackend` through install, pump and
//! uninstall, all on the same thread. `post_quit` is the only call made
//! from another thread.

use crate::error::HookError;

/// OS identifier of the hook thread, used to direct the quit signal at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadIdentity(u32);

impl ThreadIdentity {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ThreadIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the message pump ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// A thread-directed quit was received
    Quit,
    /// Message retrieval failed
    Failed(String),
}

/// Operations the hook thread needs from the OS
pub trait HookBackend: Send + Sync + 'static {
    /// Active hook registration. Only valid on the thread that created it.
    type Registration;

    /// Identity of the calling thread
    fn current_thread(&self) -> ThreadIdentity;

    /// Register the low-level keyboard hook for the calling thread.
    /// The hook procedure must run `hotkey::capture::process` for each event.
    fn install(&self) -> Result<Self::Registration, HookError>;

    /// Retrieve and dispatch messages until a quit is posted to this thread
    fn pump(&self) -> PumpExit;

    /// Unregister the hook. Called on the installing thread.
    fn uninstall(&self, registration: Self::Registration);

    /// Ask the given thread's message pump to exit
    fn post_quit(&self, thread: ThreadIdentity) -> anyhow::Result<()>;
}
