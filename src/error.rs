//! Errors reported by the hook controller

/// Errors that can occur while starting the keyboard hook
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("keyboard hook is already running")]
    AlreadyRunning,

    #[error("failed to install keyboard hook: {0}")]
    HookInstallFailed(String),

    #[error("failed to spawn thread: {0}")]
    ThreadSpawn(String),
}
