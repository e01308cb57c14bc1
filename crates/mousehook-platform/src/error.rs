//! Common error types for mousehook-platform.

use thiserror::Error;

/// Errors reported by the hook lifecycle and message loop.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to install mouse hook (os error {code})")]
    InstallFailed { code: u32 },
    #[error("a mouse hook is already installed in this process")]
    AlreadyInstalled,
    #[error("message loop failed (os error {code})")]
    PumpFailed { code: u32 },
    #[error("global mouse hooks are not supported on this platform")]
    Unsupported,
    #[error("failed to spawn hook thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("hook thread panicked")]
    ThreadPanicked,
}

/// Result type for hook operations.
pub type HookResult<T> = Result<T, HookError>;
