//! OS bindings for the low-level mouse hook.
//!
//! Platform implementations:
//! - Windows: `WH_MOUSE_LL` via `SetWindowsHookExW` (`windows.rs`)
//! - Everything else: reports `HookError::Unsupported`

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::{
    current_thread_id, discard_quit, ensure_message_queue, install, post_quit, pump, uninstall,
};

#[cfg(not(windows))]
mod fallback {
    use crate::error::{HookError, HookResult};
    use mousehook_core::Dispatcher;

    pub fn install(_dispatcher: Dispatcher) -> HookResult<isize> {
        Err(HookError::Unsupported)
    }

    pub fn uninstall(_hook: isize) -> Result<(), u32> {
        Ok(())
    }

    pub fn ensure_message_queue() {}

    pub fn discard_quit() {}

    pub fn pump() -> HookResult<()> {
        Err(HookError::Unsupported)
    }

    pub fn current_thread_id() -> u32 {
        0
    }

    pub fn post_quit(_thread_id: u32) -> bool {
        false
    }
}

#[cfg(not(windows))]
pub use fallback::{
    current_thread_id, discard_quit, ensure_message_queue, install, post_quit, pump, uninstall,
};
