//! Lifecycle of the OS hook registration.

use crate::error::HookResult;
use crate::sys;
use mousehook_core::Dispatcher;
use std::marker::PhantomData;
use tracing::{info, warn};

/// Opaque identifier of a live hook registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookHandle(isize);

impl HookHandle {
    /// The raw `HHOOK` value.
    pub fn as_raw(&self) -> isize {
        self.0
    }
}

/// Installs and releases the process-wide low-level mouse hook.
///
/// The hook is bound to the thread that installed it: events are delivered
/// from that thread's message loop, so the controller is not `Send`.
/// Dropping the controller releases the hook.
#[derive(Debug, Default)]
pub struct HookController {
    handle: Option<HookHandle>,
    _not_send: PhantomData<*const ()>,
}

impl HookController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the hook on the calling thread with `dispatcher` handling events.
    ///
    /// Fails with `AlreadyInstalled` if this process already has an active hook.
    pub fn install(&mut self, dispatcher: Dispatcher) -> HookResult<HookHandle> {
        if self.handle.is_some() {
            return Err(crate::HookError::AlreadyInstalled);
        }

        let handle = HookHandle(sys::install(dispatcher)?);
        self.handle = Some(handle);
        info!("Mouse hook installed");
        Ok(handle)
    }

    /// Unregister the hook. Safe to call when nothing is installed.
    ///
    /// An OS failure is logged and the handle is kept, so a later call (or
    /// `Drop`) tries again.
    pub fn release(&mut self) {
        self.release_with(sys::uninstall);
    }

    fn release_with<F>(&mut self, uninstall: F)
    where
        F: FnOnce(isize) -> Result<(), u32>,
    {
        let Some(handle) = self.handle else {
            return;
        };

        match uninstall(handle.as_raw()) {
            Ok(()) => {
                self.handle = None;
                info!("Mouse hook released");
            }
            Err(code) => warn!(code, "Failed to release mouse hook"),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<HookHandle> {
        self.handle
    }
}

impl Drop for HookController {
    fn drop(&mut self) {
        self.release();
    }
}
