//! The message loop that keeps the hook alive, and the handle that stops it.

use crate::error::HookResult;
use crate::sys;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct StopState {
    /// Thread id of the running message loop, 0 when none. Held while
    /// posting so no `WM_QUIT` is sent after the loop detaches.
    thread_id: Mutex<u32>,
    requested: AtomicBool,
}

impl StopState {
    fn thread_id(&self) -> MutexGuard<'_, u32> {
        self.thread_id.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Requests a running message loop to exit.
///
/// Cheap to clone and usable from any thread. A stop requested before the
/// loop starts makes the loop return as soon as it is entered. Once stopped,
/// a handle stays stopped.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopState>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit by posting `WM_QUIT` to its thread.
    pub fn stop(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        let guard = self.inner.thread_id();
        let thread_id = *guard;
        if thread_id != 0 {
            info!(thread_id, "Stop requested, posting WM_QUIT");
            if !sys::post_quit(thread_id) {
                warn!(thread_id, "Failed to post WM_QUIT to hook thread");
            }
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Whether a message loop is currently running for this handle.
    pub fn is_attached(&self) -> bool {
        *self.inner.thread_id() != 0
    }

    fn attach(&self, thread_id: u32) {
        *self.inner.thread_id() = thread_id;
    }

    /// No `WM_QUIT` is posted for this loop after this returns, and any still
    /// queued is removed.
    fn detach(&self) {
        *self.inner.thread_id() = 0;
        sys::discard_quit();
    }
}

/// Block the calling thread pumping messages until `stop` is triggered
/// (`Ok`) or message retrieval fails (`Err(PumpFailed)`).
///
/// The hook procedure runs from inside this loop, so it must be called on the
/// thread that installed the hook.
pub fn run_message_loop(stop: &StopHandle) -> HookResult<()> {
    sys::ensure_message_queue();
    stop.attach(sys::current_thread_id());

    let result = if stop.is_stop_requested() {
        info!("Stop already requested, skipping message loop");
        Ok(())
    } else {
        info!("Starting message loop");
        sys::pump()
    };

    stop.detach();
    result
}
