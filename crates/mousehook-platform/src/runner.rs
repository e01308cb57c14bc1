//! Blocking and background entry points tying the controller, dispatcher
//! and message loop together.

use crate::controller::HookController;
use crate::error::{HookError, HookResult};
use crate::pump::{run_message_loop, StopHandle};
use crossbeam_channel::{bounded, Sender};
use mousehook_core::{CallbackRegistry, DispatchStats, Dispatcher, HookConfig, MouseEvent};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// A global mouse hook with its own listeners and configuration.
///
/// Listeners run synchronously on the hook thread inside the system-wide
/// input chain. A slow listener delays mouse input for every application, so
/// listeners should hand work off rather than do it inline.
pub struct MouseHook {
    registry: Arc<CallbackRegistry>,
    config: HookConfig,
    stop: StopHandle,
}

impl Default for MouseHook {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseHook {
    pub fn new() -> Self {
        Self::with_config(HookConfig::default())
    }

    pub fn with_config(config: HookConfig) -> Self {
        Self::with_registry(Arc::new(CallbackRegistry::new()), config)
    }

    /// Use an existing registry, e.g. one shared with other code.
    pub fn with_registry(registry: Arc<CallbackRegistry>, config: HookConfig) -> Self {
        Self {
            registry,
            config,
            stop: StopHandle::new(),
        }
    }

    /// Set the button-down listener, replacing any previous one.
    pub fn on_down<F>(&self, listener: F) -> &Self
    where
        F: Fn(MouseEvent) + Send + Sync + 'static,
    {
        self.registry.set_on_down(listener);
        self
    }

    /// Set the button-up listener, replacing any previous one.
    pub fn on_up<F>(&self, listener: F) -> &Self
    where
        F: Fn(MouseEvent) + Send + Sync + 'static,
    {
        self.registry.set_on_up(listener);
        self
    }

    /// Set the wheel listener, replacing any previous one.
    pub fn on_wheel<F>(&self, listener: F) -> &Self
    where
        F: Fn(MouseEvent) + Send + Sync + 'static,
    {
        self.registry.set_on_wheel(listener);
        self
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Handle that makes [`MouseHook::run`] return from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Install the hook and pump messages on the calling thread.
    ///
    /// Blocks until a stop is requested or the message loop fails. The hook is
    /// released before returning in both cases.
    pub fn run(self) -> HookResult<DispatchStats> {
        self.run_inner(None)
    }

    /// Run the hook on a dedicated thread.
    ///
    /// Returns once the hook is installed, or with the install error.
    pub fn spawn(self) -> HookResult<MouseHookHandle> {
        let (ready_tx, ready_rx) = bounded(1);
        let stop = self.stop.clone();

        let thread = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || self.run_inner(Some(ready_tx)))?;

        match ready_rx.recv() {
            Ok(()) => Ok(MouseHookHandle {
                stop,
                thread: Some(thread),
            }),
            // Sender dropped without signalling: install failed or the thread died.
            Err(_) => match thread.join() {
                Ok(result) => result.and(Err(HookError::ThreadPanicked)),
                Err(_) => Err(HookError::ThreadPanicked),
            },
        }
    }

    fn run_inner(self, ready: Option<Sender<()>>) -> HookResult<DispatchStats> {
        let dispatcher = Dispatcher::new(self.registry.clone(), &self.config);
        let mut controller = HookController::new();
        controller.install(dispatcher.clone())?;

        if let Some(ready) = ready {
            let _ = ready.send(());
        }

        let result = run_message_loop(&self.stop);
        controller.release();

        let stats = dispatcher.stats();
        match &result {
            Ok(()) => info!(?stats, "Mouse hook stopped"),
            Err(e) => error!(error = %e, ?stats, "Mouse hook message loop failed"),
        }
        result.map(|()| stats)
    }
}

/// Handle to a hook running on its own thread.
///
/// Dropping the handle stops the hook without waiting for the thread.
pub struct MouseHookHandle {
    stop: StopHandle,
    thread: Option<JoinHandle<HookResult<DispatchStats>>>,
}

impl MouseHookHandle {
    /// Signal the hook to stop.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Check if the hook thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait for the hook thread to finish and return its result.
    pub fn join(mut self) -> HookResult<DispatchStats> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| HookError::ThreadPanicked)?,
            None => Ok(DispatchStats::default()),
        }
    }

    /// Stop the hook and wait for its thread.
    pub fn stop_and_join(self) -> HookResult<DispatchStats> {
        self.stop();
        self.join()
    }
}

impl Drop for MouseHookHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}

fn default_registry() -> &'static Arc<CallbackRegistry> {
    static REGISTRY: OnceLock<Arc<CallbackRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Arc::new(CallbackRegistry::new()))
}

fn default_stop() -> &'static StopHandle {
    static STOP: OnceLock<StopHandle> = OnceLock::new();
    STOP.get_or_init(StopHandle::new)
}

/// Set the process-wide button-down listener used by [`start`].
///
/// Replaces any previous listener. The listener runs on the hook thread
/// inside the system input chain and must return quickly.
pub fn set_mouse_down_callback<F>(listener: F)
where
    F: Fn(MouseEvent) + Send + Sync + 'static,
{
    default_registry().set_on_down(listener);
}

/// Set the process-wide button-up listener used by [`start`].
pub fn set_mouse_up_callback<F>(listener: F)
where
    F: Fn(MouseEvent) + Send + Sync + 'static,
{
    default_registry().set_on_up(listener);
}

/// Set the process-wide wheel listener used by [`start`].
pub fn set_mouse_wheel_callback<F>(listener: F)
where
    F: Fn(MouseEvent) + Send + Sync + 'static,
{
    default_registry().set_on_wheel(listener);
}

/// Install the hook with the process-wide listeners and pump messages on the
/// calling thread.
///
/// Blocks until [`stop`] is called from another thread (`Ok`) or the message
/// loop fails; the hook is released before this returns.
pub fn start() -> HookResult<()> {
    let hook = MouseHook {
        registry: default_registry().clone(),
        config: HookConfig::default(),
        stop: default_stop().clone(),
    };
    hook.run().map(|_| ())
}

/// Make a running [`start`] return. A stop issued before [`start`] makes it
/// return immediately, and the process-wide hook cannot be started again.
pub fn stop() {
    default_stop().stop();
}
