//! mousehook-platform: the OS side of mousehook.
//!
//! This crate provides:
//! - Installing and releasing the process-wide `WH_MOUSE_LL` hook
//! - The message loop that keeps the hook alive, with a cooperative stop handle
//! - Blocking (`start`, `MouseHook::run`) and background (`MouseHook::spawn`) entry points
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `controller` - Hook install/release
//! - `pump` - Message loop and `StopHandle`
//! - `runner` - `MouseHook` and the process-wide listener functions
//! - `sys` - Platform bindings (Windows native, fallback elsewhere)

mod controller;
mod error;
mod pump;
mod runner;
mod sys;

// Re-export error types
pub use error::{HookError, HookResult};

// Re-export hook lifecycle
pub use controller::{HookController, HookHandle};
pub use pump::{run_message_loop, StopHandle};
pub use runner::{
    set_mouse_down_callback, set_mouse_up_callback, set_mouse_wheel_callback, start, stop,
    MouseHook, MouseHookHandle,
};

// Re-export the event model so most users only depend on this crate
pub use mousehook_core::{
    CallbackRegistry, DispatchStats, Dispatcher, EventKind, HookConfig, MouseButton, MouseEvent,
};
