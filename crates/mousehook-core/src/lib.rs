//! mousehook-core: event model, listener registry and raw-event decoder.
//!
//! Design goal: keep this crate platform-agnostic so decoding and dispatch can
//! be tested anywhere. Installing the OS hook and pumping messages lives in
//! `mousehook-platform`.

mod config;
mod dispatch;
mod event;
mod raw;
mod registry;

pub use config::{ConfigError, ConfigResult, HookConfig};
pub use dispatch::{decode, DispatchStats, Dispatcher};
pub use event::{EventKind, MouseButton, MouseEvent};
pub use raw::{codes, MouseHookRecord, RawMouseRecord, POINT};
pub use registry::{CallbackRegistry, Listener};
