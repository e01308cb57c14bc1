//! Listener slots consulted by the dispatcher.
//!
//! Each category (down, up, wheel) holds at most one listener. Registering a
//! second listener into the same slot replaces the first.

use crate::event::{EventKind, MouseEvent};
use std::sync::{Arc, PoisonError, RwLock};

/// A registered listener.
pub type Listener = Arc<dyn Fn(MouseEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct Slot(RwLock<Option<Listener>>);

impl Slot {
    fn set(&self, listener: Option<Listener>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = listener;
    }

    fn get(&self) -> Option<Listener> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Holds the on-down, on-up and on-wheel listeners.
///
/// Listeners are normally registered before the hook starts. Registration
/// while the hook is running is safe; the change is seen from the next event.
#[derive(Default)]
pub struct CallbackRegistry {
    on_down: Slot,
    on_up: Slot,
    on_wheel: Slot,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the button-down listener, replacing any previous one.
    pub fn set_on_down<F>(&self, listener: F)
    where
        F: Fn(MouseEvent) + Send + Sync + 'static,
    {
        self.on_down.set(Some(Arc::new(listener)));
    }

    /// Set the button-up listener, replacing any previous one.
    pub fn set_on_up<F>(&self, listener: F)
    where
        F: Fn(MouseEvent) + Send + Sync + 'static,
    {
        self.on_up.set(Some(Arc::new(listener)));
    }

    /// Set the wheel listener, replacing any previous one.
    pub fn set_on_wheel<F>(&self, listener: F)
    where
        F: Fn(MouseEvent) + Send + Sync + 'static,
    {
        self.on_wheel.set(Some(Arc::new(listener)));
    }

    /// Remove all listeners.
    pub fn clear(&self) {
        self.on_down.set(None);
        self.on_up.set(None);
        self.on_wheel.set(None);
    }

    /// Whether no slot holds a listener.
    pub fn is_empty(&self) -> bool {
        [&self.on_down, &self.on_up, &self.on_wheel]
            .iter()
            .all(|slot| slot.get().is_none())
    }

    /// The listener for a category. The slot lock is released before return,
    /// so callers never run user code while holding it.
    pub(crate) fn listener(&self, kind: EventKind) -> Option<Listener> {
        match kind {
            EventKind::Down => self.on_down.get(),
            EventKind::Up => self.on_up.get(),
            EventKind::Wheel => self.on_wheel.get(),
        }
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("on_down", &self.on_down.get().is_some())
            .field("on_up", &self.on_up.get().is_some())
            .field("on_wheel", &self.on_wheel.get().is_some())
            .finish()
    }
}
