//! Decoding raw hook records and dispatching them to listeners.
//!
//! The OS calls the hook procedure once per physical mouse event. The
//! procedure hands the stage code, message and record to [`Dispatcher::handle`],
//! which classifies the event, runs the matching listener and then forwards
//! the event down the hook chain. Events are never consumed.

use crate::config::HookConfig;
use crate::event::{EventKind, MouseButton, MouseEvent};
use crate::raw::codes::*;
use crate::raw::RawMouseRecord;
use crate::registry::CallbackRegistry;
use serde::Serialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace, warn};

/// Classify a raw event.
///
/// Returns `None` for messages this hook does not report (moves, horizontal
/// wheel, anything unknown).
pub fn decode(message: u32, record: &RawMouseRecord<'_>) -> Option<(EventKind, MouseEvent)> {
    let mut event = MouseEvent::at(record.x(), record.y());

    let kind = match message {
        WM_LBUTTONDOWN | WM_LBUTTONUP => {
            event.button = MouseButton::Left;
            down_or_up(message == WM_LBUTTONDOWN)
        }
        WM_RBUTTONDOWN | WM_RBUTTONUP => {
            event.button = MouseButton::Right;
            down_or_up(message == WM_RBUTTONDOWN)
        }
        WM_MBUTTONDOWN | WM_MBUTTONUP => {
            event.button = MouseButton::Middle;
            down_or_up(message == WM_MBUTTONDOWN)
        }
        WM_XBUTTONDOWN | WM_XBUTTONUP => {
            // Neither bit set leaves the button as Unknown; the event is still reported.
            let xbutton = record.high_word();
            if xbutton & XBUTTON1 != 0 {
                event.button = MouseButton::ExtendedButton1;
            } else if xbutton & XBUTTON2 != 0 {
                event.button = MouseButton::ExtendedButton2;
            }
            down_or_up(message == WM_XBUTTONDOWN)
        }
        WM_MOUSEWHEEL => {
            event.button = MouseButton::Wheel;
            event.delta = record.wheel_delta();
            EventKind::Wheel
        }
        _ => return None,
    };

    Some((kind, event))
}

fn down_or_up(is_down: bool) -> EventKind {
    if is_down {
        EventKind::Down
    } else {
        EventKind::Up
    }
}

/// Counters describing what the dispatcher has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Records received at the `HC_ACTION` stage.
    pub events_seen: u64,
    /// Events handed to a listener that returned normally.
    pub events_delivered: u64,
    /// Records with a message the decoder does not report.
    pub events_ignored: u64,
    /// Listener calls that panicked.
    pub listener_panics: u64,
    /// Listener calls slower than the configured threshold.
    pub slow_listeners: u64,
}

#[derive(Debug, Default)]
struct Counters {
    seen: AtomicU64,
    delivered: AtomicU64,
    ignored: AtomicU64,
    panics: AtomicU64,
    slow: AtomicU64,
}

/// Routes decoded events to the listeners of a [`CallbackRegistry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CallbackRegistry>,
    counters: Arc<Counters>,
    trace_events: bool,
    slow_threshold: Option<Duration>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CallbackRegistry>, config: &HookConfig) -> Self {
        let slow_threshold = (config.slow_listener_warn_ms > 0)
            .then(|| Duration::from_millis(config.slow_listener_warn_ms));
        Self {
            registry,
            counters: Arc::new(Counters::default()),
            trace_events: config.trace_events,
            slow_threshold,
        }
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Snapshot of the counters. Clones share the same counters.
    pub fn stats(&self) -> DispatchStats {
        let c = &self.counters;
        DispatchStats {
            events_seen: c.seen.load(Ordering::Relaxed),
            events_delivered: c.delivered.load(Ordering::Relaxed),
            events_ignored: c.ignored.load(Ordering::Relaxed),
            listener_panics: c.panics.load(Ordering::Relaxed),
            slow_listeners: c.slow.load(Ordering::Relaxed),
        }
    }

    /// Entry point for the hook procedure.
    ///
    /// Records are only processed at the `HC_ACTION` stage. `forward` passes
    /// the event to the next hook and is called exactly once, after any
    /// listener; its result is returned unchanged.
    pub fn handle<F>(
        &self,
        n_code: i32,
        message: u32,
        record: Option<RawMouseRecord<'_>>,
        forward: F,
    ) -> isize
    where
        F: FnOnce() -> isize,
    {
        if n_code == HC_ACTION {
            if let Some(record) = record {
                self.dispatch(message, &record);
            }
        }
        forward()
    }

    /// Decode one record and run the matching listener, if any.
    ///
    /// Returns the decoded event, or `None` if the message was ignored.
    /// Listener panics are caught and logged here.
    pub fn dispatch(&self, message: u32, record: &RawMouseRecord<'_>) -> Option<MouseEvent> {
        self.counters.seen.fetch_add(1, Ordering::Relaxed);

        let Some((kind, event)) = decode(message, record) else {
            self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if self.trace_events {
            trace!(?kind, button = %event.button, x = event.x, y = event.y, delta = event.delta, "Mouse event");
        }

        if let Some(listener) = self.registry.listener(kind) {
            let started = Instant::now();
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => {
                    self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(payload) => {
                    self.counters.panics.fetch_add(1, Ordering::Relaxed);
                    error!(?kind, panic = %panic_message(&*payload), "Mouse listener panicked");
                }
            }

            let elapsed = started.elapsed();
            if self.slow_threshold.is_some_and(|limit| elapsed > limit) {
                self.counters.slow.fetch_add(1, Ordering::Relaxed);
                warn!(?kind, ?elapsed, "Slow mouse listener delays system-wide input");
            }
        }

        Some(event)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::MouseHookRecord;
    use std::sync::Mutex;

    fn record_event(message: u32, record: MouseHookRecord) -> Option<(EventKind, MouseEvent)> {
        decode(message, &RawMouseRecord::new(&record))
    }

    fn packed(high: u16) -> u32 {
        (high as u32) << 16
    }

    /// Dispatcher whose three slots append to a shared log.
    fn recording_dispatcher() -> (Dispatcher, Arc<Mutex<Vec<(EventKind, MouseEvent)>>>) {
        let log: Arc<Mutex<Vec<(EventKind, MouseEvent)>>> = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(CallbackRegistry::new());
        for kind in [EventKind::Down, EventKind::Up, EventKind::Wheel] {
            let log = log.clone();
            let listener = move |event: MouseEvent| log.lock().unwrap().push((kind, event));
            match kind {
                EventKind::Down => registry.set_on_down(listener),
                EventKind::Up => registry.set_on_up(listener),
                EventKind::Wheel => registry.set_on_wheel(listener),
            }
        }
        (Dispatcher::new(registry, &HookConfig::default()), log)
    }

    #[test]
    fn test_button_down_mapping() {
        let cases = [
            (WM_LBUTTONDOWN, MouseButton::Left),
            (WM_RBUTTONDOWN, MouseButton::Right),
            (WM_MBUTTONDOWN, MouseButton::Middle),
        ];
        for (message, button) in cases {
            let record = MouseHookRecord::new(10, 20, packed(0x7777));
            let (kind, event) = record_event(message, record).unwrap();
            assert_eq!(kind, EventKind::Down);
            assert_eq!(event.button, button);
            assert_eq!(event.delta, 0);
        }
    }

    #[test]
    fn test_button_up_mapping() {
        let cases = [
            (WM_LBUTTONUP, MouseButton::Left),
            (WM_RBUTTONUP, MouseButton::Right),
            (WM_MBUTTONUP, MouseButton::Middle),
        ];
        for (message, button) in cases {
            let (kind, event) = record_event(message, MouseHookRecord::new(1, 2, 0)).unwrap();
            assert_eq!(kind, EventKind::Up);
            assert_eq!(event.button, button);
            assert_eq!(event.delta, 0);
        }
    }

    #[test]
    fn test_xbutton1() {
        let (kind, event) =
            record_event(WM_XBUTTONDOWN, MouseHookRecord::new(100, 200, packed(XBUTTON1))).unwrap();
        assert_eq!(kind, EventKind::Down);
        assert_eq!(
            event,
            MouseEvent {
                button: MouseButton::ExtendedButton1,
                x: 100,
                y: 200,
                delta: 0
            }
        );
    }

    #[test]
    fn test_xbutton2() {
        let (kind, event) =
            record_event(WM_XBUTTONUP, MouseHookRecord::new(3, 4, packed(XBUTTON2))).unwrap();
        assert_eq!(kind, EventKind::Up);
        assert_eq!(event.button, MouseButton::ExtendedButton2);
        assert_eq!(event.delta, 0);
    }

    #[test]
    fn test_xbutton_without_known_bit_stays_unknown() {
        let (kind, event) =
            record_event(WM_XBUTTONDOWN, MouseHookRecord::new(-5, 9, packed(0x0004))).unwrap();
        assert_eq!(kind, EventKind::Down);
        assert_eq!(event.button, MouseButton::Unknown);
        assert_eq!((event.x, event.y), (-5, 9));
    }

    #[test]
    fn test_wheel_delta() {
        let (kind, event) =
            record_event(WM_MOUSEWHEEL, MouseHookRecord::new(5, 5, 0xFF88_0000)).unwrap();
        assert_eq!(kind, EventKind::Wheel);
        assert_eq!(
            event,
            MouseEvent {
                button: MouseButton::Wheel,
                x: 5,
                y: 5,
                delta: -120
            }
        );
    }

    #[test]
    fn test_wheel_delta_roundtrip() {
        for delta in [120i16, -120, 480, -960, 7, i16::MIN, i16::MAX] {
            let record = MouseHookRecord::new(0, 0, packed(delta as u16));
            let (_, event) = record_event(WM_MOUSEWHEEL, record).unwrap();
            assert_eq!(event.delta, delta);
        }
    }

    #[test]
    fn test_coordinates_pass_through() {
        for message in [WM_LBUTTONDOWN, WM_RBUTTONUP, WM_XBUTTONDOWN, WM_MOUSEWHEEL] {
            let record = MouseHookRecord::new(-1920, 2159, packed(XBUTTON1));
            let (_, event) = record_event(message, record).unwrap();
            assert_eq!((event.x, event.y), (-1920, 2159));
        }
    }

    #[test]
    fn test_unrecognized_messages_ignored() {
        for message in [WM_MOUSEMOVE, WM_MOUSEHWHEEL, 0x0000, 0xFFFF] {
            assert!(record_event(message, MouseHookRecord::new(1, 1, 0)).is_none());
        }
    }

    #[test]
    fn test_extended_down_invokes_listener_once() {
        let (dispatcher, log) = recording_dispatcher();
        let record = MouseHookRecord::new(100, 200, 0x0001_0000);
        let mut forwarded = 0;

        let result = dispatcher.handle(
            HC_ACTION,
            WM_XBUTTONDOWN,
            Some(RawMouseRecord::new(&record)),
            || {
                forwarded += 1;
                42
            },
        );

        assert_eq!(result, 42);
        assert_eq!(forwarded, 1);
        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![(
                EventKind::Down,
                MouseEvent {
                    button: MouseButton::ExtendedButton1,
                    x: 100,
                    y: 200,
                    delta: 0
                }
            )]
        );
    }

    #[test]
    fn test_unrecognized_message_still_forwarded() {
        let (dispatcher, log) = recording_dispatcher();
        let record = MouseHookRecord::new(0, 0, 0);
        let mut forwarded = false;

        dispatcher.handle(HC_ACTION, WM_MOUSEMOVE, Some(RawMouseRecord::new(&record)), || {
            forwarded = true;
            0
        });

        assert!(forwarded);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(dispatcher.stats().events_ignored, 1);
    }

    #[test]
    fn test_non_action_stage_skips_decoding() {
        let (dispatcher, log) = recording_dispatcher();
        let record = MouseHookRecord::new(0, 0, 0);
        let mut forwarded = false;

        dispatcher.handle(-1, WM_LBUTTONDOWN, Some(RawMouseRecord::new(&record)), || {
            forwarded = true;
            0
        });
        dispatcher.handle(HC_ACTION, WM_LBUTTONDOWN, None, || 0);

        assert!(forwarded);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(dispatcher.stats().events_seen, 0);
    }

    #[test]
    fn test_missing_listener_drops_event() {
        let dispatcher = Dispatcher::new(Arc::new(CallbackRegistry::new()), &HookConfig::default());
        let record = MouseHookRecord::new(8, 9, 0);

        let event = dispatcher.dispatch(WM_LBUTTONUP, &RawMouseRecord::new(&record));

        assert_eq!(event.map(|e| e.button), Some(MouseButton::Left));
        let stats = dispatcher.stats();
        assert_eq!(stats.events_seen, 1);
        assert_eq!(stats.events_delivered, 0);
    }

    #[test]
    fn test_replaced_listener_not_called() {
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let registry = Arc::new(CallbackRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone(), &HookConfig::default());
        let record = MouseHookRecord::new(0, 0, 0);

        let count = first.clone();
        registry.set_on_up(move |_| *count.lock().unwrap() += 1);
        dispatcher.dispatch(WM_LBUTTONUP, &RawMouseRecord::new(&record));

        let count = second.clone();
        registry.set_on_up(move |_| *count.lock().unwrap() += 1);
        dispatcher.dispatch(WM_LBUTTONUP, &RawMouseRecord::new(&record));
        dispatcher.dispatch(WM_RBUTTONUP, &RawMouseRecord::new(&record));

        assert_eq!(*first.lock().unwrap(), 1);
        assert_eq!(*second.lock().unwrap(), 2);
    }

    #[test]
    fn test_listener_panic_is_contained() {
        let registry = Arc::new(CallbackRegistry::new());
        registry.set_on_wheel(|_| panic!("listener failure"));
        let dispatcher = Dispatcher::new(registry, &HookConfig::default());
        let record = MouseHookRecord::new(0, 0, 0x0078_0000);
        let mut forwarded = false;

        dispatcher.handle(HC_ACTION, WM_MOUSEWHEEL, Some(RawMouseRecord::new(&record)), || {
            forwarded = true;
            0
        });

        assert!(forwarded);
        let stats = dispatcher.stats();
        assert_eq!(stats.listener_panics, 1);
        assert_eq!(stats.events_delivered, 0);
    }

    #[test]
    fn test_slow_listener_counted() {
        let registry = Arc::new(CallbackRegistry::new());
        registry.set_on_down(|_| std::thread::sleep(Duration::from_millis(20)));
        let config = HookConfig {
            slow_listener_warn_ms: 1,
            ..HookConfig::default()
        };
        let dispatcher = Dispatcher::new(registry, &config);
        let record = MouseHookRecord::new(0, 0, 0);

        dispatcher.dispatch(WM_MBUTTONDOWN, &RawMouseRecord::new(&record));

        assert_eq!(dispatcher.stats().slow_listeners, 1);
        assert_eq!(dispatcher.stats().events_delivered, 1);
    }

    #[test]
    fn test_listener_may_reregister() {
        let registry = Arc::new(CallbackRegistry::new());
        let inner = registry.clone();
        registry.set_on_down(move |_| inner.set_on_down(|_| {}));
        let dispatcher = Dispatcher::new(registry, &HookConfig::default());
        let record = MouseHookRecord::new(0, 0, 0);

        dispatcher.dispatch(WM_LBUTTONDOWN, &RawMouseRecord::new(&record));
        dispatcher.dispatch(WM_LBUTTONDOWN, &RawMouseRecord::new(&record));

        assert_eq!(dispatcher.stats().events_delivered, 2);
    }
}
