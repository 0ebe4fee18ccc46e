use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, trace};

use crate::{ListenerError, Payload};

type Listener = Arc<dyn Fn(&Payload) -> Result<(), ListenerError> + Send + Sync>;
type AnyListener = Arc<dyn Fn(&str, &Payload) -> Result<(), ListenerError> + Send + Sync>;

/// Handle returned by [`EventEmitter::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    named: HashMap<String, Vec<(ListenerId, Listener)>>,
    any: Vec<(ListenerId, AnyListener)>,
}

impl Registry {
    fn allocate(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }
}

/// In-process publish/subscribe for provider callbacks.
///
/// Dispatch is synchronous and in registration order. Listener errors and panics
/// are logged and swallowed so one failing subscriber cannot affect the others or
/// the HTTP response. Clones share the same listener table.
#[derive(Clone, Default)]
pub struct EventEmitter {
    registry: Arc<RwLock<Registry>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event name.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Payload) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let mut registry = self.write();
        let id = registry.allocate();
        registry
            .named
            .entry(event.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Register a listener that receives every emitted event.
    pub fn on_any<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str, &Payload) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let mut registry = self.write();
        let id = registry.allocate();
        registry.any.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.write();

        if let Some(pos) = registry.any.iter().position(|(l, _)| *l == id) {
            registry.any.remove(pos);
            return true;
        }

        let mut removed = false;
        registry.named.retain(|_, listeners| {
            if let Some(pos) = listeners.iter().position(|(l, _)| *l == id) {
                listeners.remove(pos);
                removed = true;
            }
            !listeners.is_empty()
        });
        removed
    }

    /// Number of listeners that would receive `event`, catch-all listeners included.
    pub fn listener_count(&self, event: &str) -> usize {
        let registry = self.read();
        registry.named.get(event).map_or(0, Vec::len) + registry.any.len()
    }

    /// Publish `payload` under `event` and return how many listeners were invoked.
    pub fn emit(&self, event: &str, payload: &Payload) -> usize {
        // Snapshot so listeners may (un)register without deadlocking.
        let (named, any) = {
            let registry = self.read();
            let named: Vec<Listener> = registry
                .named
                .get(event)
                .map(|ls| ls.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default();
            let any: Vec<AnyListener> = registry.any.iter().map(|(_, l)| Arc::clone(l)).collect();
            (named, any)
        };

        for listener in &named {
            report(event, catch_unwind(AssertUnwindSafe(|| listener(payload))));
        }
        for listener in &any {
            report(event, catch_unwind(AssertUnwindSafe(|| listener(event, payload))));
        }

        let invoked = named.len() + any.len();
        trace!(event = %event, listeners = invoked, "event emitted");
        invoked
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn report(event: &str, outcome: std::thread::Result<Result<(), ListenerError>>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(event = %event, error = %e, "event listener failed"),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(event = %event, panic = %message, "event listener panicked");
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.read();
        f.debug_struct("EventEmitter")
            .field("events", &registry.named.keys().collect::<Vec<_>>())
            .field("catch_all", &registry.any.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn payload() -> Payload {
        Payload::from([("event", "failed"), ("id", "abc")])
    }

    #[test]
    fn emit_without_listeners_is_noop() {
        let events = EventEmitter::new();
        assert_eq!(events.emit("failed", &payload()), 0);
    }

    #[test]
    fn listeners_receive_full_payload_in_order() {
        let events = EventEmitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            events.on("failed", move |p: &Payload| {
                seen.lock().unwrap().push((tag, p.clone()));
                Ok(())
            });
        }

        assert_eq!(events.emit("failed", &payload()), 2);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
        assert_eq!(seen[0].1, payload());
    }

    #[test]
    fn listeners_only_fire_for_their_event() {
        let events = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        events.on("sent", move |_: &Payload| {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        events.emit("failed", &payload());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_and_panicking_listeners_do_not_stop_dispatch() {
        let events = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        events.on("failed", |_: &Payload| Err("listener exploded".into()));
        events.on("failed", |_: &Payload| panic!("listener panicked"));
        let h = Arc::clone(&hits);
        events.on("failed", move |_: &Payload| {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(events.emit("failed", &payload()), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn catch_all_sees_every_event() {
        let events = EventEmitter::new();
        let names = Arc::new(Mutex::new(Vec::new()));
        let n = Arc::clone(&names);
        events.on_any(move |event: &str, _: &Payload| {
            n.lock().unwrap().push(event.to_string());
            Ok(())
        });

        events.emit("sent", &payload());
        events.emit("delivered", &payload());
        assert_eq!(*names.lock().unwrap(), vec!["sent", "delivered"]);
        assert_eq!(events.listener_count("anything"), 1);
    }

    #[test]
    fn off_removes_listener() {
        let events = EventEmitter::new();
        let id = events.on("sent", |_: &Payload| Ok(()));
        let any = events.on_any(|_: &str, _: &Payload| Ok(()));
        assert_eq!(events.listener_count("sent"), 2);

        assert!(events.off(id));
        assert!(events.off(any));
        assert!(!events.off(id));
        assert_eq!(events.listener_count("sent"), 0);
        assert_eq!(events.emit("sent", &payload()), 0);
    }

    #[test]
    fn listener_may_register_during_dispatch() {
        let events = EventEmitter::new();
        let inner = events.clone();
        events.on("sent", move |_: &Payload| {
            inner.on("delivered", |_: &Payload| Ok(()));
            Ok(())
        });

        assert_eq!(events.emit("sent", &payload()), 1);
        assert_eq!(events.listener_count("delivered"), 1);
    }
}
