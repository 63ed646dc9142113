//! Store registry implementation.
//!
//! The registry is single-threaded (`Rc`/`RefCell`) and is constructed once
//! per session, then passed by reference to whatever needs state.
//!
//! ## Notification order
//!
//! ```text
//! save(a) -> [sub1(a), sub2(a)]
//!              sub1 calls save(b)  -> queued
//!            -> [sub1(b), sub2(b)]
//! ```
//!
//! A save issued from inside a callback is queued and delivered once the
//! current pass finishes, so call depth stays bounded and every subscriber
//! sees values in save order.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::backend::{MemoryBackend, StoreBackend};

/// Anything that can live in a store.
pub trait StoreValue: Serialize + DeserializeOwned + Default + 'static {}

impl<T> StoreValue for T where T: Serialize + DeserializeOwned + Default + 'static {}

/// Typed name of a store.
pub struct StoreKey<T> {
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> StoreKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for StoreKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StoreKey<T> {}

impl<T> fmt::Debug for StoreKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreKey").field(&self.name).finish()
    }
}

/// A published value change, as seen by subscribers.
#[derive(Clone)]
pub struct StoreChange {
    name: &'static str,
    revision: u64,
    value: Rc<dyn Any>,
}

impl StoreChange {
    /// Name of the store that changed.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Registry-wide sequence number of this save. Strictly increasing.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is<T>(&self, key: &StoreKey<T>) -> bool {
        self.name == key.name()
    }

    /// The saved value, if this change belongs to `key`.
    pub fn value<T: 'static>(&self, key: &StoreKey<T>) -> Option<Rc<T>> {
        if !self.is(key) {
            return None;
        }
        Rc::clone(&self.value).downcast::<T>().ok()
    }
}

impl fmt::Debug for StoreChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreChange")
            .field("name", &self.name)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

type Callback = Rc<dyn Fn(&StoreRegistry, &StoreChange)>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

struct Inner {
    namespace: String,
    backend: RefCell<Box<dyn StoreBackend>>,
    values: RefCell<HashMap<&'static str, Rc<dyn Any>>>,
    subscribers: RefCell<Vec<Subscriber>>,
    pending: RefCell<VecDeque<StoreChange>>,
    notifying: Cell<bool>,
    next_subscriber_id: Cell<u64>,
    revision: Cell<u64>,
}

/// Owner of every store in a session.
///
/// Cloning is cheap and yields another handle to the same registry.
#[derive(Clone)]
pub struct StoreRegistry {
    inner: Rc<Inner>,
}

impl StoreRegistry {
    /// Create a registry persisting through `backend`, with durable keys
    /// prefixed by `namespace`.
    pub fn new(backend: impl StoreBackend + 'static, namespace: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                namespace: namespace.into(),
                backend: RefCell::new(Box::new(backend)),
                values: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
                next_subscriber_id: Cell::new(0),
                revision: Cell::new(0),
            }),
        }
    }

    /// Registry backed by a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), "homeboard")
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Durable key a store is persisted under.
    pub fn durable_key(&self, name: &str) -> String {
        format!("{}.{}", self.inner.namespace, name)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current value of a store.
    ///
    /// The first read of a store loads it from the backend. Missing or
    /// undecodable records yield `T::default()`.
    pub fn get<T: StoreValue>(&self, key: &StoreKey<T>) -> Rc<T> {
        if let Some(value) = self.inner.values.borrow().get(key.name()) {
            return match Rc::clone(value).downcast::<T>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(store = key.name(), "store holds a value of another type; using default");
                    Rc::new(T::default())
                }
            };
        }

        let loaded = Rc::new(self.load(key));
        self.inner
            .values
            .borrow_mut()
            .insert(key.name(), Rc::clone(&loaded) as Rc<dyn Any>);
        loaded
    }

    fn load<T: StoreValue>(&self, key: &StoreKey<T>) -> T {
        let durable_key = self.durable_key(key.name());
        let raw = self.inner.backend.borrow().read(&durable_key);
        match raw {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    warn!(store = key.name(), error = %e, "discarding undecodable store record");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                warn!(store = key.name(), error = %e, "store load failed; using default");
                T::default()
            }
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace a store's value and notify subscribers.
    pub fn save<T: StoreValue>(&self, key: &StoreKey<T>, value: T) {
        let value = Rc::new(value);
        self.persist(key.name(), value.as_ref());
        self.inner
            .values
            .borrow_mut()
            .insert(key.name(), Rc::clone(&value) as Rc<dyn Any>);

        let revision = self.inner.revision.get() + 1;
        self.inner.revision.set(revision);
        debug!(store = key.name(), revision, "store value replaced");

        self.inner.pending.borrow_mut().push_back(StoreChange {
            name: key.name(),
            revision,
            value,
        });
        self.drain();
    }

    /// Build a new value from the current one and save it.
    pub fn update<T, F>(&self, key: &StoreKey<T>, f: F)
    where
        T: StoreValue,
        F: FnOnce(&T) -> T,
    {
        let current = self.get(key);
        self.save(key, f(&current));
    }

    fn persist<T: Serialize>(&self, name: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(
                    store = name,
                    error = %e,
                    "store value not serializable; kept in memory only"
                );
                return;
            }
        };
        let durable_key = self.durable_key(name);
        if let Err(e) = self.inner.backend.borrow_mut().write(&durable_key, &json) {
            warn!(store = name, error = %e, "store persist failed; kept in memory only");
        }
    }

    fn drain(&self) {
        if self.inner.notifying.replace(true) {
            return;
        }
        let _guard = NotifyingGuard(&self.inner.notifying);

        loop {
            // Release the queue borrow before running callbacks; they may save.
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };
            let callbacks: Vec<Callback> = self
                .inner
                .subscribers
                .borrow()
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect();
            for callback in callbacks {
                callback(self, &change);
            }
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register a callback invoked after every save to any store.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&StoreRegistry, &StoreChange) + 'static,
    {
        let id = self.inner.next_subscriber_id.get();
        self.inner.next_subscriber_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            callback: Rc::new(callback),
        });
        SubscriptionHandle {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Register a callback for one store only.
    pub fn subscribe_to<T, F>(&self, key: StoreKey<T>, callback: F) -> SubscriptionHandle
    where
        T: StoreValue,
        F: Fn(&StoreRegistry, Rc<T>) + 'static,
    {
        self.subscribe(move |registry, change| {
            if let Some(value) = change.value(&key) {
                callback(registry, value);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("namespace", &self.inner.namespace)
            .field("stores", &self.inner.values.borrow().len())
            .field("subscribers", &self.subscriber_count())
            .field("revision", &self.inner.revision.get())
            .finish()
    }
}

struct NotifyingGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Handle returned by [`StoreRegistry::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
    registry: Weak<Inner>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.subscribers.borrow_mut().retain(|s| s.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistError;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
        label: String,
    }

    const COUNTER: StoreKey<Counter> = StoreKey::new("counter");
    const OTHER: StoreKey<Counter> = StoreKey::new("other");

    fn counter(count: u32) -> Counter {
        Counter {
            count,
            label: format!("#{count}"),
        }
    }

    #[test]
    fn get_returns_default_before_any_save() {
        let registry = StoreRegistry::in_memory();
        assert_eq!(*registry.get(&COUNTER), Counter::default());
    }

    #[test]
    fn save_replaces_whole_value() {
        let registry = StoreRegistry::in_memory();
        registry.save(&COUNTER, counter(3));
        registry.save(
            &COUNTER,
            Counter {
                count: 4,
                label: String::new(),
            },
        );
        let value = registry.get(&COUNTER);
        assert_eq!(value.count, 4);
        assert_eq!(value.label, "");
    }

    #[test]
    fn two_saves_notify_twice_in_order() {
        let registry = StoreRegistry::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry.subscribe_to(COUNTER, move |_, value| sink.borrow_mut().push(value.count));

        registry.save(&COUNTER, counter(1));
        registry.save(&COUNTER, counter(2));

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let registry = StoreRegistry::in_memory();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            registry.subscribe(move |_, _| order.borrow_mut().push(tag));
        }
        registry.save(&COUNTER, counter(1));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn reentrant_save_is_delivered_after_current_pass() {
        let registry = StoreRegistry::in_memory();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        registry.subscribe(move |registry, change| {
            first.borrow_mut().push(format!("first:{}", change.name()));
            if change.is(&COUNTER) {
                registry.save(&OTHER, counter(9));
            }
        });
        let second = Rc::clone(&log);
        registry.subscribe(move |_, change| {
            second.borrow_mut().push(format!("second:{}", change.name()));
        });

        registry.save(&COUNTER, counter(1));

        assert_eq!(
            *log.borrow(),
            vec![
                "first:counter",
                "second:counter",
                "first:other",
                "second:other",
            ]
        );
        assert_eq!(registry.get(&OTHER).count, 9);
    }

    #[test]
    fn revisions_increase_per_save() {
        let registry = StoreRegistry::in_memory();
        let revisions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&revisions);
        registry.subscribe(move |_, change| sink.borrow_mut().push(change.revision()));
        registry.save(&COUNTER, counter(1));
        registry.save(&OTHER, counter(1));
        registry.save(&COUNTER, counter(2));
        assert_eq!(*revisions.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn unsubscribe_during_pass_does_not_skip_others() {
        let registry = StoreRegistry::in_memory();
        let handle_slot: Rc<RefCell<Option<SubscriptionHandle>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let slot = Rc::clone(&handle_slot);
        let handle = registry.subscribe(move |_, _| {
            if let Some(handle) = slot.borrow_mut().take() {
                handle.unsubscribe();
            }
        });
        *handle_slot.borrow_mut() = Some(handle);

        let counted = Rc::clone(&calls);
        registry.subscribe(move |_, _| counted.set(counted.get() + 1));

        registry.save(&COUNTER, counter(1));
        assert_eq!(calls.get(), 1);
        assert_eq!(registry.subscriber_count(), 1);

        registry.save(&COUNTER, counter(2));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn subscribing_inside_callback_is_safe() {
        let registry = StoreRegistry::in_memory();
        let added = Rc::new(Cell::new(false));
        let flag = Rc::clone(&added);
        registry.subscribe(move |registry, _| {
            if !flag.replace(true) {
                registry.subscribe(|_, _| {});
            }
        });
        registry.save(&COUNTER, counter(1));
        assert_eq!(registry.subscriber_count(), 2);
    }

    #[test]
    fn reload_from_same_backend_roundtrips() {
        let backend = MemoryBackend::new();
        let registry = StoreRegistry::new(backend.clone(), "test");
        registry.save(&COUNTER, counter(7));
        assert!(backend.raw("test.counter").is_some());

        let reloaded = StoreRegistry::new(backend, "test");
        assert_eq!(*reloaded.get(&COUNTER), counter(7));
    }

    #[test]
    fn undecodable_record_falls_back_to_default() {
        let mut backend = MemoryBackend::new();
        backend.write("test.counter", "not json").unwrap();
        let registry = StoreRegistry::new(backend, "test");
        assert_eq!(*registry.get(&COUNTER), Counter::default());
    }

    struct BrokenBackend;

    impl StoreBackend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, PersistError> {
            Err(PersistError::Locked)
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
            Err(PersistError::Locked)
        }
    }

    #[test]
    fn persistence_failures_are_swallowed() {
        let registry = StoreRegistry::new(BrokenBackend, "test");
        assert_eq!(*registry.get(&COUNTER), Counter::default());
        registry.save(&COUNTER, counter(5));
        assert_eq!(registry.get(&COUNTER).count, 5);
    }

    #[test]
    fn update_merges_explicitly() {
        let registry = StoreRegistry::in_memory();
        registry.save(&COUNTER, counter(1));
        registry.update(&COUNTER, |c| Counter {
            count: c.count + 1,
            ..c.clone()
        });
        let value = registry.get(&COUNTER);
        assert_eq!(value.count, 2);
        assert_eq!(value.label, "#1");
    }

    #[test]
    fn published_values_are_not_mutated_by_later_saves() {
        let registry = StoreRegistry::in_memory();
        registry.save(&COUNTER, counter(1));
        let held = registry.get(&COUNTER);
        registry.save(&COUNTER, counter(2));
        assert_eq!(held.count, 1);
        assert_eq!(registry.get(&COUNTER).count, 2);
    }
}
