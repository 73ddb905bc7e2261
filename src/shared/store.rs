//! Observable value container
//!
//! A [`Store`] holds one current value and notifies its observers synchronously
//! whenever that value changes. Every write runs inside a notification round
//! guarded by a re-entrant lock:
//!
//! - a write from another thread blocks until the running round ends, then runs
//!   its own round, so it is stored and delivered before it returns;
//! - a write from inside an observer (same thread as the running round) is
//!   queued and applied in order once the current round finishes, so a nested
//!   `set` returns immediately instead of recursing.
//!
//! An observer must not block on another thread that is writing to the same
//! store; that thread waits for the observer's round and both stall.

use crossbeam_channel::{unbounded, Receiver};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

use crate::error::{StateError, Validate};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;
type Write<T> = Box<dyn FnOnce(&T) -> T + Send>;

/// Writes queued by the thread that owns the running round
struct Dispatch<T> {
    queue: VecDeque<Write<T>>,
    draining: bool,
}

struct Inner<T> {
    value: RwLock<T>,
    observers: Mutex<Vec<(u64, Observer<T>)>>,
    round: ReentrantMutex<RefCell<Dispatch<T>>>,
    next_id: AtomicU64,
}

impl<T> Inner<T> {
    fn is_registered(&self, id: u64) -> bool {
        self.observers.lock().iter().any(|(oid, _)| *oid == id)
    }
}

/// Type-erased handle back to a store, used by [`Subscription`]
trait Deregister: Send + Sync {
    fn deregister(&self, id: u64);
}

impl<T: Send + Sync> Deregister for Inner<T> {
    fn deregister(&self, id: u64) {
        self.observers.lock().retain(|(oid, _)| *oid != id);
    }
}

/// Observable holder of a single value
///
/// Cloning a `Store` yields another handle to the same value and observers.
pub struct Store<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a store seeded with `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(value),
                observers: Mutex::new(Vec::new()),
                round: ReentrantMutex::new(RefCell::new(Dispatch {
                    queue: VecDeque::new(),
                    draining: false,
                })),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Replace the whole value and notify every observer before returning
    ///
    /// Called from inside an observer, the write is queued behind the
    /// running round instead.
    pub fn set(&self, value: T) {
        self.enqueue(Box::new(move |_: &T| value));
    }

    /// Replace the value with `f(current)`
    ///
    /// `f` must return a complete record. When called from inside an observer
    /// the update is queued and `f` sees the value left by the writes queued
    /// ahead of it.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        self.enqueue(Box::new(f));
    }

    /// Register `observer`, calling it immediately with the current value
    ///
    /// Registration and the first call happen inside a round, so no write from
    /// another thread can slip between them. The observer stays registered
    /// until the returned [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let observer: Observer<T> = Arc::new(observer);
        {
            let _round = self.inner.round.lock();
            self.inner.observers.lock().push((id, Arc::clone(&observer)));
            trace!(id, "observer registered");
            observer(&self.get());
        }

        let store = Arc::downgrade(&self.inner) as Weak<dyn Deregister>;
        Subscription {
            store,
            id,
            active: true,
        }
    }

    /// Subscribe through a channel, for consumers living on another thread
    ///
    /// The receiver yields the current value first, then every change.
    pub fn subscribe_channel(&self) -> (Receiver<T>, Subscription) {
        let (tx, rx) = unbounded();
        let subscription = self.subscribe(move |value: &T| {
            // Receiver gone means the consumer stopped listening
            let _ = tx.send(value.clone());
        });
        (rx, subscription)
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    fn enqueue(&self, write: Write<T>) {
        // Other threads wait here; the owning thread re-enters
        let round = self.inner.round.lock();
        {
            let mut dispatch = round.borrow_mut();
            dispatch.queue.push_back(write);
            if dispatch.draining {
                trace!(pending = dispatch.queue.len(), "write queued behind running round");
                return;
            }
            dispatch.draining = true;
        }
        self.drain(&round);
    }

    fn drain(&self, dispatch: &RefCell<Dispatch<T>>) {
        let _guard = DrainGuard { dispatch };

        loop {
            let write = {
                let mut dispatch = dispatch.borrow_mut();
                match dispatch.queue.pop_front() {
                    Some(write) => write,
                    None => {
                        dispatch.draining = false;
                        return;
                    }
                }
            };

            let current = self.get();
            let next = write(&current);
            *self.inner.value.write() = next.clone();
            self.notify(&next);
        }
    }

    fn notify(&self, value: &T) {
        let observers: Vec<(u64, Observer<T>)> = self.inner.observers.lock().clone();
        for (id, observer) in observers {
            // Skip observers removed earlier in this round
            if self.inner.is_registered(id) {
                observer(value);
            }
        }
    }
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + Validate + 'static,
{
    /// Validate `value`, then [`set`](Self::set) it
    ///
    /// A rejected value leaves the store untouched and notifies nobody.
    pub fn try_set(&self, value: T) -> Result<(), StateError> {
        value.validate()?;
        self.set(value);
        Ok(())
    }

    /// Compute `f(current)`, validate it, then set it
    ///
    /// Other threads cannot write between reading the current value and
    /// setting the result.
    pub fn try_update<F>(&self, f: F) -> Result<(), StateError>
    where
        F: FnOnce(&T) -> T,
    {
        let _round = self.inner.round.lock();
        let next = f(&self.get());
        self.try_set(next)
    }
}

impl<T> Default for Store<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &*self.inner.value.read())
            .field("observers", &self.inner.observers.lock().len())
            .finish()
    }
}

/// Releases the round if an observer panics mid-round
struct DrainGuard<'a, T> {
    dispatch: &'a RefCell<Dispatch<T>>,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut dispatch) = self.dispatch.try_borrow_mut() {
                dispatch.queue.clear();
                dispatch.draining = false;
            }
        }
    }
}

/// Registration handle returned by [`Store::subscribe`]
///
/// Dropping it removes the observer.
#[must_use = "dropping a Subscription immediately unsubscribes the observer"]
pub struct Subscription {
    store: Weak<dyn Deregister>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Identifier of the registered observer
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the observer; it receives no further notifications
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the observer registered for the lifetime of the store
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(store) = self.store.upgrade() {
            store.deregister(self.id);
            trace!(id = self.id, "observer removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::time::Duration;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &T| sink.lock().push(value.clone()))
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Even(i32);

    impl Validate for Even {
        fn validate(&self) -> Result<(), StateError> {
            if self.0 % 2 == 0 {
                Ok(())
            } else {
                Err(StateError::invalid_shape("value", "must be even"))
            }
        }
    }

    #[test]
    fn test_get_returns_initial_value() {
        let store = Store::new(7);
        assert_eq!(store.get(), 7);
        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn test_last_set_wins() {
        let store = Store::new(String::new());
        for value in ["a", "b", "c"] {
            store.set(value.to_string());
        }
        assert_eq!(store.get(), "c");
    }

    #[test]
    fn test_subscribe_delivers_current_value_first() {
        let store = Store::new(1);
        let (seen, observer) = recorder();
        let _sub = store.subscribe(observer);
        assert_eq!(*seen.lock(), vec![1]);

        store.set(2);
        store.set(3);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_every_observer_sees_each_update_once() {
        let store = Store::new(0);
        let (first, a) = recorder();
        let (second, b) = recorder();
        let _a = store.subscribe(a);
        let _b = store.subscribe(b);

        store.set(10);
        assert_eq!(*first.lock(), vec![0, 10]);
        assert_eq!(*second.lock(), vec![0, 10]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = Store::new(0);
        let (seen, observer) = recorder();
        let sub = store.subscribe(observer);
        store.set(1);
        sub.unsubscribe();
        store.set(2);
        store.update(|v| v + 1);

        assert_eq!(*seen.lock(), vec![0, 1]);
        assert_eq!(store.observer_count(), 0);
        assert_eq!(store.get(), 3);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let store = Store::new(0);
        let (seen, observer) = recorder();
        {
            let _sub = store.subscribe(observer);
            store.set(1);
        }
        store.set(2);
        assert_eq!(*seen.lock(), vec![0, 1]);
    }

    #[test]
    fn test_detached_observer_stays_registered() {
        let store = Store::new(0);
        let (seen, observer) = recorder();
        store.subscribe(observer).detach();
        store.set(5);
        assert_eq!(*seen.lock(), vec![0, 5]);
        assert_eq!(store.observer_count(), 1);
    }

    #[test]
    fn test_update_derives_from_current() {
        let store = Store::new(vec![1, 2]);
        store.update(|v| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        assert_eq!(store.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reentrant_set_is_queued() {
        let store = Store::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_store = store.clone();
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |value: &i32| {
            sink.lock().push((*value, inner_store.get()));
            if *value == 1 {
                inner_store.set(2);
                // Queued write is not applied until this round ends
                assert_eq!(inner_store.get(), 1);
            }
        });

        store.set(1);
        assert_eq!(store.get(), 2);
        assert_eq!(*seen.lock(), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_reentrant_update_chain_terminates() {
        let store = Store::new(0);
        let (seen, observer) = recorder();
        let _log = store.subscribe(observer);

        let inner_store = store.clone();
        let _bump = store.subscribe(move |value: &i32| {
            if *value > 0 && *value < 5 {
                inner_store.update(|v| v + 1);
            }
        });

        store.set(1);
        assert_eq!(store.get(), 5);
        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unsubscribed_mid_round_is_skipped() {
        let store = Store::new(0);
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&victim);
        let _killer = store.subscribe(move |value: &i32| {
            if *value == 1 {
                if let Some(sub) = slot.lock().take() {
                    sub.unsubscribe();
                }
            }
        });

        let (seen, observer) = recorder();
        *victim.lock() = Some(store.subscribe(observer));

        store.set(1);
        store.set(2);
        assert_eq!(*seen.lock(), vec![0]);
    }

    #[test]
    fn test_subscribe_channel_receives_updates() {
        let store = Store::new(String::from("start"));
        let (rx, _sub) = store.subscribe_channel();
        store.set("next".to_string());

        assert_eq!(rx.try_recv().unwrap(), "start");
        assert_eq!(rx.try_recv().unwrap(), "next");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_subscriber_on_other_thread() {
        let store = Store::new(0u32);
        let (rx, _sub) = store.subscribe_channel();

        let writer = store.clone();
        let handle = std::thread::spawn(move || {
            for i in 1..=3 {
                writer.set(i);
            }
        });
        handle.join().unwrap();

        let received: Vec<u32> = rx.try_iter().collect();
        assert_eq!(received, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_set_from_other_thread_waits_for_running_round() {
        let store = Store::new(0);
        let (seen, observer) = recorder();
        let _log = store.subscribe(observer);

        let (entered_tx, entered_rx) = crossbeam_channel::bounded::<()>(1);
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(1);
        let _gate = store.subscribe(move |value: &i32| {
            if *value == 1 {
                let _ = entered_tx.send(());
                let _ = release_rx.recv_timeout(Duration::from_secs(5));
            }
        });

        let writer = store.clone();
        let first = std::thread::spawn(move || writer.set(1));
        entered_rx.recv().unwrap();

        let releaser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            let _ = release_tx.send(());
        });

        // Blocks until the round for 1 ends, then stores and delivers 2
        store.set(2);
        assert_eq!(store.get(), 2);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);

        first.join().unwrap();
        releaser.join().unwrap();
    }

    #[test]
    fn test_subscribe_during_concurrent_writes() {
        let store = Store::new(0u32);
        let writer = store.clone();
        let handle = std::thread::spawn(move || {
            for i in 1..=500 {
                writer.set(i);
            }
        });

        let (seen, observer) = recorder();
        let _sub = store.subscribe(observer);
        handle.join().unwrap();

        let seen = seen.lock().clone();
        assert!(seen.windows(2).all(|pair| pair[0] + 1 == pair[1]));
        assert_eq!(seen.last(), Some(&500));
    }

    #[test]
    fn test_try_set_rejects_without_notifying() {
        let store = Store::new(Even(0));
        let (seen, observer) = recorder();
        let _sub = store.subscribe(observer);

        let err = store.try_set(Even(3)).unwrap_err();
        assert!(matches!(err, StateError::InvalidShape { field: "value", .. }));
        assert_eq!(store.get(), Even(0));
        assert_eq!(*seen.lock(), vec![Even(0)]);

        store.try_update(|v| Even(v.0 + 2)).unwrap();
        assert_eq!(store.get(), Even(2));
    }

    #[test]
    fn test_subscription_outliving_store() {
        let store = Store::new(0);
        let sub = store.subscribe(|_| {});
        drop(store);
        sub.unsubscribe();
    }

    #[test]
    fn test_panicking_observer_releases_dispatch() {
        let store = Store::new(0);
        let sub = store.subscribe(|value: &i32| {
            if *value == 1 {
                panic!("observer failure");
            }
        });

        let result = catch_unwind(AssertUnwindSafe(|| store.set(1)));
        assert!(result.is_err());
        sub.unsubscribe();

        store.set(2);
        assert_eq!(store.get(), 2);
    }
}
