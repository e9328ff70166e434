// ── Typed publish/subscribe ──
//
// Synchronous fan-out in registration order. Listeners are snapshotted
// before delivery, so a listener may subscribe or unsubscribe from inside
// its own callback without deadlocking; such changes apply from the next
// publish on.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::filter::DateRangeFilter;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Publisher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A named broadcast channel with no replay.
///
/// A listener registered after a publish never sees that value.
pub struct Publisher<T> {
    name: &'static str,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
}

/// The channel carrying the active date-range selection to every chart.
pub type FilterBus = Publisher<DateRangeFilter>;

impl<T> Publisher<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a listener for every future publish.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        trace!(channel = self.name, ?id, "subscribed");
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        before != listeners.len()
    }

    /// Deliver `value` to every current listener, in registration order.
    /// Returns the number of listeners reached.
    pub fn publish(&self, value: &T) -> usize {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!(channel = self.name, listeners = snapshot.len(), "publishing");
        for listener in &snapshot {
            listener(value);
        }
        snapshot.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T> fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestListener = Box<dyn Fn(&u32) + Send + Sync>;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> TestListener) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_factory = Arc::clone(&log);
        let factory = move |tag: &'static str| -> TestListener {
            let log = Arc::clone(&log_for_factory);
            Box::new(move |v: &u32| log.lock().expect("log").push(format!("{tag}:{v}")))
        };
        (log, factory)
    }

    #[test]
    fn delivers_in_registration_order() {
        let bus: Publisher<u32> = Publisher::new("test");
        let (log, listener) = recorder();
        bus.subscribe(listener("a"));
        bus.subscribe(listener("b"));
        bus.subscribe(listener("c"));

        assert_eq!(bus.publish(&1), 3);
        assert_eq!(*log.lock().expect("log"), vec!["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn late_subscriber_misses_earlier_publish() {
        let bus: Publisher<u32> = Publisher::new("test");
        let (log, listener) = recorder();
        bus.subscribe(listener("early"));
        bus.publish(&1);
        bus.subscribe(listener("late"));
        bus.publish(&2);

        assert_eq!(
            *log.lock().expect("log"),
            vec!["early:1", "early:2", "late:2"]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus: Publisher<u32> = Publisher::new("test");
        let (log, listener) = recorder();
        let a = bus.subscribe(listener("a"));
        bus.subscribe(listener("b"));

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        bus.publish(&5);

        assert_eq!(*log.lock().expect("log"), vec!["b:5"]);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn listener_may_subscribe_during_publish() {
        let bus: Arc<Publisher<u32>> = Arc::new(Publisher::new("test"));
        let inner = Arc::clone(&bus);
        bus.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        assert_eq!(bus.publish(&1), 1);
        assert_eq!(bus.subscriber_count(), 2);
    }
}
