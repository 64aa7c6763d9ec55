//! Append-event listener registry.
//!
//! Listeners are held until explicitly removed with their handle. Removal is
//! idempotent, and dispatch happens outside the lock so a listener may
//! unsubscribe from inside its own callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::RawRecord;

/// Callback invoked once per delivered append event.
pub type AppendListener = Arc<dyn Fn(RawRecord) + Send + Sync>;

/// Disposable handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Numeric id of the registration, for logging.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Ordered set of registered listeners.
#[derive(Default)]
pub(crate) struct ListenerHub {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, AppendListener)>>,
}

impl ListenerHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its handle.
    pub(crate) fn register(&self, listener: AppendListener) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .write()
            .push((id, listener));
        SubscriptionHandle(id)
    }

    /// Removes a listener. Returns false if it was already gone.
    pub(crate) fn remove(&self, handle: SubscriptionHandle) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != handle.0);
        listeners.len() != before
    }

    /// Delivers a record to every listener in registration order.
    pub(crate) fn notify(&self, record: &RawRecord) {
        let listeners: Vec<AppendListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(record.clone());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn raw(message: &str) -> RawRecord {
        RawRecord {
            author: "0x00000000000000000000000000000000000000a1".parse().unwrap(),
            epoch_seconds: 1000,
            message: message.to_string(),
        }
    }

    #[test]
    fn register_and_notify() {
        let hub = ListenerHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        hub.register(Arc::new(move |r: RawRecord| sink.lock().unwrap().push(r.message)));
        assert_eq!(hub.len(), 1);

        hub.notify(&raw("hello"));
        assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn remove_is_idempotent() {
        let hub = ListenerHub::new();
        let handle = hub.register(Arc::new(|_| {}));

        assert!(hub.remove(handle));
        assert!(!hub.remove(handle));
        assert_eq!(hub.len(), 0);
    }

    #[test]
    fn handles_are_distinct() {
        let hub = ListenerHub::new();
        let a = hub.register(Arc::new(|_| {}));
        let b = hub.register(Arc::new(|_| {}));
        assert_ne!(a, b);

        assert!(hub.remove(a));
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn no_delivery_after_remove() {
        let hub = ListenerHub::new();
        let count = Arc::new(Mutex::new(0));

        let counter = count.clone();
        let handle = hub.register(Arc::new(move |_| *counter.lock().unwrap() += 1));
        hub.notify(&raw("one"));
        hub.remove(handle);
        hub.notify(&raw("two"));

        assert_eq!(*count.lock().unwrap(), 1);
    }
}
