//! Unsubscribe handles for listener registrations.

use std::fmt;

use parking_lot::Mutex;
use tracing::debug;

type Release = Box<dyn FnOnce() + Send + 'static>;

/// Handle returned when a listener is registered.
///
/// The listener stays registered until [`Subscription::unsubscribe`] is called
/// or the handle is dropped.
pub struct Subscription {
    label: &'static str,
    release: Option<Release>,
}

impl Subscription {
    /// Create a handle that runs `release` exactly once when unsubscribed.
    pub fn new(label: &'static str, release: impl FnOnce() + Send + 'static) -> Self {
        Self { label, release: Some(Box::new(release)) }
    }

    /// Label given at registration time.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Remove the listener from its registry.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            debug!(label = self.label, "releasing subscription");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Collection of subscriptions released together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl SubscriptionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `subscription` alive until [`SubscriptionSet::release_all`].
    pub fn push(&self, subscription: Subscription) {
        self.subscriptions.lock().push(subscription);
    }

    /// Number of subscriptions currently held.
    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Whether the set holds no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }

    /// Unsubscribe everything, returning how many handles were released.
    pub fn release_all(&self) -> usize {
        let drained: Vec<Subscription> = std::mem::take(&mut *self.subscriptions.lock());
        let count = drained.len();
        for subscription in drained {
            subscription.unsubscribe();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting_subscription(counter: &Arc<AtomicUsize>) -> Subscription {
        let counter = Arc::clone(counter);
        Subscription::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn unsubscribe_runs_release_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let subscription = counting_subscription(&released);

        subscription.unsubscribe();

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_handle_releases_listener() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let _subscription = counting_subscription(&released);
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_all_empties_the_set() {
        let released = Arc::new(AtomicUsize::new(0));
        let set = SubscriptionSet::new();
        set.push(counting_subscription(&released));
        set.push(counting_subscription(&released));

        assert_eq!(set.len(), 2);
        assert_eq!(set.release_all(), 2);
        assert!(set.is_empty());
        assert_eq!(released.load(Ordering::SeqCst), 2);

        assert_eq!(set.release_all(), 0);
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }
}
