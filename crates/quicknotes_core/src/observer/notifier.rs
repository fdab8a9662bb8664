//! Locator-scoped change notifier.
//!
//! # Responsibility
//! - Track observers registered on a locator.
//! - Fan a change on one locator out to every interested observer.
//!
//! # Invariants
//! - Observers are held weakly; dropping the last strong handle ends the
//!   registration, and dead entries are pruned on the next notification.
//! - Callbacks run after the registry lock is released.
//! - Delivery is synchronous and fire-and-forget; order is unspecified.

use crate::provider::locator::Locator;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Receiver of change notifications.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, locator: &Locator);
}

/// Registration handle returned by [`ChangeNotifier::register`].
pub type ObserverId = u64;

struct Registration {
    id: ObserverId,
    locator: Locator,
    notify_for_descendants: bool,
    observer: Weak<dyn ChangeObserver>,
}

impl Registration {
    fn wants(&self, changed: &Locator) -> bool {
        if self.locator == *changed || changed.is_ancestor_of(&self.locator) {
            return true;
        }
        self.notify_for_descendants && self.locator.is_ancestor_of(changed)
    }
}

/// Process-local observer registry.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for changes on `locator`.
    ///
    /// With `notify_for_descendants`, changes on any locator below
    /// `locator` are delivered too.
    pub fn register<O>(
        &self,
        locator: Locator,
        notify_for_descendants: bool,
        observer: &Arc<O>,
    ) -> ObserverId
    where
        O: ChangeObserver + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let observer: Weak<O> = Arc::downgrade(observer);
        let observer: Weak<dyn ChangeObserver> = observer;
        self.lock().push(Registration {
            id,
            locator,
            notify_for_descendants,
            observer,
        });
        id
    }

    /// Removes one registration. Returns `false` when it was already gone.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut registrations = self.lock();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    /// Number of live registrations.
    pub fn observer_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|registration| registration.observer.strong_count() > 0)
            .count()
    }

    /// Delivers a change on `locator`; returns how many observers were called.
    pub fn notify_change(&self, locator: &Locator) -> usize {
        let targets = {
            let mut registrations = self.lock();
            registrations.retain(|registration| registration.observer.strong_count() > 0);
            registrations
                .iter()
                .filter(|registration| registration.wants(locator))
                .filter_map(|registration| registration.observer.upgrade())
                .collect::<Vec<_>>()
        };

        for observer in &targets {
            observer.on_change(locator);
        }
        debug!(
            "event=notify_change module=observer status=ok locator={} delivered={}",
            locator,
            targets.len()
        );
        targets.len()
    }

    /// Registers a channel-backed observer and returns its receiving end.
    pub fn subscribe(&self, locator: Locator, notify_for_descendants: bool) -> ChangeSubscription {
        let (sender, receiver) = mpsc::channel();
        let observer = Arc::new(ChannelObserver {
            sender: Mutex::new(sender),
        });
        let id = self.register(locator, notify_for_descendants, &observer);
        ChangeSubscription {
            id,
            _observer: observer,
            receiver,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

struct ChannelObserver {
    sender: Mutex<Sender<Locator>>,
}

impl ChangeObserver for ChannelObserver {
    fn on_change(&self, locator: &Locator) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        // Receiver gone means nobody listens any more.
        let _ = sender.send(locator.clone());
    }
}

/// Pull-style subscription; dropping it ends the registration.
pub struct ChangeSubscription {
    id: ObserverId,
    _observer: Arc<ChannelObserver>,
    receiver: Receiver<Locator>,
}

impl ChangeSubscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Returns the next pending change without blocking.
    pub fn try_recv(&self) -> Option<Locator> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next change.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Locator> {
        match self.receiver.recv_timeout(timeout) {
            Ok(locator) => Some(locator),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Takes every pending change.
    pub fn drain(&self) -> Vec<Locator> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeNotifier, ChangeObserver};
    use crate::provider::locator::Locator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ChangeObserver for Counter {
        fn on_change(&self, _locator: &Locator) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn loc(raw: &str) -> Locator {
        Locator::parse(raw).unwrap()
    }

    #[test]
    fn exact_and_descendant_registrations_are_delivered() {
        let notifier = ChangeNotifier::new();
        let exact = Arc::new(Counter::default());
        let tree = Arc::new(Counter::default());
        let other = Arc::new(Counter::default());
        notifier.register(loc("content://a/notes"), false, &exact);
        notifier.register(loc("content://a/notes"), true, &tree);
        notifier.register(loc("content://a/other"), true, &other);

        notifier.notify_change(&loc("content://a/notes/4"));

        assert_eq!(exact.0.load(Ordering::SeqCst), 0);
        assert_eq!(tree.0.load(Ordering::SeqCst), 1);
        assert_eq!(other.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn change_on_collection_reaches_item_observers() {
        let notifier = ChangeNotifier::new();
        let item = Arc::new(Counter::default());
        notifier.register(loc("content://a/notes/9"), false, &item);

        assert_eq!(notifier.notify_change(&loc("content://a/notes")), 1);
        assert_eq!(item.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_observers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let observer = Arc::new(Counter::default());
        notifier.register(loc("content://a/notes"), true, &observer);
        assert_eq!(notifier.observer_count(), 1);

        drop(observer);
        assert_eq!(notifier.notify_change(&loc("content://a/notes")), 0);
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn unregister_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let observer = Arc::new(Counter::default());
        let id = notifier.register(loc("content://a/notes"), true, &observer);

        assert!(notifier.unregister(id));
        assert!(!notifier.unregister(id));
        notifier.notify_change(&loc("content://a/notes"));
        assert_eq!(observer.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_receives_changed_locator() {
        let notifier = ChangeNotifier::new();
        let subscription = notifier.subscribe(loc("content://a/notes"), true);

        notifier.notify_change(&loc("content://a/notes/2"));
        notifier.notify_change(&loc("content://a/notes"));

        let changes = subscription.drain();
        assert_eq!(
            changes,
            vec![loc("content://a/notes/2"), loc("content://a/notes")]
        );
        assert!(subscription.try_recv().is_none());
    }
}
