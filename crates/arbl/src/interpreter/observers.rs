//! Locale-change observers.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::types::LocaleId;

/// Opaque handle returned when registering a listener.
///
/// Pass it back to remove the listener; removing twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

/// What caused a [`LocaleChange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCause {
    /// The current locale was set explicitly.
    LocaleSet { previous: LocaleId },
    /// Bundles were reloaded from disk. `path` is the changed file, or the
    /// directory for a full reload.
    Reloaded { path: PathBuf },
}

/// Event delivered to locale-change listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChange {
    /// The locale current after the change.
    pub locale: LocaleId,
    pub cause: ChangeCause,
}

type Listener = Arc<dyn Fn(&LocaleChange) + Send + Sync>;

/// Listeners in registration order.
#[derive(Default)]
pub struct ObserverRegistry {
    listeners: Mutex<Vec<(Subscription, Listener)>>,
    next_id: Mutex<u64>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&LocaleChange) + Send + Sync + 'static) -> Subscription {
        let subscription = {
            let mut next_id = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
            *next_id += 1;
            Subscription(*next_id)
        };
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subscription, Arc::new(listener)));
        subscription
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener once with `change`.
    ///
    /// Listeners run on a snapshot of the list taken without holding the
    /// lock, so they may subscribe or unsubscribe. A panicking listener is
    /// logged and skipped.
    pub fn notify(&self, change: &LocaleChange) {
        let snapshot: Vec<(Subscription, Listener)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (subscription, listener) in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(change))).is_err() {
                error!(
                    ?subscription,
                    locale = %change.locale,
                    "locale change listener panicked"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(tag: &str) -> LocaleChange {
        let locale = LocaleId::parse(tag).unwrap();
        LocaleChange {
            locale: locale.clone(),
            cause: ChangeCause::LocaleSet { previous: locale },
        }
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let registry = ObserverRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let seen = Arc::clone(&seen);
            registry.subscribe(move |_| seen.lock().unwrap().push(id));
        }
        registry.notify(&change("en"));
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let registry = ObserverRegistry::new();
        let subscription = registry.subscribe(|_| {});
        assert!(registry.unsubscribe(subscription));
        assert!(!registry.unsubscribe(subscription));
        assert!(registry.is_empty());
    }

    #[test]
    fn panicking_listener_does_not_stop_others() {
        let registry = ObserverRegistry::new();
        let seen = Arc::new(Mutex::new(0));
        registry.subscribe(|_| panic!("boom"));
        let counter = Arc::clone(&seen);
        registry.subscribe(move |_| *counter.lock().unwrap() += 1);
        registry.notify(&change("fr"));
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
