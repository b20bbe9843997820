//! Observable values.
//!
//! A thin wrapper over `tokio::sync::watch`: the current value is always
//! readable, and subscribers either await changes on a receiver or register a
//! callback whose [`Subscription`] handle unsubscribes on drop.

use std::fmt;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable").field(&*self.tx.borrow()).finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(value);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value, returning the previous one.
    pub fn set(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    /// Modify in place; subscribers are notified only if `f` returns true.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Receiver that sees the current value and every later change.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Call `callback` with the current value and then on every change.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn observe<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let task = tokio::spawn(async move {
            loop {
                let value = rx.borrow_and_update().clone();
                callback(&value);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        Subscription { task }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Handle for an [`Observable::observe`] callback. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_subscribe() {
        let value = Observable::new(1);
        let mut rx = value.subscribe();

        assert_eq!(value.set(2), 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(value.get(), 2);

        assert!(!value.update_if(|v| *v == 3));
        assert!(value.update_if(|v| {
            *v = 3;
            true
        }));
        assert_eq!(value.get(), 3);
    }

    #[tokio::test]
    async fn test_observe_until_unsubscribed() {
        let value = Observable::new(0);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let subscription = value.observe(move |v| {
            let _ = tx.send(*v);
        });
        assert_eq!(rx.recv().await, Some(0));
        value.set(1);
        assert_eq!(rx.recv().await, Some(1));

        subscription.unsubscribe();
        value.set(2);
        // The aborted task drops its sender.
        assert_eq!(rx.recv().await, None);
    }
}
