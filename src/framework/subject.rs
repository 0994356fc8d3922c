//! # State Subjects
//!
//! Each store owns one [`Subject`]: a single-writer cell holding the current
//! snapshot. Readers either clone the latest value with
//! [`Subject::snapshot`] or hold a [`StateStream`] and await changes.
//!
//! Built on `tokio::sync::watch`, so a slow reader only ever sees the newest
//! snapshot, never a backlog.

use tokio::sync::watch;

pub struct Subject<S> {
    sender: watch::Sender<S>,
}

impl<S: Clone + Send + Sync + 'static> Subject<S> {
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn snapshot(&self) -> S {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<S> {
        StateStream {
            receiver: self.sender.subscribe(),
        }
    }

    /// Swaps in a whole new snapshot.
    pub fn replace(&self, next: S) {
        self.sender.send_replace(next);
    }

    /// Derives the next snapshot from the current one.
    pub fn update(&self, change: impl FnOnce(&mut S)) {
        self.sender.send_modify(change);
    }
}

impl<S: Clone + Default + Send + Sync + 'static> Default for Subject<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// A subscription to a store's snapshots.
pub struct StateStream<S> {
    receiver: watch::Receiver<S>,
}

impl<S: Clone> StateStream<S> {
    /// The latest snapshot, without marking it seen.
    pub fn current(&self) -> S {
        self.receiver.borrow().clone()
    }

    /// Waits for a snapshot newer than the last one seen.
    ///
    /// Returns `None` once the owning store has been dropped.
    pub async fn changed(&mut self) -> Option<S> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_updates() {
        let subject = Subject::new(1u32);
        subject.update(|n| *n += 1);
        assert_eq!(subject.snapshot(), 2);
        subject.replace(10);
        assert_eq!(subject.snapshot(), 10);
    }

    #[tokio::test]
    async fn subscribers_see_the_latest_value() {
        let subject = Subject::new(String::from("a"));
        let mut stream = subject.subscribe();
        assert_eq!(stream.current(), "a");

        subject.replace("b".to_string());
        subject.replace("c".to_string());
        assert_eq!(stream.changed().await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn stream_ends_when_the_subject_is_dropped() {
        let subject = Subject::new(0u8);
        let mut stream = subject.subscribe();
        drop(subject);
        assert_eq!(stream.changed().await, None);
    }
}
