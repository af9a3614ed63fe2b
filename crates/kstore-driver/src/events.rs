//! Cross-context change notification.
//!
//! Several handles ("contexts") may share one backing area. A mutation made
//! through one handle is announced to every other handle; the originating
//! handle never hears its own writes.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;

/// Identifies one handle onto a shared area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate a process-unique context id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A raw change to a backing area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The context that made the change.
    pub origin: ContextId,
    /// Driver key that changed, or `None` when the whole area was cleared.
    pub key: Option<String>,
    /// Previous text, if the key existed.
    pub old_value: Option<String>,
    /// New text, or `None` on removal.
    pub new_value: Option<String>,
}

/// Receiver for changes made by other contexts.
///
/// Dropping the feed unsubscribes.
pub struct ChangeFeed {
    receiver: broadcast::Receiver<ChangeEvent>,
    context: ContextId,
}

impl ChangeFeed {
    /// Wrap a broadcast receiver, skipping events that originate from
    /// `context`.
    pub fn new(receiver: broadcast::Receiver<ChangeEvent>, context: ContextId) -> Self {
        Self { receiver, context }
    }

    /// Wait for the next foreign change. `None` once the area is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.context => continue,
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change feed lagged; events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending foreign change without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.origin == self.context => continue,
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "change feed lagged; events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(origin: ContextId, key: &str) -> ChangeEvent {
        ChangeEvent {
            origin,
            key: Some(key.to_string()),
            old_value: None,
            new_value: Some("v".to_string()),
        }
    }

    #[test]
    fn context_ids_are_unique() {
        assert_ne!(ContextId::next(), ContextId::next());
    }

    #[test]
    fn own_events_are_skipped() {
        let (tx, rx) = broadcast::channel(8);
        let me = ContextId::next();
        let other = ContextId::next();
        let mut feed = ChangeFeed::new(rx, me);

        tx.send(event(me, "mine")).unwrap();
        tx.send(event(other, "theirs")).unwrap();

        let received = feed.try_recv().unwrap();
        assert_eq!(received.key.as_deref(), Some("theirs"));
        assert!(feed.try_recv().is_none());
    }

    #[tokio::test]
    async fn recv_ends_when_sender_dropped() {
        let (tx, rx) = broadcast::channel(8);
        let mut feed = ChangeFeed::new(rx, ContextId::next());
        tx.send(event(ContextId::next(), "k")).unwrap();
        drop(tx);

        assert!(feed.recv().await.is_some());
        assert!(feed.recv().await.is_none());
    }
}
