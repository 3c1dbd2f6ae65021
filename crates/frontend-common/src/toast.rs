//! Transient user-facing notifications

use crate::config::StoreConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// Ids are unique for the whole process, not per store
static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

struct Inner {
    toasts: watch::Sender<Vec<Toast>>,
    timers: Mutex<HashMap<u64, JoinHandle<()>>>,
    ttl: Duration,
}

impl Inner {
    fn timers(&self) -> std::sync::MutexGuard<'_, HashMap<u64, JoinHandle<()>>> {
        self.timers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn discard(&self, id: u64) {
        self.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|toast| toast.id != id);
            toasts.len() != before
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.timers().drain() {
            timer.abort();
        }
    }
}

/// Ordered queue of toasts that expire on their own
///
/// Every toast owns a timer task; removing the toast early or dropping the
/// last handle to the store aborts it. Clones share the same queue.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<Inner>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_millis(StoreConfig::TOAST_TIMEOUT_MS))
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                toasts,
                timers: Mutex::new(HashMap::new()),
                ttl,
            }),
        }
    }

    /// Current toasts in insertion order
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }

    /// Append a toast and schedule its removal
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn add(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let id = NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            kind,
        };
        trace!(id, ?kind, "Toast added");
        self.inner.toasts.send_modify(|toasts| toasts.push(toast));

        // Held while spawning so the timer cannot fire before it is tracked
        let mut timers = self.inner.timers();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner.timers().remove(&id);
                inner.discard(id);
                trace!(id, "Toast expired");
            }
        });
        timers.insert(id, timer);
        id
    }

    #[must_use]
    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.add(message, ToastKind::Success)
    }

    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.add(message, ToastKind::Error)
    }

    /// Remove a toast and cancel its timer; unknown ids are ignored
    pub fn remove(&self, id: u64) {
        if let Some(timer) = self.inner.timers().remove(&id) {
            timer.abort();
        }
        self.inner.discard(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toast_expires_after_timeout() {
        let store = ToastStore::new();
        let id = store.success("Saved");

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert_eq!(store.toasts().len(), 1);
        assert_eq!(store.toasts()[0].id, id);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_cancels_timer() {
        let store = ToastStore::new();
        let id = store.error("Failed");

        store.remove(id);
        assert!(store.toasts().is_empty());
        assert!(store.inner.timers().is_empty());

        // removing twice is harmless
        store.remove(id);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insertion_order_without_dedupe() {
        let store = ToastStore::new();
        let first = store.success("same");
        let second = store.error("same");
        let third = store.success("other");

        assert!(first < second && second < third);
        let toasts = store.toasts();
        assert_eq!(
            toasts.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![first, second, third]
        );
        assert_eq!(toasts[1].kind, ToastKind::Error);

        store.remove(second);
        assert_eq!(
            store.toasts().iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![first, third]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_continue_across_stores() {
        let a = ToastStore::new().success("a");
        let b = ToastStore::new().success("b");
        assert!(b > a);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let store = ToastStore::with_ttl(Duration::from_millis(10));
        let mut rx = store.subscribe();

        store.success("hi");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_toast_serializes_kind_as_type() {
        let toast = Toast {
            id: 3,
            message: "ok".into(),
            kind: ToastKind::Error,
        };
        assert_eq!(
            serde_json::to_value(&toast).unwrap(),
            serde_json::json!({"id": 3, "message": "ok", "type": "error"})
        );
    }
}
