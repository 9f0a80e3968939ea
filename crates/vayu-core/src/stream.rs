// ── Reactive resource streams ──
//
// Subscription type for consuming state changes from a resource.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::state::ResourceState;

/// A subscription to one resource's state.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct ResourceStream<T> {
    current: ResourceState<T>,
    receiver: watch::Receiver<ResourceState<T>>,
}

impl<T: Send + Sync + 'static> ResourceStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<ResourceState<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time or by the last `changed()`.
    pub fn current(&self) -> &ResourceState<T> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> ResourceState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the owning resource has been dropped.
    pub async fn changed(&mut self) -> Option<ResourceState<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait until `predicate` holds, checking the latest value first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&ResourceState<T>) -> bool,
    ) -> Option<ResourceState<T>> {
        let snap = self.receiver.wait_for(|s| predicate(s)).await.ok()?.clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ResourceWatchStream<T> {
        ResourceWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current state first, then a new snapshot each time the
/// resource settles or starts loading.
pub struct ResourceWatchStream<T> {
    inner: WatchStream<ResourceState<T>>,
}

impl<T: Send + Sync + 'static> Stream for ResourceWatchStream<T> {
    type Item = ResourceState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin, so this is safe.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use futures_util::StreamExt;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn changed_waits_for_a_new_snapshot() {
        let (tx, rx) = watch::channel(ResourceState::<u8>::pending());
        let mut stream = ResourceStream::new(rx);

        let mut changed = task::spawn(stream.changed());
        assert_pending!(changed.poll());

        tx.send_modify(|s| {
            s.loading = false;
            s.data = Some(Arc::new(3));
        });
        assert!(changed.is_woken());
        let snap = assert_ready!(changed.poll()).unwrap();
        assert_eq!(snap.data.as_deref(), Some(&3));
        drop(changed);

        assert!(!stream.current().loading);
    }

    #[test]
    fn changed_ends_once_the_resource_is_gone() {
        let (tx, rx) = watch::channel(ResourceState::<u8>::idle());
        let mut stream = ResourceStream::new(rx);
        drop(tx);

        let mut changed = task::spawn(stream.changed());
        assert!(assert_ready!(changed.poll()).is_none());
    }

    #[tokio::test]
    async fn into_stream_yields_current_then_updates() {
        let (tx, rx) = watch::channel(ResourceState::<u8>::pending());
        let mut stream = ResourceStream::new(rx).into_stream();

        assert!(stream.next().await.unwrap().loading);
        tx.send_modify(|s| s.loading = false);
        assert!(!stream.next().await.unwrap().loading);
    }
}
