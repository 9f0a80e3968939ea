// ── Resource state ──
//
// The `{data, loading, error}` triple owned by one resource, plus the
// publication cell that enforces who may write it and when.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::stream::ResourceStream;

/// Snapshot of one resource.
///
/// `data` survives failed fetches; `error` is cleared by any success.
/// `not_implemented` marks data that came from the gateway's fallback
/// fixture or a `501` response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState<T> {
    pub data: Option<Arc<T>>,
    pub loading: bool,
    pub error: Option<String>,
    pub not_implemented: bool,
}

impl<T> ResourceState<T> {
    /// Initial state of a resource about to issue its first request.
    pub fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            not_implemented: false,
        }
    }

    /// Initial state of a resource with nothing to do yet.
    pub fn idle() -> Self {
        Self {
            loading: false,
            ..Self::pending()
        }
    }

    /// A loading indicator is due only while nothing has ever loaded.
    pub fn show_spinner(&self) -> bool {
        self.loading && self.data.is_none()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            loading: self.loading,
            error: self.error.clone(),
            not_implemented: self.not_implemented,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ResourceState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceState")
            .field("data", &self.data)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("not_implemented", &self.not_implemented)
            .finish()
    }
}

// ── Scope ───────────────────────────────────────────────────────────

/// Ticket identifying one issued request.
pub(crate) type Ticket = u64;

/// Write side of a resource's state.
///
/// Every fetch takes a ticket from a monotonic sequence; a completion is
/// applied only if no newer request was issued since, and only while the
/// owning resource is alive. Stale and post-teardown completions are
/// dropped silently.
pub(crate) struct Scope<T> {
    state: watch::Sender<ResourceState<T>>,
    sequence: AtomicU64,
    cancel: CancellationToken,
}

impl<T: Send + Sync + 'static> Scope<T> {
    pub(crate) fn new(initial: ResourceState<T>) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            sequence: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    /// Issue a ticket. With `mark_loading`, flips `loading` on at once.
    pub(crate) fn begin(&self, mark_loading: bool) -> Ticket {
        let ticket = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        if mark_loading {
            self.mark_loading();
        }
        ticket
    }

    /// Issue a ticket, flip `loading` on and reset other fields in one
    /// publication.
    pub(crate) fn begin_with(&self, prepare: impl FnOnce(&mut ResourceState<T>)) -> Ticket {
        let ticket = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            prepare(s);
        });
        ticket
    }

    /// Make every outstanding ticket stale.
    pub(crate) fn invalidate(&self) {
        self.sequence.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn mark_loading(&self) {
        self.state.send_if_modified(|s| {
            let changed = !s.loading;
            s.loading = true;
            changed
        });
    }

    /// Apply a completion if `ticket` is still current. Always ends with
    /// `loading == false`. Returns whether the write happened.
    pub(crate) fn settle(&self, ticket: Ticket, apply: impl FnOnce(&mut ResourceState<T>)) -> bool {
        if self.cancel.is_cancelled() {
            trace!(ticket, "resource dropped, ignoring completion");
            return false;
        }
        let mut applied = false;
        self.state.send_if_modified(|s| {
            if self.sequence.load(Ordering::Acquire) != ticket {
                return false;
            }
            apply(s);
            s.loading = false;
            applied = true;
            true
        });
        if !applied {
            trace!(ticket, "discarding stale completion");
        }
        applied
    }

    /// Local state change that bypasses the ticket check (input
    /// validation failures). Invalidates anything in flight.
    pub(crate) fn fail_fast(&self, message: &str) {
        self.invalidate();
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(message.to_owned());
        });
    }

    pub(crate) fn snapshot(&self) -> ResourceState<T> {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> ResourceStream<T> {
        ResourceStream::new(self.state.subscribe())
    }

    /// Stop accepting completions. Idempotent.
    pub(crate) fn close(&self) {
        self.cancel.cancel();
    }
}
