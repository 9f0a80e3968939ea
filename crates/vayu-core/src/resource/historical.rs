use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tracing::debug;
use vayu_api::ApiResult;
use vayu_api::models::HistoricalWindow;

use super::{MISSING_INPUT_MESSAGE, PollMode};
use crate::config::DEFAULT_HISTORY_POLL_INTERVAL;
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{DeviceId, HistoricalSeries};
use crate::poller::Poller;
use crate::state::{ResourceState, Scope};
use crate::stream::ResourceStream;

const FETCH_FAILED_MESSAGE: &str = "Failed to fetch historical data";

/// Chart-ready readings for one device over the last `hours`.
///
/// Fetches once on construction and again whenever the device or the
/// time range changes. [`PollMode::Continuous`] adds a recurring fetch on
/// top of that.
pub struct HistoricalResource<G: Gateway> {
    inner: Arc<Inner<G>>,
    poller: Poller,
    mode: PollMode,
}

struct Inner<G> {
    gateway: Arc<G>,
    device: ArcSwapOption<DeviceId>,
    hours: AtomicU32,
    scope: Scope<HistoricalSeries>,
}

impl<G: Gateway> Inner<G> {
    /// Validate the current inputs and fetch. Reads inputs at call time,
    /// so a single callback serves every device and range.
    async fn fetch(self: Arc<Self>) {
        let hours = self.hours.load(Ordering::Acquire);
        let device = match self.device.load_full() {
            Some(device) if hours > 0 => device,
            _ => {
                self.scope.fail_fast(MISSING_INPUT_MESSAGE);
                return;
            }
        };

        let ticket = self.scope.begin(true);
        debug!(device = %device, hours, ticket, "fetching historical data");
        let result = self.gateway.fetch_historical(device.as_str(), hours).await;
        self.scope.settle(ticket, |state| apply(state, result));
    }
}

fn apply(state: &mut ResourceState<HistoricalSeries>, result: ApiResult<HistoricalWindow>) {
    state.not_implemented = result.not_implemented;
    if result.success {
        if let Some(window) = result.data {
            state.data = Some(Arc::new(HistoricalSeries::from_window(&window)));
        }
        state.error = None;
    } else {
        state.error = Some(result.error.unwrap_or_else(|| FETCH_FAILED_MESSAGE.into()));
    }
}

impl<G: Gateway> HistoricalResource<G> {
    pub const DEFAULT_POLL_INTERVAL: Duration = DEFAULT_HISTORY_POLL_INTERVAL;

    /// Start tracking `device` over `hours`. Must be called inside a tokio
    /// runtime.
    ///
    /// Missing inputs settle the state into an error without a gateway
    /// call; that is not a construction failure.
    pub fn new(
        gateway: Arc<G>,
        device: Option<DeviceId>,
        hours: u32,
        mode: PollMode,
    ) -> Result<Self, CoreError> {
        let has_device = device.is_some();
        let inner = Arc::new(Inner {
            gateway,
            device: ArcSwapOption::new(device.map(Arc::new)),
            hours: AtomicU32::new(hours),
            scope: Scope::new(ResourceState::pending()),
        });

        let polling = mode.interval().is_some() && has_device;
        let callback_inner = Arc::clone(&inner);
        let poller = Poller::spawn(
            move || Arc::clone(&callback_inner).fetch(),
            mode.interval().unwrap_or(Self::DEFAULT_POLL_INTERVAL),
            polling,
        )?;

        let resource = Self {
            inner,
            poller,
            mode,
        };
        // An enabled poller fetches on its first tick.
        if !polling {
            resource.spawn_fetch();
        }
        Ok(resource)
    }

    pub fn state(&self) -> ResourceState<HistoricalSeries> {
        self.inner.scope.snapshot()
    }

    pub fn subscribe(&self) -> ResourceStream<HistoricalSeries> {
        self.inner.scope.subscribe()
    }

    pub fn device(&self) -> Option<DeviceId> {
        self.inner.device.load_full().map(|d| (*d).clone())
    }

    pub fn hours(&self) -> u32 {
        self.inner.hours.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_enabled()
    }

    /// Fetch once if the device actually changed.
    pub fn set_device(&self, device: Option<DeviceId>) {
        let device = device.map(Arc::new);
        if self.inner.device.load().as_deref() == device.as_deref() {
            return;
        }
        self.inner.device.store(device);
        self.inputs_changed();
    }

    /// Fetch once if the range actually changed.
    pub fn set_hours(&self, hours: u32) {
        if self.inner.hours.swap(hours, Ordering::AcqRel) == hours {
            return;
        }
        self.inputs_changed();
    }

    /// Fetch now, outside any schedule. `loading` turns on immediately;
    /// `data` is left in place.
    pub fn refetch(&self) {
        self.inner.scope.mark_loading();
        self.spawn_fetch();
    }

    fn inputs_changed(&self) {
        self.inner.scope.invalidate();
        let polling = self.mode.interval().is_some() && self.inner.device.load().is_some();
        if polling {
            // Fresh schedule, immediate first tick.
            self.poller.restart();
        } else {
            self.poller.set_enabled(false);
            self.spawn_fetch();
        }
    }

    fn spawn_fetch(&self) {
        tokio::spawn(Arc::clone(&self.inner).fetch());
    }
}

impl<G: Gateway> Drop for HistoricalResource<G> {
    fn drop(&mut self) {
        self.inner.scope.close();
    }
}
