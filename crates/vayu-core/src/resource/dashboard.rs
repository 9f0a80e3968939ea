use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;
use vayu_api::ApiResult;
use vayu_api::models::DashboardSnapshot;

use super::NO_DEVICE_MESSAGE;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::DeviceId;
use crate::poller::Poller;
use crate::state::{ResourceState, Scope, Ticket};
use crate::stream::ResourceStream;

/// Live dashboard snapshot for one device, refreshed on a fixed interval.
///
/// Polling runs while a device is selected. Switching devices discards any
/// in-flight response for the previous one and restarts the schedule with
/// an immediate fetch.
pub struct DashboardResource<G: Gateway> {
    inner: Arc<Inner<G>>,
    poller: Poller,
}

struct Inner<G> {
    gateway: Arc<G>,
    device: ArcSwapOption<DeviceId>,
    scope: Scope<DashboardSnapshot>,
}

impl<G: Gateway> Inner<G> {
    async fn fetch(&self, device: &DeviceId, ticket: Ticket) {
        debug!(device = %device, ticket, "fetching dashboard");
        let result = self.gateway.fetch_dashboard(device.as_str()).await;
        self.scope.settle(ticket, |state| apply(state, result));
    }

    fn is_selected(&self, device: &DeviceId) -> bool {
        self.device.load().as_deref() == Some(device)
    }
}

fn poll_callback<G: Gateway>(
    inner: Arc<Inner<G>>,
    device: Arc<DeviceId>,
) -> impl Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static {
    move || {
        let inner = Arc::clone(&inner);
        let device = Arc::clone(&device);
        async move {
            // A tick that fires after the selection moved on is obsolete.
            if !inner.is_selected(&device) {
                return;
            }
            let ticket = inner.scope.begin(false);
            inner.fetch(&device, ticket).await;
        }
        .boxed()
    }
}

fn apply(state: &mut ResourceState<DashboardSnapshot>, result: ApiResult<DashboardSnapshot>) {
    if result.success {
        if let Some(data) = result.data {
            state.data = Some(Arc::new(data));
        }
        state.error = None;
        state.not_implemented = result.not_implemented;
        return;
    }

    state.error = Some(
        result
            .error
            .unwrap_or_else(|| "Failed to fetch dashboard data".into()),
    );
    if result.not_implemented {
        state.not_implemented = true;
        if let Some(data) = result.data {
            state.data = Some(Arc::new(data));
        }
    }
}

impl<G: Gateway> DashboardResource<G> {
    pub const DEFAULT_POLL_INTERVAL: Duration = DEFAULT_POLL_INTERVAL;

    /// Start tracking `device`. Must be called inside a tokio runtime.
    ///
    /// With no device the state settles at once into an error and the
    /// gateway is never called.
    pub fn new(
        gateway: Arc<G>,
        device: Option<DeviceId>,
        poll_interval: Duration,
    ) -> Result<Self, CoreError> {
        let device = device.map(Arc::new);
        let inner = Arc::new(Inner {
            gateway,
            device: ArcSwapOption::new(device.clone()),
            scope: Scope::new(ResourceState::pending()),
        });

        let poller = match device {
            Some(device) => {
                Poller::spawn(poll_callback(Arc::clone(&inner), device), poll_interval, true)?
            }
            None => {
                inner.scope.fail_fast(NO_DEVICE_MESSAGE);
                Poller::spawn(|| futures_util::future::ready(()), poll_interval, false)?
            }
        };

        Ok(Self { inner, poller })
    }

    pub fn state(&self) -> ResourceState<DashboardSnapshot> {
        self.inner.scope.snapshot()
    }

    pub fn subscribe(&self) -> ResourceStream<DashboardSnapshot> {
        self.inner.scope.subscribe()
    }

    pub fn device(&self) -> Option<DeviceId> {
        self.inner.device.load_full().map(|d| (*d).clone())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_enabled()
    }

    /// Switch to another device, or to none.
    ///
    /// Selecting the current device again is a no-op. Data from the
    /// previous device stays visible until the first response for the new
    /// one arrives.
    pub fn set_device(&self, device: Option<DeviceId>) {
        let device = device.map(Arc::new);
        if self.inner.device.load().as_deref() == device.as_deref() {
            return;
        }
        self.inner.device.store(device.clone());

        match device {
            Some(device) => {
                debug!(device = %device, "dashboard device selected");
                self.inner.scope.invalidate();
                self.inner.scope.mark_loading();
                self.poller
                    .set_callback(poll_callback(Arc::clone(&self.inner), device));
                self.poller.restart();
            }
            None => {
                debug!("dashboard device cleared, polling stopped");
                self.poller.set_enabled(false);
                self.inner.scope.fail_fast(NO_DEVICE_MESSAGE);
            }
        }
    }

    pub fn set_poll_interval(&self, interval: Duration) -> Result<(), CoreError> {
        self.poller.set_interval(interval)
    }

    /// Fetch now, outside the schedule. `loading` turns on immediately;
    /// `data` is left in place.
    pub fn refetch(&self) {
        let Some(device) = self.inner.device.load_full() else {
            self.inner.scope.fail_fast(NO_DEVICE_MESSAGE);
            return;
        };
        let ticket = self.inner.scope.begin(true);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.fetch(&device, ticket).await;
        });
    }
}

impl<G: Gateway> Drop for DashboardResource<G> {
    fn drop(&mut self) {
        self.inner.scope.close();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeGateway, pm25_of, settle, snapshot};
    use tokio::time::advance;
    use vayu_api::fixtures;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn esp(n: u8) -> Option<DeviceId> {
        DeviceId::parse(format!("ESP32_00{n}"))
    }

    fn pm25(state: &ResourceState<DashboardSnapshot>) -> Option<f64> {
        state.data.as_deref().and_then(pm25_of)
    }

    #[tokio::test(start_paused = true)]
    async fn missing_device_settles_without_calling_gateway() {
        let gateway = Arc::new(FakeGateway::new());
        let resource = DashboardResource::new(Arc::clone(&gateway), None, INTERVAL).unwrap();

        let state = resource.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(NO_DEVICE_MESSAGE));

        settle().await;
        advance(INTERVAL * 3).await;
        settle().await;
        assert_eq!(gateway.call_count(), 0);
        assert!(!resource.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_each_interval() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.always_dashboard(ApiResult::ok(snapshot(12.0)));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        assert!(resource.state().show_spinner());

        settle().await;
        let state = resource.state();
        assert_eq!(pm25(&state), Some(12.0));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(gateway.calls(), vec![Call::Dashboard("ESP32_001".into())]);

        advance(INTERVAL).await;
        settle().await;
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_gateway_never_sets_data() {
        let gateway = Arc::new(FakeGateway::new());
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();

        settle().await;
        advance(INTERVAL).await;
        settle().await;

        let state = resource.state();
        assert!(state.data.is_none());
        assert_eq!(state.error.as_deref(), Some("unscripted"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_data_and_success_clears_error() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_dashboard(ApiResult::ok(snapshot(1.0)), Duration::ZERO);
        gateway.push_dashboard(ApiResult::failure("HTTP 500: boom"), Duration::ZERO);
        gateway.push_dashboard(ApiResult::ok(snapshot(2.0)), Duration::ZERO);
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();

        settle().await;
        assert_eq!(pm25(&resource.state()), Some(1.0));

        advance(INTERVAL).await;
        settle().await;
        let state = resource.state();
        assert_eq!(state.error.as_deref(), Some("HTTP 500: boom"));
        assert_eq!(pm25(&state), Some(1.0));

        advance(INTERVAL).await;
        settle().await;
        let state = resource.state();
        assert!(state.error.is_none());
        assert_eq!(pm25(&state), Some(2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn not_implemented_surfaces_message_and_fixture() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.always_dashboard(
            ApiResult::not_implemented("Dashboard endpoint not yet implemented")
                .with_data(fixtures::dashboard_snapshot()),
        );
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;

        let state = resource.state();
        assert!(state.not_implemented);
        assert_eq!(
            state.error.as_deref(),
            Some("Dashboard endpoint not yet implemented")
        );
        assert_eq!(pm25(&state), Some(14.5));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_fixture_is_flagged_without_error() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.always_dashboard(ApiResult::fallback(fixtures::dashboard_snapshot()));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;

        let state = resource.state();
        assert!(state.not_implemented);
        assert!(state.error.is_none());
        assert!(state.has_data());
    }

    #[tokio::test(start_paused = true)]
    async fn switching_device_restarts_polling_for_new_key() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.always_dashboard(ApiResult::ok(snapshot(3.0)));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;

        resource.set_device(esp(2));
        settle().await;
        assert_eq!(
            gateway.calls(),
            vec![
                Call::Dashboard("ESP32_001".into()),
                Call::Dashboard("ESP32_002".into()),
            ]
        );

        // Same device again changes nothing.
        resource.set_device(esp(2));
        settle().await;
        assert_eq!(gateway.call_count(), 2);

        resource.set_device(None);
        assert_eq!(resource.state().error.as_deref(), Some(NO_DEVICE_MESSAGE));
        advance(INTERVAL * 4).await;
        settle().await;
        assert_eq!(gateway.call_count(), 2);
        assert!(!resource.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn response_for_previous_device_is_discarded() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_dashboard(ApiResult::ok(snapshot(1.0)), Duration::from_secs(2));
        gateway.push_dashboard(ApiResult::ok(snapshot(2.0)), Duration::ZERO);
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;

        resource.set_device(esp(2));
        settle().await;
        assert_eq!(pm25(&resource.state()), Some(2.0));

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(pm25(&resource.state()), Some(2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_newer_than_slow_poll_wins() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_dashboard(ApiResult::ok(snapshot(1.0)), Duration::from_secs(3));
        gateway.push_dashboard(ApiResult::ok(snapshot(2.0)), Duration::from_millis(100));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;
        assert_eq!(gateway.call_count(), 1);

        resource.refetch();
        settle().await;
        advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(pm25(&resource.state()), Some(2.0));

        // The slow poll resolves last and is dropped.
        advance(Duration::from_secs(3)).await;
        settle().await;
        let state = resource.state();
        assert_eq!(pm25(&state), Some(2.0));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_marks_loading_and_keeps_data() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.always_dashboard(ApiResult::ok(snapshot(4.0)));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;

        resource.refetch();
        let state = resource.state();
        assert!(state.loading);
        assert_eq!(pm25(&state), Some(4.0));
        assert!(!state.show_spinner());

        settle().await;
        assert!(!resource.state().loading);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_after_drop_is_ignored() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.push_dashboard(ApiResult::ok(snapshot(9.0)), Duration::from_secs(1));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        settle().await;

        let stream = resource.subscribe();
        drop(resource);
        advance(Duration::from_secs(1)).await;
        settle().await;

        assert!(stream.latest().data.is_none());
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_settled_state() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.always_dashboard(ApiResult::ok(snapshot(5.0)));
        let resource = DashboardResource::new(Arc::clone(&gateway), esp(1), INTERVAL).unwrap();
        let mut stream = resource.subscribe();
        assert!(stream.current().loading);

        settle().await;
        let snap = stream.changed().await.unwrap();
        assert_eq!(pm25(&snap), Some(5.0));
        assert_eq!(pm25(stream.current()), Some(5.0));
    }
}
