use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::Value;
use tracing::{debug, warn};
use vayu_api::ApiResult;

use super::{INTENSITY_MESSAGE, NO_DEVICE_MESSAGE};
use crate::gateway::Gateway;
use crate::model::DeviceId;
use crate::state::{ResourceState, Scope, Ticket};
use crate::stream::ResourceStream;

/// Imperative fan override for one device.
///
/// Never polls. Each call reports its own outcome and also lands in the
/// tracked state, whose `data` is the server's latest acknowledgement.
pub struct FanControl<G: Gateway> {
    gateway: Arc<G>,
    device: ArcSwapOption<DeviceId>,
    scope: Scope<Value>,
}

impl<G: Gateway> FanControl<G> {
    pub fn new(gateway: Arc<G>, device: Option<DeviceId>) -> Self {
        Self {
            gateway,
            device: ArcSwapOption::new(device.map(Arc::new)),
            scope: Scope::new(ResourceState::idle()),
        }
    }

    pub fn state(&self) -> ResourceState<Value> {
        self.scope.snapshot()
    }

    pub fn subscribe(&self) -> ResourceStream<Value> {
        self.scope.subscribe()
    }

    pub fn device(&self) -> Option<DeviceId> {
        self.device.load_full().map(|d| (*d).clone())
    }

    pub fn set_device(&self, device: Option<DeviceId>) {
        self.device.store(device.map(Arc::new));
    }

    /// Force the fan on or off at `intensity` percent.
    pub async fn set_override(&self, fan_on: bool, intensity: u8) -> ApiResult<Value> {
        let Some(device) = self.device.load_full() else {
            return self.reject(NO_DEVICE_MESSAGE);
        };
        if intensity > 100 {
            return self.reject(INTENSITY_MESSAGE);
        }

        let ticket = self.scope.begin_with(|s| s.error = None);
        debug!(device = %device, fan_on, intensity, "applying fan override");
        let result = self
            .gateway
            .apply_fan_override(device.as_str(), fan_on, intensity)
            .await;
        self.record(ticket, &result);
        result
    }

    /// Hand the fan back to automatic control.
    pub async fn clear_override(&self) -> ApiResult<Value> {
        let Some(device) = self.device.load_full() else {
            return self.reject(NO_DEVICE_MESSAGE);
        };

        let ticket = self.scope.begin_with(|s| s.error = None);
        debug!(device = %device, "releasing fan override");
        let result = self.gateway.release_fan_override(device.as_str()).await;
        self.record(ticket, &result);
        result
    }

    fn reject(&self, message: &str) -> ApiResult<Value> {
        self.scope.fail_fast(message);
        ApiResult::failure(message)
    }

    fn record(&self, ticket: Ticket, result: &ApiResult<Value>) {
        if let Some(error) = &result.error {
            warn!(error = %error, "fan control request failed");
        }
        self.scope.settle(ticket, |state| {
            state.not_implemented = result.not_implemented;
            if result.success {
                state.error = None;
                if let Some(ack) = &result.data {
                    state.data = Some(Arc::new(ack.clone()));
                }
            } else {
                state.error = result.error.clone();
            }
        });
    }
}

impl<G: Gateway> Drop for FanControl<G> {
    fn drop(&mut self) {
        self.scope.close();
    }
}
