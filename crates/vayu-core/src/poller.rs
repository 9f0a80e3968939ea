// ── Fixed-interval poller ──
//
// A driver task owns the timer; the `Poller` handle owns the controls.
// Schedule changes travel over a `watch` channel, the callback lives in an
// `ArcSwap` cell read at every tick, and a `CancellationToken` tears the
// driver down when the handle goes away.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::CoreError;

type TickFn = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

fn boxed<F, Fut>(callback: F) -> TickFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move || callback().boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Schedule {
    interval: Duration,
    enabled: bool,
    /// Bumped to force a fresh schedule without changing anything else.
    epoch: u64,
}

/// Invokes a callback immediately, then every `interval`, while enabled.
///
/// - Disabled pollers never invoke the callback.
/// - Enabling, changing the interval, or calling [`restart`](Self::restart)
///   discards the old schedule and fires immediately. Missed ticks are
///   skipped, never made up.
/// - Each tick runs the most recently supplied callback.
/// - Callback futures are spawned detached: a slow callback does not delay
///   the schedule, and teardown does not abort one already running. Their
///   failures are their own business.
/// - Dropping the handle cancels the schedule.
///
/// Must be created inside a tokio runtime.
pub struct Poller {
    callback: Arc<ArcSwap<TickFn>>,
    schedule: watch::Sender<Schedule>,
    cancel: CancellationToken,
}

impl Poller {
    pub fn spawn<F, Fut>(callback: F, interval: Duration, enabled: bool) -> Result<Self, CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        check_interval(interval)?;

        let callback = Arc::new(ArcSwap::from_pointee(boxed(callback)));
        let (schedule, rx) = watch::channel(Schedule {
            interval,
            enabled,
            epoch: 0,
        });
        let cancel = CancellationToken::new();

        tokio::spawn(drive(Arc::clone(&callback), rx, cancel.clone()));

        Ok(Self {
            callback,
            schedule,
            cancel,
        })
    }

    /// Replace the callback. The schedule is untouched; the next tick
    /// runs the new one.
    pub fn set_callback<F, Fut>(&self, callback: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callback.store(Arc::new(boxed(callback)));
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.schedule.send_if_modified(|s| {
            let changed = s.enabled != enabled;
            s.enabled = enabled;
            changed
        });
    }

    pub fn set_interval(&self, interval: Duration) -> Result<(), CoreError> {
        check_interval(interval)?;
        self.schedule.send_if_modified(|s| {
            let changed = s.interval != interval;
            s.interval = interval;
            changed
        });
        Ok(())
    }

    /// Enable (if needed) and start a fresh schedule with an immediate tick.
    pub fn restart(&self) {
        self.schedule.send_modify(|s| {
            s.enabled = true;
            s.epoch = s.epoch.wrapping_add(1);
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.schedule.borrow().enabled && !self.cancel.is_cancelled()
    }

    pub fn interval(&self) -> Duration {
        self.schedule.borrow().interval
    }

    /// Stop scheduling for good. Idempotent; also done on drop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn check_interval(interval: Duration) -> Result<(), CoreError> {
    if interval.is_zero() {
        return Err(CoreError::validation("poll interval must be greater than zero"));
    }
    Ok(())
}

fn fire(callback: &ArcSwap<TickFn>) {
    let tick = callback.load_full();
    tokio::spawn((*tick)());
}

async fn drive(
    callback: Arc<ArcSwap<TickFn>>,
    mut schedule: watch::Receiver<Schedule>,
    cancel: CancellationToken,
) {
    loop {
        let current = *schedule.borrow_and_update();

        if !current.enabled {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = schedule.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
            continue;
        }

        // First tick of a fresh interval completes immediately.
        let mut ticker = tokio::time::interval(current.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = schedule.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                _ = ticker.tick() => {
                    trace!(interval_ms = current.interval.as_millis(), "poll tick");
                    fire(&callback);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::settle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> futures_util::future::Ready<()> + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
            futures_util::future::ready(())
        })
    }

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn disabled_poller_never_fires() {
        let (count, cb) = counter();
        let poller = Poller::spawn(cb, SECOND, false).unwrap();

        settle().await;
        tokio::time::advance(SECOND * 10).await;
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!poller.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_immediately_then_each_interval() {
        let (count, cb) = counter();
        let _poller = Poller::spawn(cb, SECOND * 5, true).unwrap();

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(4_999)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::advance(SECOND * 5).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_fires_immediately() {
        let (count, cb) = counter();
        let poller = Poller::spawn(cb, SECOND * 5, false).unwrap();
        settle().await;

        poller.set_enabled(true);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        poller.set_enabled(false);
        settle().await;
        tokio::time::advance(SECOND * 30).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn next_tick_uses_latest_callback() {
        let (old_count, old_cb) = counter();
        let (new_count, new_cb) = counter();
        let poller = Poller::spawn(old_cb, SECOND, true).unwrap();
        settle().await;
        assert_eq!(old_count.load(Ordering::SeqCst), 1);

        poller.set_callback(new_cb);
        tokio::time::advance(SECOND).await;
        settle().await;

        assert_eq!(old_count.load(Ordering::SeqCst), 1);
        assert_eq!(new_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_restarts_schedule() {
        let (count, cb) = counter();
        let poller = Poller::spawn(cb, SECOND * 10, true).unwrap();
        settle().await;
        tokio::time::advance(SECOND * 4).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        poller.set_interval(SECOND * 2).unwrap();
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::advance(SECOND * 2).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        // Same value again is not a change.
        poller.set_interval(SECOND * 2).unwrap();
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_fires_immediately() {
        let (count, cb) = counter();
        let poller = Poller::spawn(cb, SECOND * 10, true).unwrap();
        settle().await;

        poller.restart();
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_schedule() {
        let (count, cb) = counter();
        let poller = Poller::spawn(cb, SECOND, true).unwrap();
        settle().await;
        drop(poller);

        tokio::time::advance(SECOND * 10).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_idempotent() {
        let (count, cb) = counter();
        let poller = Poller::spawn(cb, SECOND, true).unwrap();
        settle().await;
        poller.shutdown();
        poller.shutdown();
        assert!(!poller.is_enabled());

        tokio::time::advance(SECOND * 3).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let (_, cb) = counter();
        assert!(matches!(
            Poller::spawn(cb, Duration::ZERO, true),
            Err(CoreError::Validation { .. })
        ));
    }
}
