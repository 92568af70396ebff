//! Background polling loop that turns the location provider into a stream of
//! geofence-evaluated fixes.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{LocationFix, LocationProvider};
use crate::error::Result;
use crate::geofence::{evaluate, AllowedZone, Coordinate};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
const FIX_TIMEOUT_SECS: u64 = 10;

/// Owns the polling task. Fixes are published on the `watch` channel handed
/// to `start`; `None` means no usable fix right now.
pub struct LocationTracker {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Spawn the polling loop, replacing any previous one.
    pub fn start(
        &mut self,
        provider: Arc<dyn LocationProvider>,
        zones: Arc<Vec<AllowedZone>>,
        fix_tx: watch::Sender<Option<LocationFix>>,
        poll_interval: Duration,
    ) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        self.handle = Some(tokio::spawn(poll_loop(
            provider,
            zones,
            fix_tx,
            poll_interval,
            token_clone,
        )));
        self.cancel_token = Some(cancel_token);
    }

    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!("location loop task failed to join: {err}");
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

async fn poll_loop(
    provider: Arc<dyn LocationProvider>,
    zones: Arc<Vec<AllowedZone>>,
    fix_tx: watch::Sender<Option<LocationFix>>,
    poll_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let fut = acquire_fix(provider.as_ref(), &zones);
                match timeout(Duration::from_secs(FIX_TIMEOUT_SECS), fut).await {
                    Ok(Ok(Some(fix))) => {
                        fix_tx.send_replace(Some(fix));
                    }
                    Ok(Ok(None)) => {
                        warn!("location provider returned no fix");
                        fix_tx.send_replace(None);
                    }
                    Ok(Err(err)) => {
                        warn!("location fix failed: {err}");
                        fix_tx.send_replace(None);
                    }
                    Err(_) => {
                        warn!("location fix timeout (> {FIX_TIMEOUT_SECS}s)");
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("location loop shutting down");
                break;
            }
        }
    }
}

async fn acquire_fix(
    provider: &dyn LocationProvider,
    zones: &[AllowedZone],
) -> Result<Option<LocationFix>> {
    let Some(coordinate) = provider.current_location().await? else {
        return Ok(None);
    };
    Ok(Some(build_fix(provider, coordinate, zones).await))
}

async fn build_fix(
    provider: &dyn LocationProvider,
    coordinate: Coordinate,
    zones: &[AllowedZone],
) -> LocationFix {
    let address = provider.reverse_geocode(&coordinate).await;
    LocationFix {
        coordinate,
        address,
        geofence: evaluate(&coordinate, zones),
        acquired_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        coordinate: Option<Coordinate>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LocationProvider for ScriptedProvider {
        async fn current_location(&self) -> Result<Option<Coordinate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.coordinate)
        }

        async fn reverse_geocode(&self, _point: &Coordinate) -> Option<String> {
            Some("16 Ly Thuong Kiet".to_string())
        }
    }

    fn zones() -> Arc<Vec<AllowedZone>> {
        Arc::new(vec![AllowedZone::new(
            "Head office",
            16.063_462_3,
            108.170_192,
            300,
        )])
    }

    #[tokio::test]
    async fn loop_publishes_an_evaluated_fix() {
        let provider = Arc::new(ScriptedProvider {
            coordinate: Some(Coordinate::new(16.063_462_3, 108.170_192)),
            calls: AtomicUsize::new(0),
        });
        let (fix_tx, mut fix_rx) = watch::channel(None);

        let mut tracker = LocationTracker::new();
        tracker.start(provider, zones(), fix_tx, Duration::from_millis(10));

        fix_rx.changed().await.unwrap();
        let fix = fix_rx.borrow().clone().unwrap();
        assert!(fix.geofence.is_valid);
        assert_eq!(fix.address.as_deref(), Some("16 Ly Thuong Kiet"));

        tracker.stop().await;
        assert!(!tracker.is_running());
    }

    #[tokio::test]
    async fn missing_fix_publishes_none() {
        let provider = Arc::new(ScriptedProvider {
            coordinate: None,
            calls: AtomicUsize::new(0),
        });
        let (fix_tx, mut fix_rx) = watch::channel(Some(LocationFix {
            coordinate: Coordinate::new(0.0, 0.0),
            address: None,
            geofence: evaluate(&Coordinate::new(0.0, 0.0), &[]),
            acquired_at: Utc::now(),
        }));

        let mut tracker = LocationTracker::new();
        tracker.start(provider, zones(), fix_tx, Duration::from_millis(10));

        fix_rx.changed().await.unwrap();
        assert!(fix_rx.borrow().is_none());
        tracker.stop().await;
    }
}
