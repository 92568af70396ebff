use std::sync::Arc;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::time::Duration;
use uuid::Uuid;

use crate::api::{AttendanceApi, AttendanceRequest, Envelope};
use crate::capture::{CameraCapture, CapturedImage};
use crate::error::{Error, Permission, Result};
use crate::geofence::{evaluate, AllowedZone, Coordinate};
use crate::imaging::{normalize, NormalizeOptions};
use crate::location::{LocationFix, LocationProvider, LocationTracker, DEFAULT_POLL_INTERVAL};
use crate::records::{reconcile, RecordKind, TodayRecords};

use super::SubmissionState;

/// Runtime permission grants reported by the embedding shell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub camera: bool,
    pub location: bool,
}

struct ControllerInner {
    permissions: PermissionSet,
    captured: Option<CapturedImage>,
}

/// Orchestrates one check-in/check-out attempt end to end: permission gating,
/// location fetch, geofence check, camera capture, image normalization,
/// network submit, and the today-record refetch on success.
///
/// The controller is the sole writer of its three `watch` channels (submission
/// state, reconciled record pair, capture-surface flag); UI layers subscribe
/// and re-render on change. Single-flight across attempts is the UI's
/// button-disable contract, not enforced here.
pub struct AttendanceController {
    api: Arc<dyn AttendanceApi>,
    camera: Arc<dyn CameraCapture>,
    location: Arc<dyn LocationProvider>,
    zones: Arc<Vec<AllowedZone>>,
    normalize_options: NormalizeOptions,
    poll_interval: Duration,
    inner: Arc<Mutex<ControllerInner>>,
    tracker: Arc<Mutex<LocationTracker>>,
    fix_tx: watch::Sender<Option<LocationFix>>,
    state_tx: watch::Sender<SubmissionState>,
    records_tx: watch::Sender<TodayRecords>,
    capture_open_tx: watch::Sender<bool>,
}

impl AttendanceController {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        camera: Arc<dyn CameraCapture>,
        location: Arc<dyn LocationProvider>,
        zones: Vec<AllowedZone>,
    ) -> Self {
        let (fix_tx, _) = watch::channel(None);
        let (state_tx, _) = watch::channel(SubmissionState::Idle);
        let (records_tx, _) = watch::channel(TodayRecords::default());
        let (capture_open_tx, _) = watch::channel(false);

        Self {
            api,
            camera,
            location,
            zones: Arc::new(zones),
            normalize_options: NormalizeOptions::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            inner: Arc::new(Mutex::new(ControllerInner {
                permissions: PermissionSet::default(),
                captured: None,
            })),
            tracker: Arc::new(Mutex::new(LocationTracker::new())),
            fix_tx,
            state_tx,
            records_tx,
            capture_open_tx,
        }
    }

    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize_options = options;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_records(&self) -> watch::Receiver<TodayRecords> {
        self.records_tx.subscribe()
    }

    pub fn subscribe_capture_open(&self) -> watch::Receiver<bool> {
        self.capture_open_tx.subscribe()
    }

    pub fn current_fix(&self) -> Option<LocationFix> {
        self.fix_tx.borrow().clone()
    }

    pub async fn set_permissions(&self, permissions: PermissionSet) {
        self.inner.lock().await.permissions = permissions;
    }

    /// Begin polling the location provider. Requires the location permission.
    pub async fn start_location_updates(&self) -> Result<()> {
        if !self.inner.lock().await.permissions.location {
            return Err(Error::PermissionDenied(Permission::Location));
        }
        self.tracker.lock().await.start(
            self.location.clone(),
            self.zones.clone(),
            self.fix_tx.clone(),
            self.poll_interval,
        );
        Ok(())
    }

    pub async fn stop_location_updates(&self) {
        self.tracker.lock().await.stop().await;
    }

    /// Manual injection path for shells that own their own location plumbing:
    /// evaluates the geofence and publishes the fix like a poll tick would.
    pub fn update_location(&self, coordinate: Coordinate, address: Option<String>) {
        let fix = LocationFix {
            geofence: evaluate(&coordinate, &self.zones),
            coordinate,
            address,
            acquired_at: chrono::Utc::now(),
        };
        self.fix_tx.send_replace(Some(fix));
    }

    /// Store a photo taken by an externally-driven capture surface.
    pub async fn store_capture(&self, image: CapturedImage) {
        self.inner.lock().await.captured = Some(image);
    }

    pub async fn check_in(&self, address: Option<String>) -> Result<()> {
        self.capture_and_submit(RecordKind::CheckIn, address).await
    }

    pub async fn check_out(&self, address: Option<String>) -> Result<()> {
        self.capture_and_submit(RecordKind::CheckOut, address).await
    }

    /// Open the capture surface, drive the camera, and submit the photo. A
    /// dismissed camera cancels the whole flow.
    pub async fn capture_and_submit(
        &self,
        kind: RecordKind,
        address: Option<String>,
    ) -> Result<()> {
        self.capture_open_tx.send_replace(true);
        match self.camera.capture().await {
            Ok(Some(image)) => {
                self.store_capture(image).await;
                self.submit(kind, address).await
            }
            Ok(None) => {
                info!("capture dismissed before a photo was taken");
                self.cancel_capture().await;
                Ok(())
            }
            Err(err) => {
                error!("camera capture failed: {err}");
                self.state_tx.send_replace(SubmissionState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Run one submission attempt. Entry conditions are all checked before
    /// any network call; on success the capture surface closes and the today
    /// records are refetched. On failure the surface stays open so the user
    /// can read the error overlay and retry or cancel.
    pub async fn submit(&self, kind: RecordKind, address: Option<String>) -> Result<()> {
        let attempt = Uuid::new_v4();
        self.state_tx.send_replace(SubmissionState::Loading);

        match self.run_submit(kind, address, attempt).await {
            Ok(message) => {
                info!("attempt {attempt}: {} accepted", kind.as_str());
                self.state_tx.send_replace(SubmissionState::Success(message));
                self.capture_open_tx.send_replace(false);
                if let Err(err) = self.fetch_today().await {
                    warn!("attempt {attempt}: today refetch after submit failed: {err}");
                }
                Ok(())
            }
            Err(err) => {
                error!("attempt {attempt}: {} failed: {err}", kind.as_str());
                self.state_tx.send_replace(SubmissionState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    async fn run_submit(
        &self,
        kind: RecordKind,
        address: Option<String>,
        attempt: Uuid,
    ) -> Result<String> {
        let (permissions, captured) = {
            let inner = self.inner.lock().await;
            (inner.permissions, inner.captured.clone())
        };
        if !permissions.camera {
            return Err(Error::PermissionDenied(Permission::Camera));
        }
        if !permissions.location {
            return Err(Error::PermissionDenied(Permission::Location));
        }
        let fix = self
            .fix_tx
            .borrow()
            .clone()
            .ok_or(Error::LocationUnavailable)?;
        if !fix.geofence.is_valid {
            return Err(Error::GeofenceViolation);
        }
        let image = captured.ok_or(Error::NoImageCaptured)?;

        // Decode/encode stays off the orchestration thread
        let source = image.source.clone();
        let options = self.normalize_options.clone();
        let payload = tokio::task::spawn_blocking(move || normalize(&image, &options))
            .await
            .map_err(|err| Error::ImageDecode {
                source,
                reason: format!("image worker join failed: {err}"),
            })??;

        let location_text = address
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| fix.location_text());
        let request = AttendanceRequest {
            image: payload.data_uri,
            location: location_text,
            kind,
        };
        info!(
            "attempt {attempt}: submitting {} from '{}'",
            kind.as_str(),
            request.location
        );

        let response = self.api.submit_attendance(&request).await?;
        let envelope = Envelope::from_value(&response);
        if envelope.success {
            Ok(envelope
                .message
                .unwrap_or_else(|| "Attendance recorded".to_string()))
        } else {
            Err(Error::ServerRejected(envelope.message.unwrap_or_else(
                || "attendance submission failed".to_string(),
            )))
        }
    }

    /// Refetch today's record pair and replace both slots wholesale. Fetch
    /// failures surface through the Error state; success leaves the
    /// submission state alone so a just-observed Success is not clobbered.
    pub async fn fetch_today(&self) -> Result<()> {
        match self.run_fetch_today().await {
            Ok(records) => {
                info!(
                    "today loaded: in={}, out={}",
                    records.check_in.is_some(),
                    records.check_out.is_some()
                );
                self.records_tx.send_replace(records);
                Ok(())
            }
            Err(err) => {
                warn!("today fetch failed: {err}");
                self.state_tx.send_replace(SubmissionState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    async fn run_fetch_today(&self) -> Result<TodayRecords> {
        let response = self.api.fetch_today().await?;
        let envelope = Envelope::from_value(&response);
        if !envelope.success {
            return Err(Error::ServerRejected(envelope.message.unwrap_or_else(
                || "failed to load today's attendance".to_string(),
            )));
        }
        Ok(envelope
            .data
            .as_ref()
            .map(reconcile)
            .unwrap_or_default())
    }

    /// Abandon the capture flow: back to Idle, surface closed, pending photo
    /// dropped. The reconciled record pair is left untouched.
    pub async fn cancel_capture(&self) {
        self.state_tx.send_replace(SubmissionState::Idle);
        self.capture_open_tx.send_replace(false);
        self.inner.lock().await.captured = None;
    }

    /// Acknowledge a terminal Success/Error and return to Idle.
    pub fn reset_state(&self) {
        self.state_tx.send_replace(SubmissionState::Idle);
    }
}
