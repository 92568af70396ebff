pub mod api;
pub mod attendance;
pub mod capture;
pub mod error;
pub mod geofence;
pub mod imaging;
pub mod location;
pub mod records;
pub mod session;
pub mod visibility;

pub use api::{ApiClient, AttendanceApi, AttendanceRequest, AuthProvider, Envelope};
pub use attendance::{AttendanceController, PermissionSet, SubmissionState};
pub use capture::{CameraCapture, CapturedImage};
pub use error::{Error, Permission, Result};
pub use geofence::{evaluate, AllowedZone, Coordinate, GeofenceResult};
pub use imaging::{ensure_data_uri, normalize, NormalizeOptions, NormalizedPayload};
pub use location::{LocationFix, LocationProvider, LocationTracker};
pub use records::{reconcile, AttendanceRecord, RecordKind, TodayRecords};
pub use session::SessionStore;
pub use visibility::{HeaderVisibility, VisibilityConfig};
