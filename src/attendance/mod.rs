mod controller;
mod state;

pub use controller::{AttendanceController, PermissionSet};
pub use state::SubmissionState;
