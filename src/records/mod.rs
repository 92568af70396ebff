use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod reconcile;
mod timestamp;

pub use reconcile::{reconcile, TodayRecords};
pub use timestamp::parse_server_time;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    CheckIn,
    CheckOut,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::CheckIn => "check_in",
            RecordKind::CheckOut => "check_out",
        }
    }

    /// Map the type strings seen on historical payloads onto the canonical
    /// kinds. Unknown spellings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "check_in" | "checkin" | "check-in" | "in" => Some(RecordKind::CheckIn),
            "check_out" | "checkout" | "check-out" | "out" => Some(RecordKind::CheckOut),
            _ => None,
        }
    }
}

/// One attendance entry as tracked for the current day. `id == None` means
/// "not yet recorded today". Replaced wholesale on every successful fetch or
/// submit; fields are never merged individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Option<String>,
    pub email: Option<String>,
    /// Display-ready value: a data-URI or an http(s) URL.
    pub image: Option<String>,
    pub location: Option<String>,
    pub timestamp_raw: Option<String>,
    pub kind: RecordKind,
    pub status: Option<String>,
}

impl AttendanceRecord {
    pub fn is_recorded(&self) -> bool {
        self.id.is_some()
    }

    /// Parsed server timestamp; `None` when absent or unparseable, in which
    /// case the UI falls back to the live clock.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp_raw.as_deref().and_then(parse_server_time)
    }
}
