//! Shape normalization for the server's "today" payload.
//!
//! The backend has shipped several generations of field names; this module
//! maps all of them onto the canonical record pair. Parsing is tolerant by
//! default: absent or malformed fields become `None`, never errors.

use log::debug;
use serde_json::{Map, Value};
use serde::{Deserialize, Serialize};

use super::{AttendanceRecord, RecordKind};
use crate::imaging::display_image;

const CHECK_IN_KEYS: &[&str] = &["checkIn", "check_in"];
const CHECK_OUT_KEYS: &[&str] = &["checkOut", "check_out"];

const ID_KEYS: &[&str] = &["_id", "id"];
const IMAGE_KEYS: &[&str] = &["image", "avatar", "imageUrl", "photo"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "time", "createdAt", "date"];
const LOCATION_KEYS: &[&str] = &["location", "address", "place"];

/// The canonical record pair for the current day. Either slot may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayRecords {
    pub check_in: Option<AttendanceRecord>,
    pub check_out: Option<AttendanceRecord>,
}

impl TodayRecords {
    /// The most recent of the two entries, check-out preferred.
    pub fn latest(&self) -> Option<&AttendanceRecord> {
        self.check_out.as_ref().or(self.check_in.as_ref())
    }
}

/// Map a loosely-structured "today" data object onto the record pair.
///
/// A sub-record counts as present iff its id resolves through the alias
/// list; everything else degrades to `None` field by field. Image values go
/// through the display passthrough rule so the UI receives something it can
/// render directly.
pub fn reconcile(payload: &Value) -> TodayRecords {
    let Some(object) = payload.as_object() else {
        debug!("today payload is not an object; treating as empty");
        return TodayRecords::default();
    };
    let email = string_field(object, &["email"]);

    TodayRecords {
        check_in: sub_record(object, CHECK_IN_KEYS, RecordKind::CheckIn, email.as_deref()),
        check_out: sub_record(object, CHECK_OUT_KEYS, RecordKind::CheckOut, email.as_deref()),
    }
}

fn sub_record(
    parent: &Map<String, Value>,
    keys: &[&str],
    kind: RecordKind,
    email: Option<&str>,
) -> Option<AttendanceRecord> {
    let sub = keys
        .iter()
        .filter_map(|key| parent.get(*key))
        .find_map(Value::as_object)?;
    let id = string_field(sub, ID_KEYS)?;

    Some(AttendanceRecord {
        id: Some(id),
        email: email.map(str::to_string),
        image: display_image(string_field(sub, IMAGE_KEYS).as_deref()),
        location: string_field(sub, LOCATION_KEYS),
        timestamp_raw: string_field(sub, TIMESTAMP_KEYS),
        kind,
        status: string_field(sub, &["status"]),
    })
}

/// First non-empty value across the alias list. Strings are trimmed; numbers
/// are stringified (older payloads carried numeric ids).
fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(non_empty_string)
}

fn non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_payload_maps_both_slots() {
        let payload = json!({
            "email": "an@visgroup.vn",
            "checkIn": {
                "_id": "in-1",
                "image": "aW1n",
                "location": "16 Ly Thuong Kiet",
                "timestamp": "2025-08-04T01:30:15.000Z"
            },
            "checkOut": {
                "_id": "out-1",
                "image": "https://cdn.example.com/out.jpg",
                "timestamp": "2025-08-04T10:02:00Z"
            }
        });

        let records = reconcile(&payload);
        let check_in = records.check_in.as_ref().unwrap();
        assert_eq!(check_in.id.as_deref(), Some("in-1"));
        assert_eq!(check_in.email.as_deref(), Some("an@visgroup.vn"));
        assert_eq!(
            check_in.image.as_deref(),
            Some("data:image/jpeg;base64,aW1n")
        );
        assert!(check_in.timestamp().is_some());

        let check_out = records.check_out.as_ref().unwrap();
        assert_eq!(
            check_out.image.as_deref(),
            Some("https://cdn.example.com/out.jpg")
        );
        assert_eq!(records.latest().unwrap().id.as_deref(), Some("out-1"));
    }

    #[test]
    fn alias_only_payload_still_resolves() {
        let payload = json!({
            "check_in": {
                "id": "x",
                "photo": "abc",
                "place": "warehouse",
                "createdAt": "2025-08-04T01:30:15Z"
            }
        });

        let records = reconcile(&payload);
        let check_in = records.check_in.unwrap();
        assert_eq!(check_in.id.as_deref(), Some("x"));
        assert_eq!(check_in.image.as_deref(), Some("data:image/jpeg;base64,abc"));
        assert_eq!(check_in.location.as_deref(), Some("warehouse"));
        assert!(check_in.timestamp().is_some());
    }

    #[test]
    fn absent_sub_record_yields_none() {
        let payload = json!({ "email": "an@visgroup.vn" });
        let records = reconcile(&payload);
        assert!(records.check_in.is_none());
        assert!(records.check_out.is_none());
        assert!(records.latest().is_none());
    }

    #[test]
    fn sub_record_without_id_counts_as_not_recorded() {
        let payload = json!({
            "checkIn": { "image": "abc", "location": "somewhere" }
        });
        assert!(reconcile(&payload).check_in.is_none());
    }

    #[test]
    fn alias_priority_takes_first_non_empty() {
        let payload = json!({
            "checkIn": { "_id": "", "id": "fallback", "image": "", "avatar": "av" }
        });
        let check_in = reconcile(&payload).check_in.unwrap();
        assert_eq!(check_in.id.as_deref(), Some("fallback"));
        assert_eq!(check_in.image.as_deref(), Some("data:image/jpeg;base64,av"));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let payload = json!({ "checkIn": { "id": 42 } });
        assert_eq!(
            reconcile(&payload).check_in.unwrap().id.as_deref(),
            Some("42")
        );
    }

    #[test]
    fn non_object_payload_is_empty_not_a_crash() {
        assert_eq!(reconcile(&json!(null)), TodayRecords::default());
        assert_eq!(reconcile(&json!([1, 2])), TodayRecords::default());
    }

    #[test]
    fn unparseable_timestamp_degrades_to_none() {
        let payload = json!({
            "checkIn": { "_id": "a", "timestamp": "not-a-date" }
        });
        let check_in = reconcile(&payload).check_in.unwrap();
        assert_eq!(check_in.timestamp_raw.as_deref(), Some("not-a-date"));
        assert!(check_in.timestamp().is_none());
    }
}
