//! Response envelope normalization. The backend wraps every payload in a
//! `{success, message, data}` envelope but has used several spellings for
//! each key over time.

use serde_json::Value;

const SUCCESS_KEYS: &[&str] = &["success", "ok", "status"];
const MESSAGE_KEYS: &[&str] = &["message", "msg", "error"];
const DATA_KEYS: &[&str] = &["data", "result", "record", "attendance", "item"];

#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl Envelope {
    /// Resolve the envelope from a raw response body. The first alias present
    /// decides each slot; a body with no recognizable success flag counts as
    /// a failure.
    pub fn from_value(value: &Value) -> Self {
        let success = SUCCESS_KEYS
            .iter()
            .find_map(|key| value.get(*key))
            .map(success_flag)
            .unwrap_or(false);
        let message = MESSAGE_KEYS
            .iter()
            .filter_map(|key| value.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string);
        let data = DATA_KEYS
            .iter()
            .filter_map(|key| value.get(*key))
            .find(|v| !v.is_null())
            .cloned();

        Self {
            success,
            message,
            data,
        }
    }
}

fn success_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "success" | "ok" | "true"
        ),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}
