//! Auth token handling: an injectable token holder for the HTTP client and
//! JWT payload claim extraction.

use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// Shared token holder injected into whatever issues HTTP requests.
///
/// Contract: `set_token` on login, `clear` on logout. Clones share the same
/// underlying slot, so the client picks up a new token immediately.
#[derive(Clone, Default)]
pub struct AuthProvider {
    token: Arc<RwLock<Option<String>>>,
}

impl AuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.set_token(token);
        provider
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap() = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
pub fn decode_jwt_payload(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Resolve the user id from the common claim spellings, nested `user.id`
/// last.
pub fn extract_user_id(token: &str) -> Option<String> {
    let payload = decode_jwt_payload(token)?;
    ["sub", "userId", "id"]
        .iter()
        .find_map(|key| non_empty(payload.get(*key)))
        .or_else(|| non_empty(payload.get("user").and_then(|user| user.get("id"))))
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    let raw = value?.as_str()?.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}
