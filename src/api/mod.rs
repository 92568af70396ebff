use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub mod auth;
pub mod client;
mod response;

pub use auth::AuthProvider;
pub use client::{ApiClient, LoginOutcome, User};
pub use response::Envelope;

use crate::error::Result;
use crate::records::RecordKind;

/// Body of `POST /attendance`.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRequest {
    /// Self-describing data-URI produced by the image normalizer.
    pub image: String,
    /// Human-readable address, or the coordinate-derived fallback string.
    pub location: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
}

/// The attendance endpoints the submission flow depends on. Responses are
/// raw JSON: field aliasing is resolved downstream by [`Envelope`] and the
/// record reconciler, so fakes in tests can replay any historical shape.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn fetch_today(&self) -> Result<Value>;
    async fn submit_attendance(&self, request: &AttendanceRequest) -> Result<Value>;
}
