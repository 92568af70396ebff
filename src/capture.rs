//! Camera boundary: the OS capture surface lives outside the crate and hands
//! raw photo bytes across this trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// A raw photo as produced by the camera. Consumed exactly once by the image
/// normalizer and discarded after encoding.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Identifier used in error messages and log lines (file name, "camera").
    pub source: String,
    /// Encoded photo bytes exactly as the camera wrote them.
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    pub fn from_bytes(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self {
            source: path.display().to_string(),
            bytes,
        })
    }
}

#[async_trait]
pub trait CameraCapture: Send + Sync {
    /// Run the capture surface. `None` means the user dismissed it without
    /// taking a photo.
    async fn capture(&self) -> Result<Option<CapturedImage>>;
}
