//! Error types for the attendance client core.
//!
//! Every failure a submission attempt can hit is a variant here; the
//! controller converts them into a single `Error(message)` UI state, so the
//! `Display` text is what the user ultimately sees.

use std::fmt;

use thiserror::Error;

/// Runtime permissions the capture flow depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Camera,
    Location,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Camera => write!(f, "camera"),
            Permission::Location => write!(f, "location"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} permission has not been granted")]
    PermissionDenied(Permission),

    #[error("current location is unavailable")]
    LocationUnavailable,

    #[error("location is outside every allowed zone")]
    GeofenceViolation,

    #[error("no photo has been captured yet")]
    NoImageCaptured,

    // `source` is a plain identifier string, not an error source. Declared as a
    // raw identifier so thiserror does not match the name `source` and try to
    // treat it as the variant's `std::error::Error` source (String is not one).
    #[error("failed to decode image '{source}': {reason}")]
    ImageDecode { r#source: String, reason: String },

    /// Logical failure flag in a 2xx response; carries the server's message.
    #[error("{0}")]
    ServerRejected(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => Error::Transport(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
