//! Error types shared across the client.
//!
//! Exchange-reported failures (`"status": "error"` bodies) are
//! not part of [`HbdmError`]; they arrive as well-formed JSON and are
//! classified by [`crate::reply::ExchangeReply`] instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HbdmError {
    /// A required credential was not present in the process environment.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// The target URL could not be parsed or has no host.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HMAC key setup failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Network, DNS, TLS or timeout failure. Never retried here.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Order parameters rejected before anything was sent.
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

pub type Result<T> = std::result::Result<T, HbdmError>;
