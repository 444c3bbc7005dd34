// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for xhrgate
//!
//! Three kinds of failure reach the caller: a deduplication cancellation
//! (not a real failure), an application-level rejection from the response
//! envelope, and a transport-level failure. Rejections carry a
//! [`NormalizedError`] whose delayed notice the caller may suppress.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::dedup::Fingerprint;
use crate::notify::DelayedNotice;

/// Result type alias for xhrgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection value of a request cancelled by a newer duplicate
pub const CANCELLED_SENTINEL: &str = "request was cancelled";

/// Main error type for xhrgate
#[derive(Error, Debug)]
pub enum Error {
    /// Superseded by a newer request with the same fingerprint
    #[error("request was cancelled")]
    Cancelled { fingerprint: Fingerprint },

    /// Server or transport signalled failure
    #[error("{0}")]
    Rejected(NormalizedError),

    /// Session expired; re-authentication has been triggered
    #[error("re-authentication required")]
    ReauthRequired { login_url: Option<String> },

    /// Authorization failure reported without a message (status 499)
    #[error("permission denied")]
    PermissionDenied,

    /// HTTP client construction failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a deduplication cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Check if re-authentication was triggered
    pub fn is_reauth_required(&self) -> bool {
        matches!(self, Error::ReauthRequired { .. })
    }

    /// Get the normalized rejection, if any
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Error::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Get the status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Rejected(err) => err.status,
            Error::ReauthRequired { .. } => Some(401),
            Error::PermissionDenied => Some(499),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Suppress the pending notice of a rejection. No-op for other errors.
    pub fn hide_normal_error(&self) {
        if let Error::Rejected(err) = self {
            err.hide_normal_error();
        }
    }
}

/// Uniform shape of a rejected request
#[derive(Debug)]
pub struct NormalizedError {
    /// User-facing message
    pub message: String,
    /// HTTP status or envelope code
    pub status: Option<u16>,
    /// Original response data
    pub data: Option<Value>,
    notice: DelayedNotice,
}

impl NormalizedError {
    /// Create a normalized error with its scheduled notice
    pub fn new(
        message: impl Into<String>,
        status: Option<u16>,
        data: Option<Value>,
        notice: DelayedNotice,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            data,
            notice,
        }
    }

    /// Prevent the default notice from being shown
    pub fn hide_normal_error(&self) {
        self.notice.suppress();
    }

    /// Get the notice handle
    pub fn notice(&self) -> &DelayedNotice {
        &self.notice
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn test_cancelled_displays_sentinel() {
        let err = Error::Cancelled {
            fingerprint: Fingerprint::of(&Method::GET, "/a", None, None),
        };
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), CANCELLED_SENTINEL);
        assert!(err.normalized().is_none());
    }

    #[test]
    fn test_rejected_error() {
        let err = Error::Rejected(NormalizedError::new(
            "Requested resource not found:\n/a",
            Some(404),
            None,
            DelayedNotice::disabled(),
        ));
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains("/a"));

        err.hide_normal_error();
        assert!(!err.normalized().unwrap().notice().is_visible());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::PermissionDenied.status_code(), Some(499));
        assert_eq!(Error::ReauthRequired { login_url: None }.status_code(), Some(401));
        assert_eq!(Error::config("bad").status_code(), None);
    }
}
