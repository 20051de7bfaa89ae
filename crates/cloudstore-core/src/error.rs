//! Error types shared by every filestore backend.
//!
//! All public API surfaces in the workspace return `FilestoreResult<T>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias.
pub type FilestoreResult<T> = Result<T, FilestoreError>;

/// Broad classification of a filestore failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilestoreErrorKind {
    /// The request could not be built or sent (bad URL, DNS, refused, timeout).
    Transport,
    /// The caller's content stream or the response body could not be fully read.
    Io,
    /// The backend answered with a failure status.
    Backend,
    /// Authentication was rejected or the login handshake failed (HTTP 401/403).
    Auth,
    /// The target item does not exist (HTTP 404).
    NotFound,
    /// The `FileModel` or configuration is missing something the operation needs.
    InvalidRequest,
    /// (De)serialization error.
    Serialization,
}

impl fmt::Display for FilestoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured error returned by every capability call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilestoreError {
    pub kind: FilestoreErrorKind,
    pub message: String,
    /// HTTP status reported by the backend, if any.
    pub status: Option<u16>,
    /// Backend-specific error code (e.g. `-2130575338, Microsoft.SharePoint.SPException`).
    pub backend_code: Option<String>,
}

impl fmt::Display for FilestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        if let Some(ref code) = self.backend_code {
            write!(f, " (backend: {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for FilestoreError {}

impl FilestoreError {
    pub fn new(kind: FilestoreErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            status: None,
            backend_code: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(FilestoreErrorKind::Transport, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(FilestoreErrorKind::Io, msg)
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::new(FilestoreErrorKind::Backend, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(FilestoreErrorKind::Auth, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(FilestoreErrorKind::NotFound, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(FilestoreErrorKind::InvalidRequest, msg)
    }

    /// Required `FileModel` field was empty.
    pub fn missing_field(operation: &str, field: &str) -> Self {
        Self::invalid_request(format!("{} requires `{}`", operation, field))
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == FilestoreErrorKind::NotFound
    }

    /// Build an error from a failed SharePoint REST response.
    ///
    /// Understands both OData payload flavours:
    /// verbose `{ "error": { "code": "...", "message": { "value": "..." } } }`
    /// and minimal metadata `{ "odata.error": { ... } }`.
    pub fn from_sp_response(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => FilestoreErrorKind::Auth,
            404 => FilestoreErrorKind::NotFound,
            _ => FilestoreErrorKind::Backend,
        };

        let (code, inner) = Self::parse_odata_error_body(body);
        let message = inner.unwrap_or_else(|| format!("SharePoint error (HTTP {})", status));

        Self {
            kind,
            message,
            status: Some(status),
            backend_code: code,
        }
    }

    fn parse_odata_error_body(body: &str) -> (Option<String>, Option<String>) {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
            return (None, None);
        };
        let err = if v["error"].is_object() {
            &v["error"]
        } else {
            &v["odata.error"]
        };
        let code = err["code"].as_str().map(String::from);
        let msg = err["message"]["value"]
            .as_str()
            .or_else(|| err["message"].as_str())
            .map(String::from);
        (code, msg)
    }
}

impl From<reqwest::Error> for FilestoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::transport(format!("Connection failed: {}", err))
        } else if err.is_body() || err.is_decode() {
            Self::io(format!("Failed to read response body: {}", err))
        } else {
            Self::transport(format!("HTTP error: {}", err))
        }
    }
}

impl From<std::io::Error> for FilestoreError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for FilestoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            FilestoreErrorKind::Serialization,
            format!("JSON error: {}", err),
        )
    }
}

impl From<url::ParseError> for FilestoreError {
    fn from(err: url::ParseError) -> Self {
        Self::new(
            FilestoreErrorKind::InvalidRequest,
            format!("URL parse error: {}", err),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
