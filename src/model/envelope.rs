use serde::{Deserialize, Serialize};

/// Canonical backend response envelope.
///
/// Every backend endpoint wraps its payload in `{code, title, message, data}`.
/// A non-200 `code` carries the user-facing `title`/`message` and usually no
/// `data`; decoding failures are reported separately by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: u16,
    pub title: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            title: "Success".to_string(),
            message: "OK".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(code: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Consumes the envelope, yielding the payload when the backend reported
    /// success with a body.
    pub fn into_success(self) -> Result<T, ErrorInfo> {
        match (self.code, self.data) {
            (200, Some(data)) => Ok(data),
            _ => Err(ErrorInfo {
                title: self.title,
                message: self.message,
            }),
        }
    }
}

/// User-facing error published by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub title: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}
