use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Unauthorized - check the sync token")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RemoteError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => RemoteError::Unauthorized,
            403 => RemoteError::AccessDenied(truncated),
            404 => RemoteError::NotFound(truncated),
            500..=599 => RemoteError::ServerError(truncated),
            _ => RemoteError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
