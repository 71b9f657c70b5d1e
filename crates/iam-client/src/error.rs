//! API client error types.

use thiserror::Error;

/// Error returned by management API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with an unexpected status.
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Transport error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The access token could not be obtained.
    #[error("token request failed: {0}")]
    Token(String),
}

impl ApiError {
    /// Builds a status error with the message known for `status`, falling
    /// back to `body`.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = status_message(status).map_or_else(
            || {
                if body.trim().is_empty() {
                    "Unexpected response from the server.".to_string()
                } else {
                    body.trim().to_string()
                }
            },
            ToString::to_string,
        );
        Self::Status { status, message }
    }

    /// HTTP status, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::Token(_) => None,
        }
    }

    /// Returns whether the server reported an existing resource.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Message shown for a known error status.
#[must_use]
pub const fn status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad request. Provided parameters are not in correct format."),
        401 => Some("Unauthorized access.\nPlease check your server configurations."),
        403 => Some("Forbidden request."),
        404 => Some("Resource not found for the given ID."),
        409 => Some("A resource with the same name already exists."),
        500 => Some("Internal server error."),
        _ => None,
    }
}

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_use_fixed_messages() {
        let error = ApiError::from_status(409, "{\"code\":\"APP-60007\"}");
        assert!(error.is_conflict());
        assert_eq!(
            error.to_string(),
            "A resource with the same name already exists. (HTTP 409)"
        );
    }

    #[test]
    fn unknown_statuses_keep_body() {
        let error = ApiError::from_status(502, " upstream down \n");
        assert_eq!(error.status(), Some(502));
        assert!(!error.is_conflict());
        assert_eq!(error.to_string(), "upstream down (HTTP 502)");
    }
}
