use thiserror::Error;

/// Failure of a single backend round trip
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

impl ApiError {
    /// The backend answered 404 for the requested record
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Short text suitable for the status line
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(e) if e.is_timeout() => "Request timed out".to_string(),
            ApiError::Transport(e) if e.is_connect() => "Connection failed".to_string(),
            ApiError::Transport(_) => "Network error".to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) | ApiError::MissingField(_) => "Unexpected server response".to_string(),
        }
    }
}
