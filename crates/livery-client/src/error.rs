use livery_model::EditorError;

/// Errors talking to the template API or media storage.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Not authorized; sign in again")]
    Unauthorized,

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl ClientError {
    /// Whether the failure means the token is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
