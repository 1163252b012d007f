use std::fmt;

/// Error returned by [`Store`](crate::Store) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `create` was asked to write a key that already exists.
    Conflict { key: String },
    /// `update` was asked to write a key that does not exist.
    NotFound { key: String },
    /// The backend could not be reached, or answered with a non-2xx HTTP status.
    Transport(String),
    /// The backend answered, but its envelope reported a non-success status.
    Rejected { status: u16, message: String },
    /// A record could not be encoded or decoded.
    Serde(String),
    /// Local storage failure (lock poisoned, file I/O).
    Storage(String),
}

impl StoreError {
    /// True for failures of the backend itself rather than of the requested
    /// operation against the store's contents.
    pub fn is_transport(&self) -> bool {
        !matches!(self, StoreError::Conflict { .. } | StoreError::NotFound { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict { key } => write!(f, "record {} already exists", key),
            StoreError::NotFound { key } => write!(f, "record {} does not exist", key),
            StoreError::Transport(message) => write!(f, "{}", message),
            StoreError::Rejected { status, message } => {
                write!(f, "{} (status {})", message, status)
            }
            StoreError::Serde(message) => write!(f, "record serialization error: {}", message),
            StoreError::Storage(message) => write!(f, "storage error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StoreError::Transport(format!("HTTP error! status: {}", status.as_u16())),
            None => StoreError::Transport(err.to_string()),
        }
    }
}

/// Error returned by [`EditorHandle`](crate::EditorHandle) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorError {
    /// The editor task has stopped.
    Closed,
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Closed => write!(f, "editor task has stopped"),
        }
    }
}

impl std::error::Error for EditorError {}
