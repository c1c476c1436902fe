use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlexError>;

/// Failure reported by a [`ViewportHost`](crate::host::ViewportHost) write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A node the operation needs (root, head, body) is not present.
    #[error("missing document node: {0}")]
    MissingNode(&'static str),

    /// The runtime refused the write.
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

impl HostError {
    #[must_use]
    pub fn rejected(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FlexError {
    #[error("invalid scaler config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[cfg(feature = "config")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "config")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
