/// Result alias that carries the custom [`PingPongError`] type.
pub type Result<T> = std::result::Result<T, PingPongError>;

/// Common error type for the core crate.
///
/// Gameplay itself never fails; these errors only surface while loading
/// configuration or talking to the score store.
#[derive(Debug, thiserror::Error)]
pub enum PingPongError {
    /// Free-form failure reported by a collaborator.
    #[error("{0}")]
    Message(String),
    /// A configuration value is outside the range the engine can work with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl PingPongError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<&str> for PingPongError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PingPongError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
