/// Errors raised while building an adapter. Fatal: no adapter exists afterwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No webhook secret (or an empty one) was configured
    #[error("missing webhook secret")]
    MissingSecret,
    /// An auto-reply was supplied but cannot produce a response
    #[error("invalid autoReply: {0}")]
    InvalidAutoReply(String),
    /// The incoming-message sentinel was set to an empty string
    #[error("incoming event name must not be empty")]
    InvalidIncomingEvent,
}

/// Per-request errors produced before authentication takes place.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("parsing failed: {0}")]
    ParseError(String),
}

/// Error type listeners return to signal a failed reaction to an event.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
