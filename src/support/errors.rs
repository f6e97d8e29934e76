use thiserror::Error;

/// Errors raised while decoding an inbound OCPP-J envelope.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Envelope root is not an array")]
    NotAnArray,

    #[error("Empty OCPP message array")]
    EmptyArray,

    #[error("Message type is not a number")]
    InvalidMessageType,

    #[error("Unsupported message type: {0}")]
    UnsupportedMessageType(u64),

    #[error("Expected at least {expected} fields, got {got}")]
    MissingFields { expected: usize, got: usize },

    #[error("Field type mismatch: {0}")]
    FieldTypeMismatch(&'static str),
}

/// Caller mistakes on the command-issuing interface.
///
/// Delivery problems are never reported here: an absent charger is logged
/// and the command is still acknowledged.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown trigger message: {0}")]
    UnknownTrigger(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
