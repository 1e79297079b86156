use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Feedback session errors
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The loopback listener could not be bound.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Tool execution errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Requested tool is unknown.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool call arguments are invalid.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// The feedback session could not be opened.
    #[error("Feedback session failed: {0}")]
    Session(#[from] ChannelError),
}

/// Stdio transport errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Reading stdin or writing stdout failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON-RPC frame could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Internal proto errors
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Unknown theme name.
    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    /// Image data URL could not be decoded.
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}
