//! Error types for the surround bus

use thiserror::Error;

/// Surround bus error types
#[derive(Error, Debug)]
pub enum SurroundError {
    /// No renderer registered under the requested URI
    #[error("Surround renderer unavailable: {uri}")]
    RendererUnavailable { uri: String },

    /// Direct audio inputs offered to the return stage
    #[error("Unsupported I/O configuration: {inputs} direct inputs (return accepts none)")]
    UnsupportedIo { inputs: usize },

    /// Send thru path must keep its channel count
    #[error("Channel mismatch: {inputs} in / {outputs} out")]
    ChannelMismatch { inputs: usize, outputs: usize },

    /// Channel index out of range for a send
    #[error("Invalid channel: {channel} (send has {available})")]
    InvalidChannel { channel: usize, available: usize },

    /// Control kind not applicable here
    #[error("Invalid control: {0}")]
    InvalidControl(String),

    /// Persisted state could not be applied
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Control protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] crate::protocol::ProtocolError),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for surround operations
pub type SurroundResult<T> = Result<T, SurroundError>;
