//! Error types for the Serene core.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Serene workspace.
///
/// Input-validation variants (`EmptyInput`, `InvalidTag`) are returned to the
/// immediate caller. Scheduling and delivery variants are absorbed by the
/// session and never reach the presentation layer as failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SereneError {
    /// Blank message submission
    #[error("Message text is empty")]
    EmptyInput,

    /// Mood selection outside the closed tag set
    #[error("Invalid mood tag: '{tag}'")]
    InvalidTag { tag: String },

    /// A response was requested while another one is still scheduled
    #[error("A response is already scheduled for turn {pending_for}")]
    SchedulingConflict { pending_for: u64 },

    /// The response generator failed
    #[error("Response delivery failed: {0}")]
    DeliveryFailure(String),

    /// Operation on a session that has already been closed
    #[error("Session is closed")]
    SessionClosed,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SereneError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidTag error
    pub fn invalid_tag(tag: impl Into<String>) -> Self {
        Self::InvalidTag { tag: tag.into() }
    }

    /// Creates a DeliveryFailure error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::DeliveryFailure(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error came from validating caller input.
    ///
    /// These are the only errors the presentation layer is expected to act on
    /// (for example by keeping the submit button disabled).
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidTag { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SereneError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for SereneError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SereneError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error for collaborators that report through anyhow
impl From<anyhow::Error> for SereneError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, SereneError>`.
pub type Result<T> = std::result::Result<T, SereneError>;
