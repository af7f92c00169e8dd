//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// View id is not registered
    #[error("View not found: {0}")]
    ViewNotFound(String),

    /// View container (`view-<id>`) is missing from the document
    #[error("View container not found: {0}")]
    ContainerNotFound(String),

    /// Element lookup failed
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element was removed from the document
    #[error("Element is detached: {0}")]
    ElementDetached(String),

    /// Selector syntax is not supported
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Rendering a view failed
    #[error("Render failed for view: {0}")]
    RenderFailed(String),

    /// View initializer reported an error
    #[error("Initializer failed for view {view}: {message}")]
    InitializerFailed { view: String, message: String },

    /// Windowing host rejected a command
    #[error("Host command failed: {command} - {message}")]
    HostCommandFailed { command: String, message: String },

    /// Window handle is unknown to the host
    #[error("Window not found: {0}")]
    WindowNotFound(String),

    /// Every recovery step of a window operation failed
    #[error("Window recovery exhausted for {operation} after {attempts} attempts")]
    WindowRecoveryExhausted { operation: String, attempts: usize },

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ViewNotFound(_)
            | Self::ContainerNotFound(_)
            | Self::ElementNotFound(_)
            | Self::ElementDetached(_)
            | Self::WindowNotFound(_)
            | Self::ValidationError(_) => true,
            Self::InvalidSelector(_)
            | Self::RenderFailed(_)
            | Self::InitializerFailed { .. }
            | Self::HostCommandFailed { .. }
            | Self::WindowRecoveryExhausted { .. }
            | Self::SerializationError(_) => false,
        }
    }

    /// Shorthand for a rejected host command.
    pub fn host(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HostCommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
