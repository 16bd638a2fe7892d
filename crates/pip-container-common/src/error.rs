//! Unified error type for the pip-container workspace.
//!
//! Every lifecycle operation returns [`Result`]. Correlation ids travel with
//! the variants raised inside a traced call so that a log line can be tied
//! back to the open or close sequence that produced it.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is missing, malformed, or unparseable.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An operation was attempted in a lifecycle state that does not allow it.
    #[error("invalid state {code}: {message}")]
    InvalidState {
        /// Correlation id of the failed call.
        correlation_id: Option<String>,
        /// Stable machine-readable code, e.g. `ALREADY_OPENED`.
        code: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// No registered factory was able to create a component.
    #[error("cannot create component {locator}: {message}")]
    Build {
        /// Correlation id of the failed call.
        correlation_id: Option<String>,
        /// Locator (descriptor or type) that could not be resolved.
        locator: String,
        /// Human-readable description.
        message: String,
    },

    /// A required reference was not found in the registry.
    #[error("failed to obtain reference to {locator}")]
    Reference {
        /// Correlation id of the failed call.
        correlation_id: Option<String>,
        /// Locator that had no match.
        locator: String,
    },

    /// A lookup that needs exactly one component matched several.
    #[error("expected one reference to {locator}, found {count}")]
    AmbiguousReference {
        /// Correlation id of the failed call.
        correlation_id: Option<String>,
        /// Locator that matched more than once.
        locator: String,
        /// Number of matching components.
        count: usize,
    },

    /// A component reported a failure from one of its lifecycle calls.
    #[error("component error {code}: {message}")]
    Component {
        /// Correlation id of the failed call.
        correlation_id: Option<String>,
        /// Stable machine-readable code.
        code: String,
        /// Human-readable description.
        message: String,
    },

    /// A panic was caught at the container boundary.
    #[error("recovered from fault: {message}")]
    RecoveredFault {
        /// Correlation id of the call that panicked.
        correlation_id: Option<String>,
        /// Panic payload rendered as text.
        message: String,
    },

    /// Several independent failures, e.g. from closing many components.
    #[error("{} errors occurred: {}", .errors.len(), join_messages(.errors))]
    Aggregate {
        /// Individual failures in the order they happened.
        errors: Vec<ContainerError>,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying deserialization error.
        #[from]
        source: serde_yaml::Error,
    },
}

fn join_messages(errors: &[ContainerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ContainerError {
    /// Creates an [`ContainerError::InvalidState`] error.
    pub fn invalid_state(
        correlation_id: Option<&str>,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            correlation_id: correlation_id.map(str::to_owned),
            code,
            message: message.into(),
        }
    }

    /// Creates a [`ContainerError::Build`] error for the given locator.
    pub fn build(
        correlation_id: Option<&str>,
        locator: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::Build {
            correlation_id: correlation_id.map(str::to_owned),
            locator: locator.to_string(),
            message: message.into(),
        }
    }

    /// Creates a [`ContainerError::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a [`ContainerError::Component`] error.
    pub fn component(
        correlation_id: Option<&str>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Component {
            correlation_id: correlation_id.map(str::to_owned),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Folds a list of failures into a single error.
    ///
    /// Returns `None` for an empty list and the error itself when there is
    /// exactly one.
    #[must_use]
    pub fn aggregate(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate { errors }),
        }
    }

    /// Returns the correlation id carried by this error, if any.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::InvalidState { correlation_id, .. }
            | Self::Build { correlation_id, .. }
            | Self::Reference { correlation_id, .. }
            | Self::AmbiguousReference { correlation_id, .. }
            | Self::Component { correlation_id, .. }
            | Self::RecoveredFault { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ContainerError>;
