use thiserror::Error;

use crate::publisher::Phase;

/// Errors returned by sink lifecycle operations.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The operation is not valid in the sink's current phase.
    #[error("{sink}: cannot {operation} while {phase}")]
    NotReady {
        /// Sink name.
        sink: String,
        /// Operation that was rejected.
        operation: &'static str,
        /// Phase the sink was in.
        phase: Phase,
    },
    /// `configure` was called on a sink that is not unconfigured.
    #[error("{0}: already configured; finalize before configuring again")]
    AlreadyConfigured(String),
    /// A failed `initialize` left the sink faulted until `finalize`.
    #[error("{0}: faulted by a failed initialize; finalize to reset")]
    Faulted(String),
    /// The sink's resource (file, stream, helper program) could not be used.
    #[error("{context}: {source}")]
    ResourceUnavailable {
        /// What was being acquired or written.
        context: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An option value could not be interpreted.
    #[error("invalid value '{value}' for option {key}")]
    InvalidOption {
        /// Option key.
        key: String,
        /// Rejected value.
        value: String,
    },
    /// A delivery failed for a reason other than I/O.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl PublishError {
    /// Wraps an I/O failure with what was being attempted.
    pub fn resource(context: impl Into<String>, source: std::io::Error) -> Self {
        PublishError::ResourceUnavailable {
            context: context.into(),
            source,
        }
    }
}
