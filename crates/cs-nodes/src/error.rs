//! Error types for node construction and actuator output.

use cs_core::CoreError;
use thiserror::Error;

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Failure reported by an actuator collaborator, passed through unchanged.
pub type ActuatorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building or driving a node graph.
///
/// Evaluation through [`crate::Node::get`] never fails; these errors are
/// raised at construction time or by external collaborators.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Invalid argument provided to a node constructor.
    #[error("Invalid argument: {what}")]
    InvalidArgument { what: &'static str },

    /// Non-finite coefficient or parameter.
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// The actuator rejected a command.
    #[error("Actuator write failed: {source}")]
    Actuator {
        #[source]
        source: ActuatorError,
    },
}

impl From<CoreError> for NodeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, value } => Self::NonFinite { what, value },
            CoreError::InvalidArg { what } => Self::InvalidArgument { what },
        }
    }
}
