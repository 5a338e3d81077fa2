//! Error types for state machine operations.

use thiserror::Error;

/// Result type for state machine operations.
pub type MachineResult<T> = Result<T, MachineError>;

/// Errors raised while building or running a state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MachineError {
    /// A state with this name is already registered.
    #[error("State '{state}' already exists in machine '{machine}'")]
    DuplicateState { machine: String, state: String },

    /// A transition named a state the machine does not have.
    #[error("Machine '{machine}' has no state named '{state}'")]
    UnknownState { machine: String, state: String },

    /// `run` was called before any state was added.
    #[error("Machine '{machine}' has no states")]
    NoStates { machine: String },

    /// The machine previously failed a transition and no longer runs.
    #[error("Machine '{machine}' is faulted")]
    MachineFaulted { machine: String },
}
