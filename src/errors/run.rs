//! Top-level run errors and process exit codes

use thiserror::Error;

use super::{FetchError, GraphError, PlanError};

/// No plan file was found
pub const NO_PLAN: u8 = 251;
/// Plan, snapshot or credentials were rejected
pub const INVALID_RUN: u8 = 253;
/// The user interrupted the run
pub const INTERRUPTED: u8 = 254;
/// Anything unexpected, including graph invariant violations
pub const UNKNOWN_ERROR: u8 = 255;

/// Errors that stop a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Graph invariant violated: {0}")]
    Graph(#[from] GraphError),

    #[error("Run interrupted")]
    Interrupted,

    #[error("Region task failed: {0}")]
    Task(String),
}

impl RunError {
    /// Exit code that distinguishes the failure class for the caller
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Plan(PlanError::NotFound(_)) => NO_PLAN,
            RunError::Plan(_) => INVALID_RUN,
            RunError::Fetch(_) => INVALID_RUN,
            RunError::Interrupted => INTERRUPTED,
            RunError::Graph(_) | RunError::Task(_) => UNKNOWN_ERROR,
        }
    }
}
