//! CIDR parsing errors

use thiserror::Error;

/// Errors raised while interpreting an address range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// The value could not be parsed as `address/prefix`
    #[error("Invalid CIDR '{cidr}': {reason}")]
    Invalid {
        /// The offending input
        cidr: String,
        /// Parser message
        reason: String,
    },
}

impl CidrError {
    pub fn invalid(cidr: &str, reason: impl ToString) -> Self {
        CidrError::Invalid {
            cidr: cidr.to_string(),
            reason: reason.to_string(),
        }
    }
}
