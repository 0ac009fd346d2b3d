//! Plan loading and export errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    /// Plan file does not exist
    #[error("Did not find plan file in {0}")]
    NotFound(String),

    /// Plan file exists but does not describe a valid plan
    #[error("Invalid plan '{path}': {reason}")]
    Invalid {
        /// Plan file path
        path: String,
        /// Parse or validation message
        reason: String,
    },

    /// Writing an export profile failed
    #[error("Export to '{filename}' failed: {reason}")]
    Export {
        /// Target file name
        filename: String,
        /// Underlying cause
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = PlanError::NotFound("plans/prod.yaml".to_string());
        assert_eq!(err.to_string(), "Did not find plan file in plans/prod.yaml");
    }

    #[test]
    fn test_export_message() {
        let err = PlanError::Export {
            filename: "out.dot".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Export to 'out.dot' failed: permission denied"
        );
    }
}
