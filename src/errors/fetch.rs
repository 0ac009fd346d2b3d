//! Inventory fetch errors
//!
//! The fetcher is the boundary to the cloud inventory. Whether a failure stops
//! the run depends on the variant, see [`FetchError::is_fatal`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Session could not be established or credentials were rejected
    #[error("Could not establish cloud session: {0}")]
    Credential(String),

    /// One region's inventory could not be collected
    #[error("Failed to fetch region '{region}': {reason}")]
    Region {
        /// Region identifier
        region: String,
        /// Underlying cause
        reason: String,
    },

    /// The requested region is not known to the fetcher
    #[error("Unknown region '{0}'")]
    UnknownRegion(String),

    /// An inventory snapshot could not be read or parsed
    #[error("Invalid inventory snapshot '{path}': {reason}")]
    Snapshot {
        /// Snapshot file path
        path: String,
        /// Read or parse error
        reason: String,
    },
}

impl FetchError {
    /// Fatal errors abort the whole run; the rest only cost one region
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Credential(_) | FetchError::Snapshot { .. })
    }

    pub fn region(region: &str, reason: impl ToString) -> Self {
        FetchError::Region {
            region: region.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_is_fatal() {
        let err = FetchError::Credential("no profile".to_string());
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Could not establish cloud session: no profile"
        );
    }

    #[test]
    fn test_region_is_not_fatal() {
        let err = FetchError::region("us-east-2", "throttled");
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Failed to fetch region 'us-east-2': throttled"
        );
    }

    #[test]
    fn test_unknown_region_is_not_fatal() {
        assert!(!FetchError::UnknownRegion("mars-1".to_string()).is_fatal());
    }
}
