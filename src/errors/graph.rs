//! Graph builder errors
//!
//! These never occur in correct operation: each one is a defect in the graph
//! builder and aborts the run.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge was emitted before one of its endpoints
    #[error("Edge '{edge}' references node '{node}' which was never emitted")]
    Consistency {
        /// Edge identifier
        edge: String,
        /// Missing endpoint identifier
        node: String,
    },

    /// Two nodes share a `(region, id)` key after merge
    #[error("Duplicate node '{id}' in region '{region}'")]
    DuplicateNode {
        /// Region identifier
        region: String,
        /// Node identifier
        id: String,
    },

    /// A fragment was merged into a graph that already holds its region
    #[error("Region '{0}' was merged twice")]
    RegionMergedTwice(String),

    /// Post-merge integrity check failed
    #[error("Graph integrity check failed: {}", .0.join("; "))]
    Integrity(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_message() {
        let err = GraphError::Consistency {
            edge: "e3-1".to_string(),
            node: "tgw-1-3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Edge 'e3-1' references node 'tgw-1-3' which was never emitted"
        );
    }

    #[test]
    fn test_integrity_message() {
        let err = GraphError::Integrity(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Graph integrity check failed: a; b");
    }

    #[test]
    fn test_duplicate_node_message() {
        let err = GraphError::DuplicateNode {
            region: "eu-west-1".to_string(),
            id: "vpc-1-0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate node 'vpc-1-0' in region 'eu-west-1'"
        );
    }
}
