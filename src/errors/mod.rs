//! Domain-specific error types for vpcgraph
//!
//! Errors are split by how far they reach:
//!
//! - **CidrError**: a single address comparison; callers treat it as "no overlap"
//! - **FetchError**: inventory collection; credential failures are fatal, region
//!   failures only remove that region from the graph
//! - **GraphError**: graph builder invariant violations; always fatal
//! - **PlanError**: plan loading and export
//! - **RunError**: top-level error reported by the binary, carrying an exit code
//!
//! # Examples
//!
//! ```rust
//! use vpcgraph::errors::{FetchError, RunError};
//!
//! let err: RunError = FetchError::Credential("expired token".to_string()).into();
//! assert_eq!(err.exit_code(), 253);
//! ```

pub mod cidr;
pub mod fetch;
pub mod graph;
pub mod plan;
pub mod run;

pub use cidr::CidrError;
pub use fetch::FetchError;
pub use graph::GraphError;
pub use plan::PlanError;
pub use run::{RunError, INTERRUPTED, INVALID_RUN, NO_PLAN, UNKNOWN_ERROR};

/// Result type alias for CIDR parsing and comparison
pub type CidrResult<T> = Result<T, CidrError>;

/// Result type alias for inventory fetching
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type alias for graph building
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for plan operations
pub type PlanResult<T> = Result<T, PlanError>;
