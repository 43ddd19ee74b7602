//! Error types for the Strata analysis.

use thiserror::Error;

use crate::ast::NodeId;

/// All errors that can be produced by the analysis.
///
/// Unresolved identifiers are *not* errors — a free variable is a valid
/// [`crate::scope::Reference`] with an absent target.
#[derive(Debug, Error)]
pub enum StrataError {
    /// A node was presented to a container that never analyzed it.
    ///
    /// Always surfaced to the caller; silently answering with a wrong scope
    /// would corrupt every downstream analysis.
    #[error("node {0} is not part of the analyzed tree")]
    UnknownNode(NodeId),

    /// An internal invariant was violated; indicates an engine bug.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenient `Result` alias for fallible analysis operations.
pub type StrataResult<T> = Result<T, StrataError>;
