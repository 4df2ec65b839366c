//! Error types shared by the graph store and the clustering engine

use crate::graph::{Restriction, VertexId};
use thiserror::Error;

/// Errors raised by graph mutation, clustering and the external cluster service
#[derive(Debug, Error)]
pub enum Error {
    /// A required value was missing or violated a documented precondition
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested edge would break one of the graph's structural restrictions
    #[error("edge {vertex1} -> {vertex2} violates restriction {restriction:?}")]
    RestrictionViolation {
        restriction: Restriction,
        vertex1: VertexId,
        vertex2: VertexId,
    },

    /// An edge endpoint is not a member of the target graph
    #[error("vertex {vertex} does not belong to this graph")]
    InvalidEndpoint { vertex: VertexId },

    /// The external cluster computation could not run or returned unusable output
    #[error("external cluster computation failed: {0}")]
    ExternalComputation(String),

    /// Extra validation found the incidence index out of step with the edge set
    #[error("graph is inconsistent: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn external(message: impl Into<String>) -> Self {
        Error::ExternalComputation(message.into())
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
