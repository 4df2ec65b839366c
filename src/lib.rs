//! Multigraph store and modularity-based community detection

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod storage;

pub use cluster::{ClusterEngine, ClusterOutcome, ClusterResult};
pub use error::{Error, Result};
pub use graph::{Directedness, EdgeId, Graph, Restriction, Restrictions, VertexId};
