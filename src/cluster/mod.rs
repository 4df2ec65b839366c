//! Community detection: native agglomerative engine plus external variants

pub mod community;
pub mod engine;
pub mod external;
pub mod heap;
pub mod metrics;

use crate::graph::VertexId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use community::{Community, CommunityId, CommunityPair};
pub use engine::{ClusterEngine, EngineState};
pub use external::{ExternalClusterService, ExternalVariant, SubprocessClusterService};
pub use heap::DeltaQMaxHeap;

/// Clustering algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterAlgorithm {
    /// Native greedy modularity merging (Clauset–Newman–Moore with Wakita–Tsurumi heaps)
    #[default]
    WakitaTsurumi,
    /// Girvan–Newman, computed by the external cluster service
    GirvanNewman,
    /// Clauset–Newman–Moore, computed by the external cluster service
    ClausetNewmanMoore,
}

impl ClusterAlgorithm {
    /// The external variant this algorithm maps to, if it is not native
    pub fn external_variant(self) -> Option<ExternalVariant> {
        match self {
            ClusterAlgorithm::WakitaTsurumi => None,
            ClusterAlgorithm::GirvanNewman => Some(ExternalVariant::GirvanNewman),
            ClusterAlgorithm::ClausetNewmanMoore => Some(ExternalVariant::ClausetNewmanMoore),
        }
    }
}

/// Represents one cell of the final partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Position of this cluster in the result
    pub id: u32,

    /// Member vertices, in identity order
    pub members: Vec<VertexId>,

    /// Size of the cluster
    pub size: usize,
}

impl Cluster {
    pub(crate) fn new(id: u32, mut members: Vec<VertexId>) -> Self {
        members.sort_unstable();
        Self {
            id,
            size: members.len(),
            members,
        }
    }
}

/// One merge performed by the native engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeStep {
    pub community1: CommunityId,
    pub community2: CommunityId,
    pub merged_into: CommunityId,
    pub delta_q: f64,
}

/// Partition produced by a completed clustering run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResult {
    pub algorithm: ClusterAlgorithm,
    pub clusters: Vec<Cluster>,
    /// Merge history; empty for external variants
    pub merges: Vec<MergeStep>,
}

/// Outcome of a clustering run. Cancellation is a result, not an error.
#[derive(Debug, Clone)]
pub enum ClusterOutcome {
    Completed(ClusterResult),
    Cancelled,
}

impl ClusterOutcome {
    pub fn into_result(self) -> Option<ClusterResult> {
        match self {
            ClusterOutcome::Completed(result) => Some(result),
            ClusterOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClusterOutcome::Cancelled)
    }
}

/// Progress reported at each cancellation checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterProgress {
    pub cycles_completed: usize,
    pub total_vertices: usize,
}

/// Shared flag used to request cooperative cancellation
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
