//! Clustering engine: greedy modularity merging with cooperative cancellation
//!
//! The native algorithm starts from one community per vertex and repeatedly
//! merges the pair with the largest modularity gain (Clauset, Newman & Moore),
//! keeping one heap entry per community holding that community's best gain
//! (Wakita & Tsurumi). Gains of a merged community are derived from the two
//! consumed tables rather than recomputed from the graph.

use crate::cluster::community::{Community, CommunityId};
use crate::cluster::external::{ExternalClusterService, ExternalRequest, SubprocessClusterService};
use crate::cluster::heap::DeltaQMaxHeap;
use crate::cluster::{
    CancellationToken, Cluster, ClusterAlgorithm, ClusterOutcome, ClusterProgress, ClusterResult,
    MergeStep,
};
use crate::config::ClusterConfig;
use crate::error::{Error, Result};
use crate::graph::{Graph, VertexId};
use std::collections::{BTreeMap, HashMap};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initializing,
    Merging,
    Done,
    Cancelled,
}

/// Runs a clustering algorithm over a graph
pub struct ClusterEngine<'a> {
    config: ClusterConfig,
    cancellation: CancellationToken,
    progress: Option<Box<dyn FnMut(ClusterProgress) + 'a>>,
    state: EngineState,
}

impl<'a> ClusterEngine<'a> {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
            progress: None,
            state: EngineState::Initializing,
        }
    }

    /// Use a cancellation token shared with the caller
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Receive progress at every checkpoint
    pub fn on_progress(mut self, callback: impl FnMut(ClusterProgress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Run the configured algorithm.
    ///
    /// External variants go through a [`SubprocessClusterService`] built from
    /// the configured program; without one they are an `InvalidArgument`.
    pub fn run(&mut self, graph: &Graph) -> Result<ClusterOutcome> {
        self.config.validate()?;
        match self.config.algorithm {
            ClusterAlgorithm::WakitaTsurumi => self.run_native(graph),
            algorithm => {
                let program = self.config.external_program.clone().ok_or_else(|| {
                    Error::invalid(format!("{:?} needs an external program", algorithm))
                })?;
                let mut service =
                    SubprocessClusterService::new(program).with_args(self.config.external_args.clone());
                self.run_with_service(graph, &mut service)
            }
        }
    }

    /// Run the configured algorithm, delegating external variants to `service`
    pub fn run_with_service(
        &mut self,
        graph: &Graph,
        service: &mut dyn ExternalClusterService,
    ) -> Result<ClusterOutcome> {
        self.config.validate()?;
        let Some(variant) = self.config.algorithm.external_variant() else {
            return self.run_native(graph);
        };

        self.state = EngineState::Initializing;
        let request = ExternalRequest::from_graph(graph, variant);
        log::info!(
            "Requesting {:?} clustering of {} vertices from external service",
            variant,
            request.vertices.len()
        );

        let assignments = match service.compute(&request, &self.cancellation)? {
            Some(assignments) => assignments,
            None => {
                log::info!("External clustering cancelled");
                self.state = EngineState::Cancelled;
                return Ok(ClusterOutcome::Cancelled);
            }
        };

        let mut clusters: Vec<Cluster> = Vec::new();
        let mut current: Option<(u64, Vec<VertexId>)> = None;
        for assignment in assignments {
            match current.as_mut() {
                Some((id, members)) if *id == assignment.cluster => members.push(assignment.vertex),
                _ => {
                    if let Some((_, members)) = current.take() {
                        clusters.push(Cluster::new(clusters.len() as u32, members));
                    }
                    current = Some((assignment.cluster, vec![assignment.vertex]));
                }
            }
        }
        if let Some((_, members)) = current {
            clusters.push(Cluster::new(clusters.len() as u32, members));
        }

        log::info!("External service returned {} clusters", clusters.len());
        self.state = EngineState::Done;
        Ok(ClusterOutcome::Completed(ClusterResult {
            algorithm: self.config.algorithm,
            clusters,
            merges: Vec::new(),
        }))
    }

    fn run_native(&mut self, graph: &Graph) -> Result<ClusterOutcome> {
        self.state = EngineState::Initializing;
        let mut merger = Merger::initialize(graph)?;
        let total_vertices = graph.vertex_count();
        log::info!(
            "Initialized {} communities over {} edges ({} candidate merges)",
            total_vertices,
            merger.edge_count,
            merger.heap.len()
        );

        self.state = EngineState::Merging;
        let mut cycles = 0;
        while let Some(step) = merger.merge_best() {
            cycles += 1;
            log::debug!(
                "Merged communities {} and {} into {} (deltaQ {:.6})",
                step.community1,
                step.community2,
                step.merged_into,
                step.delta_q
            );

            if cycles % self.config.progress_interval == 0 {
                let progress = ClusterProgress {
                    cycles_completed: cycles,
                    total_vertices,
                };
                log::debug!("Completed {} merge cycles of at most {}", cycles, total_vertices);
                if let Some(callback) = self.progress.as_mut() {
                    callback(progress);
                }
                if self.cancellation.is_cancelled() {
                    log::info!("Clustering cancelled after {} merge cycles", cycles);
                    self.state = EngineState::Cancelled;
                    return Ok(ClusterOutcome::Cancelled);
                }
            }
        }

        let result = merger.finish();
        log::info!(
            "Clustering done after {} merges: {} communities",
            result.merges.len(),
            result.clusters.len()
        );
        self.state = EngineState::Done;
        Ok(ClusterOutcome::Completed(result))
    }
}

/// Merge-loop state of the native algorithm
struct Merger {
    /// Indexed by community identity; consumed communities are `None`
    communities: Vec<Option<Community>>,
    heap: DeltaQMaxHeap,
    merges: Vec<MergeStep>,
    /// Non-self-loop edges in the graph
    edge_count: usize,
}

impl Merger {
    fn initialize(graph: &Graph) -> Result<Self> {
        let vertices = graph.vertex_ids();
        let index: HashMap<VertexId, CommunityId> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let mut communities = Vec::with_capacity(vertices.len() * 2);
        let mut neighbor_counts: Vec<BTreeMap<CommunityId, usize>> = Vec::with_capacity(vertices.len());
        for (id, &vertex) in vertices.iter().enumerate() {
            let mut counts: BTreeMap<CommunityId, usize> = BTreeMap::new();
            for edge_id in graph.incident_edges(vertex)? {
                let Some(edge) = graph.edge(edge_id) else { continue };
                if edge.is_self_loop() {
                    continue;
                }
                let neighbor = edge
                    .adjacent_vertex(vertex)
                    .and_then(|v| index.get(&v).copied())
                    .ok_or_else(|| Error::Inconsistent(format!("edge {} has a dangling endpoint", edge_id)))?;
                *counts.entry(neighbor).or_insert(0) += 1;
            }
            let degree = counts.values().sum();
            communities.push(Some(Community::singleton(id, vertex, degree)));
            neighbor_counts.push(counts);
        }

        let edge_count = graph.edge_count() - graph.self_loop_count();
        let mut merger = Self {
            communities,
            heap: DeltaQMaxHeap::with_capacity(vertices.len()),
            merges: Vec::new(),
            edge_count,
        };
        if edge_count == 0 {
            return Ok(merger);
        }

        // Adjacent singletons i, j joined by A_ij edges: 2 * (A_ij / 2m - a_i * a_j)
        let fractions: Vec<f64> = (0..merger.communities.len())
            .map(|id| merger.fraction(id))
            .collect();
        let two_m = (2 * edge_count) as f64;
        for (id, counts) in neighbor_counts.into_iter().enumerate() {
            let Some(community) = merger.communities[id].as_mut() else { continue };
            community.set_pairs(counts.into_iter().map(|(neighbor, shared)| {
                (neighbor, 2.0 * (shared as f64 / two_m - fractions[id] * fractions[neighbor]))
            }));
            if let Some(best) = community.best_pair() {
                merger.heap.insert(id, best.delta_q);
            }
        }
        Ok(merger)
    }

    fn fraction(&self, id: CommunityId) -> f64 {
        let two_m = (2 * self.edge_count) as f64;
        self.communities[id]
            .as_ref()
            .map_or(0.0, |c| c.degree() as f64 / two_m)
    }

    /// Perform the best merge, or return `None` once the heap is empty or
    /// the best available gain is negative.
    fn merge_best(&mut self) -> Option<MergeStep> {
        let (top, delta_q) = self.heap.peek_max()?;
        if delta_q < 0.0 {
            log::info!("Stopping: best remaining deltaQ {:.6} is negative", delta_q);
            return None;
        }
        self.heap.extract_max();

        let pair = self.communities[top].as_ref()?.best_pair()?;
        let (id1, id2) = (pair.community1, pair.community2);
        let merged_id = self.communities.len();

        // Shares of the consumed pair must be read while both are still live
        let a1 = self.fraction(id1);
        let a2 = self.fraction(id2);
        let c1 = self.communities[id1].take()?;
        let c2 = self.communities[id2].take()?;
        self.heap.remove(id1);
        self.heap.remove(id2);

        let merged = Community::merge(merged_id, c1, c2, |id| {
            if id == id1 {
                a1
            } else if id == id2 {
                a2
            } else {
                self.fraction(id)
            }
        });

        for pair in merged.pairs() {
            let neighbor = pair.community2;
            if let Some(other) = self.communities[neighbor].as_mut() {
                other.replace_neighbors(id1, id2, merged_id, pair.delta_q);
                match other.best_pair() {
                    Some(best) => self.heap.insert(neighbor, best.delta_q),
                    None => {
                        self.heap.remove(neighbor);
                    }
                }
            }
        }

        if let Some(best) = merged.best_pair() {
            self.heap.insert(merged_id, best.delta_q);
        }
        self.communities.push(Some(merged));

        let step = MergeStep {
            community1: id1,
            community2: id2,
            merged_into: merged_id,
            delta_q: pair.delta_q,
        };
        self.merges.push(step);
        Some(step)
    }

    fn finish(self) -> ClusterResult {
        let mut live: Vec<Vec<VertexId>> = self
            .communities
            .into_iter()
            .flatten()
            .map(|c| c.members().to_vec())
            .collect();
        for members in live.iter_mut() {
            members.sort_unstable();
        }
        live.sort_by_key(|members| members.first().copied());

        let clusters = live
            .into_iter()
            .enumerate()
            .map(|(i, members)| Cluster::new(i as u32, members))
            .collect();

        ClusterResult {
            algorithm: ClusterAlgorithm::WakitaTsurumi,
            clusters,
            merges: self.merges,
        }
    }
}
