//! Cluster statistics and partition quality

use crate::cluster::Cluster;
use crate::graph::{Directedness, Graph, VertexId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Number of central vertices reported per cluster
const CENTRAL_VERTEX_COUNT: usize = 5;

/// Clusters below this size are summarized sequentially
const PARALLEL_THRESHOLD: usize = 64;

/// Per-cluster statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterStats {
    pub id: u32,
    pub size: usize,
    /// Internal edges over potential edges
    pub density: f32,
    /// Members with the most edges inside the cluster
    pub central_vertices: Vec<VertexId>,
}

/// Modularity of a partition, ignoring self-loops:
/// `sum over clusters of (L_c / m - (d_c / 2m)^2)`.
pub fn modularity(graph: &Graph, clusters: &[Cluster]) -> f64 {
    let m = (graph.edge_count() - graph.self_loop_count()) as f64;
    if m == 0.0 {
        return 0.0;
    }

    let membership: HashMap<VertexId, usize> = clusters
        .iter()
        .enumerate()
        .flat_map(|(i, c)| c.members.iter().map(move |&v| (v, i)))
        .collect();

    let mut internal = vec![0usize; clusters.len()];
    let mut degree = vec![0usize; clusters.len()];
    for edge in graph.edges().filter(|e| !e.is_self_loop()) {
        let (v1, v2) = edge.vertices();
        let (Some(&c1), Some(&c2)) = (membership.get(&v1), membership.get(&v2)) else {
            continue;
        };
        degree[c1] += 1;
        degree[c2] += 1;
        if c1 == c2 {
            internal[c1] += 1;
        }
    }

    internal
        .iter()
        .zip(&degree)
        .map(|(&l, &d)| l as f64 / m - (d as f64 / (2.0 * m)).powi(2))
        .sum()
}

/// Calculate density (internal edges / potential edges)
pub fn density(graph: &Graph, members: &[VertexId]) -> f32 {
    let n = members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton clusters have density 1
    }

    let potential_edges = match graph.directedness() {
        Directedness::Directed => n * (n - 1),
        _ => n * (n - 1) / 2,
    };

    let member_set: HashSet<VertexId> = members.iter().copied().collect();
    let actual_edges = graph
        .edges()
        .filter(|e| !e.is_self_loop())
        .filter(|e| member_set.contains(&e.vertex1()) && member_set.contains(&e.vertex2()))
        .count();

    actual_edges as f32 / potential_edges as f32
}

/// Members with the highest internal degree, highest first
pub fn central_vertices(graph: &Graph, members: &[VertexId], top_n: usize) -> Vec<VertexId> {
    let member_set: HashSet<VertexId> = members.iter().copied().collect();

    let mut degrees: Vec<(VertexId, usize)> = members
        .iter()
        .map(|&vertex| {
            let internal = graph
                .adjacent_vertices(vertex)
                .map(|adjacent| adjacent.iter().filter(|v| **v != vertex && member_set.contains(v)).count())
                .unwrap_or(0);
            (vertex, internal)
        })
        .collect();

    // Stable sort keeps identity order among equal degrees
    degrees.sort_by(|a, b| b.1.cmp(&a.1));
    degrees.into_iter().take(top_n).map(|(v, _)| v).collect()
}

/// Statistics for every cluster
pub fn summarize(graph: &Graph, clusters: &[Cluster]) -> Vec<ClusterStats> {
    let stats_for = |cluster: &Cluster| ClusterStats {
        id: cluster.id,
        size: cluster.size,
        density: density(graph, &cluster.members),
        central_vertices: central_vertices(graph, &cluster.members, CENTRAL_VERTEX_COUNT),
    };

    // For few clusters, use sequential processing
    if clusters.len() < PARALLEL_THRESHOLD {
        return clusters.iter().map(stats_for).collect();
    }

    clusters.par_iter().map(stats_for).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Graph, Vec<VertexId>) {
        let mut graph = Graph::undirected();
        let v: Vec<_> = (0..6).map(|_| graph.add_new_vertex()).collect();
        for (a, b) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            graph.add_edge(v[a], v[b], false).unwrap();
        }
        (graph, v)
    }

    #[test]
    fn test_modularity_of_two_triangles() {
        let (graph, v) = two_triangles();
        let clusters = vec![
            Cluster::new(0, v[..3].to_vec()),
            Cluster::new(1, v[3..].to_vec()),
        ];
        // Each triangle: 3/6 - (6/12)^2 = 0.25
        assert!((modularity(&graph, &clusters) - 0.5).abs() < 1e-12);

        let whole = vec![Cluster::new(0, v.clone())];
        assert!(modularity(&graph, &whole).abs() < 1e-12);
    }

    #[test]
    fn test_density_and_central_vertices() {
        let mut graph = Graph::undirected();
        let v: Vec<_> = (0..4).map(|_| graph.add_new_vertex()).collect();
        graph.add_edge(v[0], v[1], false).unwrap();
        graph.add_edge(v[0], v[2], false).unwrap();
        graph.add_edge(v[0], v[3], false).unwrap();

        assert!((density(&graph, &v) - 0.5).abs() < 1e-6);
        assert_eq!(density(&graph, &v[..1]), 1.0);
        assert_eq!(central_vertices(&graph, &v, 1), vec![v[0]]);
    }

    #[test]
    fn test_summarize_many_clusters_in_parallel() {
        let mut graph = Graph::undirected();
        let clusters: Vec<Cluster> = (0..100)
            .map(|i| {
                let a = graph.add_new_vertex();
                let b = graph.add_new_vertex();
                graph.add_edge(a, b, false).unwrap();
                Cluster::new(i, vec![a, b])
            })
            .collect();

        let stats = summarize(&graph, &clusters);
        assert_eq!(stats.len(), 100);
        assert!(stats.iter().all(|s| s.size == 2 && (s.density - 1.0).abs() < 1e-6));
        assert_eq!(stats[42].id, 42);
    }
}
