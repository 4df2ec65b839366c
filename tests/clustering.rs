use graph_community::cluster::metrics::modularity;
use graph_community::cluster::{
    CancellationToken, ClusterAlgorithm, ClusterEngine, ClusterResult, EngineState,
};
use graph_community::config::ClusterConfig;
use graph_community::graph::{CloneOptions, Directedness, Graph, Restrictions, VertexId};
use std::collections::HashSet;

fn graph_from_edges(n: usize, edges: &[(usize, usize)]) -> (Graph, Vec<VertexId>) {
    let mut graph = Graph::undirected();
    let v: Vec<_> = (0..n).map(|i| graph.add_named_vertex(i.to_string())).collect();
    for &(a, b) in edges {
        graph.add_edge(v[a], v[b], false).unwrap();
    }
    (graph, v)
}

fn cluster(graph: &Graph) -> ClusterResult {
    let mut engine = ClusterEngine::new(ClusterConfig::default());
    let result = engine.run(graph).unwrap().into_result().unwrap();
    assert_eq!(engine.state(), EngineState::Done);
    result
}

fn assert_partition(graph: &Graph, result: &ClusterResult) {
    let mut seen = HashSet::new();
    for cluster in &result.clusters {
        assert_eq!(cluster.size, cluster.members.len());
        for &member in &cluster.members {
            assert!(seen.insert(member), "vertex {} in two clusters", member);
        }
    }
    let all: HashSet<_> = graph.vertex_ids().into_iter().collect();
    assert_eq!(seen, all);
}

fn member_sets(result: &ClusterResult) -> Vec<HashSet<VertexId>> {
    result
        .clusters
        .iter()
        .map(|c| c.members.iter().copied().collect())
        .collect()
}

#[test]
fn test_ring_of_four_merges_through_zero_gain() {
    let (graph, _) = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
    let result = cluster(&graph);

    assert_partition(&graph, &result);
    assert!(result.merges.iter().all(|m| m.delta_q >= 0.0));

    // The last merge gains exactly zero and still happens
    assert_eq!(result.merges.len(), 3);
    assert_eq!(result.merges[2].delta_q, 0.0);
    assert_eq!(result.clusters.len(), 1);
    assert!(modularity(&graph, &result.clusters).abs() < 1e-12);
}

#[test]
fn test_two_disjoint_triangles_give_two_communities() {
    let (graph, v) = graph_from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
    let result = cluster(&graph);

    assert_partition(&graph, &result);
    assert_eq!(result.clusters.len(), 2);
    let sets = member_sets(&result);
    let first: HashSet<_> = v[..3].iter().copied().collect();
    let second: HashSet<_> = v[3..].iter().copied().collect();
    assert!(sets.contains(&first));
    assert!(sets.contains(&second));
    assert!((modularity(&graph, &result.clusters) - 0.5).abs() < 1e-9);
}

#[test]
fn test_bridged_stars_stop_before_negative_merge() {
    // Two five-leaf stars whose hubs share a single edge
    let mut edges = vec![(0, 6)];
    edges.extend((1..=5).map(|leaf| (0, leaf)));
    edges.extend((7..=11).map(|leaf| (6, leaf)));
    let (graph, v) = graph_from_edges(12, &edges);

    let result = cluster(&graph);
    assert_partition(&graph, &result);
    assert_eq!(result.clusters.len(), 2);
    assert!(result.merges.iter().all(|m| m.delta_q >= 0.0));

    let sets = member_sets(&result);
    let left: HashSet<_> = v[..6].iter().copied().collect();
    assert!(sets.contains(&left));
}

#[test]
fn test_merges_bounded_by_vertex_count() {
    let complete: Vec<_> = (0..5)
        .flat_map(|a| ((a + 1)..5).map(move |b| (a, b)))
        .collect();
    let path: Vec<_> = (0..9).map(|i| (i, i + 1)).collect();
    let star: Vec<_> = (1..8).map(|leaf| (0, leaf)).collect();

    for (n, edges) in [(5, complete), (10, path), (8, star)] {
        let (graph, _) = graph_from_edges(n, &edges);
        let result = cluster(&graph);
        assert_partition(&graph, &result);
        assert!(result.merges.len() <= n - 1);
        assert_eq!(result.clusters.len(), n - result.merges.len());
    }
}

#[test]
fn test_self_loops_parallel_edges_and_isolates() {
    let mut graph = Graph::new(Directedness::Mixed, Restrictions::NONE);
    let a = graph.add_new_vertex();
    let b = graph.add_new_vertex();
    let c = graph.add_new_vertex();
    let lonely = graph.add_new_vertex();
    graph.add_edge(a, b, true).unwrap();
    graph.add_edge(b, a, false).unwrap();
    graph.add_edge(b, c, false).unwrap();
    graph.add_edge(c, c, true).unwrap();
    graph.add_edge(lonely, lonely, false).unwrap();

    let result = cluster(&graph);
    assert_partition(&graph, &result);
    let sets = member_sets(&result);
    assert!(sets.contains(&HashSet::from([lonely])));
    assert!(result.merges.len() <= 3);
}

#[test]
fn test_clustering_is_deterministic_across_clones() {
    let edges = [
        (0, 1),
        (1, 2),
        (2, 0),
        (2, 3),
        (3, 4),
        (4, 5),
        (5, 3),
        (5, 6),
        (6, 7),
        (7, 8),
        (8, 6),
    ];
    let (graph, _) = graph_from_edges(9, &edges);
    let first = cluster(&graph);
    let second = cluster(&graph);
    assert_eq!(first.merges, second.merges);
    assert_eq!(first.clusters, second.clusters);

    let copy = graph.deep_clone(CloneOptions::default()).unwrap();
    let cloned = cluster(&copy);
    let named = |g: &Graph, r: &ClusterResult| {
        r.clusters
            .iter()
            .map(|c| {
                c.members
                    .iter()
                    .map(|v| g.vertex(*v).unwrap().name.clone().unwrap())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(named(&graph, &first), named(&copy, &cloned));
    assert_eq!(first.clusters.len(), 3);
}

#[test]
fn test_cancelled_before_first_checkpoint() {
    let path: Vec<_> = (0..19).map(|i| (i, i + 1)).collect();
    let (graph, _) = graph_from_edges(20, &path);

    let token = CancellationToken::new();
    token.cancel();
    let config = ClusterConfig {
        progress_interval: 1,
        ..ClusterConfig::default()
    };
    let mut engine = ClusterEngine::new(config).with_cancellation(token);

    let outcome = engine.run(&graph).unwrap();
    assert!(outcome.is_cancelled());
    assert!(outcome.into_result().is_none());
    assert_eq!(engine.state(), EngineState::Cancelled);
}

#[test]
fn test_progress_reports_cycles_and_vertices() {
    let path: Vec<_> = (0..29).map(|i| (i, i + 1)).collect();
    let (graph, _) = graph_from_edges(30, &path);

    let mut reports = Vec::new();
    let config = ClusterConfig {
        progress_interval: 5,
        ..ClusterConfig::new(ClusterAlgorithm::WakitaTsurumi)
    };
    let merges = {
        let mut engine = ClusterEngine::new(config).on_progress(|p| reports.push(p));
        engine.run(&graph).unwrap().into_result().unwrap().merges.len()
    };

    assert_eq!(reports.len(), merges / 5);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.cycles_completed, (i + 1) * 5);
        assert_eq!(report.total_vertices, 30);
    }
}
