//! Results persistence module

use crate::cluster::metrics::{self, ClusterStats};
use crate::cluster::ClusterResult;
use crate::error::Result;
use crate::graph::{Graph, VertexId};
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Save clustering results to the specified directory.
///
/// Writes `summary.json` (graph and partition statistics) and
/// `clusters.json` (every cluster of at least `min_cluster_size` members,
/// largest first).
pub fn save_results(
    result: &ClusterResult,
    graph: &Graph,
    min_cluster_size: usize,
    output_dir: impl AsRef<Path>,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    log::info!("Saving {} clusters to {}", result.clusters.len(), output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    let stats = metrics::summarize(graph, &result.clusters);
    let modularity = metrics::modularity(graph, &result.clusters);

    save_summary(result, graph, modularity, output_dir)?;
    save_clusters(&stats, result, graph, min_cluster_size, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save summary information
fn save_summary(result: &ClusterResult, graph: &Graph, modularity: f64, output_dir: &Path) -> Result<()> {
    log::info!("Saving summary information");

    let path = output_dir.join("summary.json");
    let mut file = File::create(path)?;

    let clusters = &result.clusters;
    let sizes = clusters.iter().map(|c| c.size);
    let summary = json!({
        "algorithm": result.algorithm,
        "graph_stats": {
            "vertex_count": graph.vertex_count(),
            "edge_count": graph.edge_count(),
            "self_loop_count": graph.self_loop_count(),
            "directedness": graph.directedness(),
        },
        "cluster_stats": {
            "cluster_count": clusters.len(),
            "merge_count": result.merges.len(),
            "modularity": modularity,
            "largest_cluster_size": sizes.clone().max().unwrap_or(0),
            "smallest_cluster_size": sizes.clone().min().unwrap_or(0),
            "avg_cluster_size": sizes.sum::<usize>() as f64 /
                                if clusters.is_empty() { 1.0 } else { clusters.len() as f64 },
        }
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save individual cluster information
fn save_clusters(
    stats: &[ClusterStats],
    result: &ClusterResult,
    graph: &Graph,
    min_cluster_size: usize,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving individual cluster information");

    // Resolve vertex names where available
    let label = |id: &VertexId| {
        graph
            .vertex(*id)
            .and_then(|v| v.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut reported: Vec<_> = result
        .clusters
        .iter()
        .zip(stats)
        .filter(|(cluster, _)| cluster.size >= min_cluster_size)
        .collect();
    reported.sort_by(|a, b| b.0.size.cmp(&a.0.size));

    let clusters_json = json!({
        "clusters": reported.iter().map(|(cluster, stats)| {
            json!({
                "id": cluster.id,
                "size": cluster.size,
                "density": stats.density,
                "central_vertices": stats.central_vertices.iter().map(label).collect::<Vec<_>>(),
                "members": cluster.members.iter().map(label).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>()
    });

    let path = output_dir.join("clusters.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&clusters_json)?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{Cluster, ClusterAlgorithm};

    #[test]
    fn test_save_results_writes_both_files() {
        let mut graph = Graph::undirected();
        let a = graph.add_named_vertex("a");
        let b = graph.add_named_vertex("b");
        let c = graph.add_named_vertex("c");
        graph.add_edge(a, b, false).unwrap();

        let result = ClusterResult {
            algorithm: ClusterAlgorithm::WakitaTsurumi,
            clusters: vec![Cluster::new(0, vec![a, b]), Cluster::new(1, vec![c])],
            merges: Vec::new(),
        };

        let dir = tempfile::tempdir().unwrap();
        save_results(&result, &graph, 2, dir.path()).unwrap();

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["cluster_stats"]["cluster_count"], 2);
        assert_eq!(summary["algorithm"], "wakita-tsurumi");

        let clusters: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("clusters.json")).unwrap()).unwrap();
        let listed = clusters["clusters"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["members"], json!(["a", "b"]));
    }
}
