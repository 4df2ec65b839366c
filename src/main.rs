use anyhow::Result;
use clap::{Parser, ValueEnum};
use graph_community::cluster::{ClusterAlgorithm, ClusterEngine, ClusterOutcome};
use graph_community::config::{ClusterConfig, GraphConfig};
use graph_community::data::edgelist;
use graph_community::graph::{Directedness, Restriction};
use graph_community::storage;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    WakitaTsurumi,
    GirvanNewman,
    ClausetNewmanMoore,
}

impl From<AlgorithmArg> for ClusterAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::WakitaTsurumi => ClusterAlgorithm::WakitaTsurumi,
            AlgorithmArg::GirvanNewman => ClusterAlgorithm::GirvanNewman,
            AlgorithmArg::ClausetNewmanMoore => ClusterAlgorithm::ClausetNewmanMoore,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "graph-community",
    about = "Modularity-based community detection over edge-list graphs"
)]
struct Cli {
    /// Path to input edge list (`name1 name2` per line)
    #[clap(long)]
    input: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: PathBuf,

    /// Clustering algorithm (overrides the config file)
    #[clap(long, value_enum)]
    algorithm: Option<AlgorithmArg>,

    /// Optional JSON cluster configuration
    #[clap(long)]
    config: Option<PathBuf>,

    /// Treat input edges as directed
    #[clap(long)]
    directed: bool,

    /// Reject self-loops while loading
    #[clap(long)]
    no_self_loops: bool,

    /// Reject parallel edges while loading
    #[clap(long)]
    no_parallel_edges: bool,

    /// Check graph consistency after every mutation
    #[clap(long)]
    extra_validation: bool,

    /// Minimum cluster size reported in results (overrides the config file)
    #[clap(long)]
    min_cluster_size: Option<usize>,

    /// Program computing the external algorithm variants
    #[clap(long)]
    external_program: Option<PathBuf>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        // If threads = 0, use all available cores
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    // Assemble configuration: file first, flags on top
    let mut cluster_config = match &args.config {
        Some(path) => ClusterConfig::from_json_file(path)?,
        None => ClusterConfig::default(),
    };
    if let Some(algorithm) = args.algorithm {
        cluster_config.algorithm = algorithm.into();
    }
    if let Some(min_cluster_size) = args.min_cluster_size {
        cluster_config.min_cluster_size = min_cluster_size;
    }
    if let Some(program) = args.external_program.clone() {
        cluster_config.external_program = Some(program);
    }

    let directedness = if args.directed {
        Directedness::Directed
    } else {
        Directedness::Undirected
    };
    let mut graph_config = GraphConfig::new(directedness);
    if args.no_self_loops {
        graph_config = graph_config.restrict(Restriction::NoSelfLoops);
    }
    if args.no_parallel_edges {
        graph_config = graph_config.restrict(Restriction::NoParallelEdges);
    }
    graph_config.extra_validation = args.extra_validation;

    log::info!("Starting community detection");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    // 1. Load data
    let graph = edgelist::load_edge_list(&args.input, graph_config)?;

    // 2. Find communities
    let min_cluster_size = cluster_config.min_cluster_size;
    let mut engine = ClusterEngine::new(cluster_config).on_progress(|progress| {
        log::info!(
            "Merge cycle {} ({} vertices)",
            progress.cycles_completed,
            progress.total_vertices
        );
    });

    let result = match engine.run(&graph)? {
        ClusterOutcome::Completed(result) => result,
        ClusterOutcome::Cancelled => {
            log::warn!("Clustering was cancelled; no results written");
            return Ok(());
        }
    };

    log::info!("Found {} communities", result.clusters.len());

    // 3. Save results
    storage::save_results(&result, &graph, min_cluster_size, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
