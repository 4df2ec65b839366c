//! Configuration for graph construction and clustering runs

use crate::cluster::ClusterAlgorithm;
use crate::error::{Error, Result};
use crate::graph::{Directedness, Restriction, Restrictions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Merge cycles between cancellation/progress checkpoints
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Settings for a clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Which algorithm to run
    pub algorithm: ClusterAlgorithm,

    /// Merge cycles between cancellation checks and progress reports
    pub progress_interval: usize,

    /// Smallest cluster reported in saved results
    pub min_cluster_size: usize,

    /// Program implementing the external algorithm variants
    pub external_program: Option<PathBuf>,

    /// Extra arguments passed before the variant selector
    pub external_args: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            algorithm: ClusterAlgorithm::WakitaTsurumi,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            min_cluster_size: 1,
            external_program: None,
            external_args: Vec::new(),
        }
    }
}

impl ClusterConfig {
    /// Create a new configuration for the given algorithm
    pub fn new(algorithm: ClusterAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ClusterConfig = serde_json::from_str(&text).map_err(|e| {
            Error::invalid(format!("config {}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_interval == 0 {
            return Err(Error::invalid("progress_interval must be at least 1"));
        }
        Ok(())
    }
}

/// Settings for a graph built from input data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub directedness: Directedness,
    pub restrictions: Restrictions,
    pub extra_validation: bool,
}

impl GraphConfig {
    pub fn new(directedness: Directedness) -> Self {
        Self {
            directedness,
            ..Self::default()
        }
    }

    pub fn restrict(mut self, restriction: Restriction) -> Self {
        self.restrictions = self.restrictions.with(restriction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "algorithm": "girvan-newman", "min_cluster_size": 3 }}"#).unwrap();

        let config = ClusterConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.algorithm, ClusterAlgorithm::GirvanNewman);
        assert_eq!(config.min_cluster_size, 3);
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "progress_interval": 0 }}"#).unwrap();
        assert!(matches!(
            ClusterConfig::from_json_file(file.path()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_graph_config_restrictions() {
        let config = GraphConfig::new(Directedness::Mixed).restrict(Restriction::NoSelfLoops);
        assert!(config.restrictions.contains(Restriction::NoSelfLoops));
        assert!(!config.restrictions.contains(Restriction::NoParallelEdges));
    }
}
