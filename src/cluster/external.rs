//! Adapter for clustering variants computed outside the process
//!
//! The external program is called as
//! `<program> [args..] <selector> <input path> <output path>`. The input holds
//! the graph in the interchange edge-list format; the program writes one
//! `clusterId<TAB>vertexId` line per vertex, grouped by cluster.

use crate::cluster::CancellationToken;
use crate::data::edgelist::write_interchange;
use crate::error::{Error, Result};
use crate::graph::{Graph, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Algorithm variants only available through the external service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalVariant {
    GirvanNewman,
    ClausetNewmanMoore,
}

impl ExternalVariant {
    /// Selector passed to the external program
    pub fn selector(self) -> &'static str {
        match self {
            ExternalVariant::GirvanNewman => "girvan-newman",
            ExternalVariant::ClausetNewmanMoore => "clauset-newman-moore",
        }
    }
}

/// Graph snapshot handed to the external service
#[derive(Debug, Clone)]
pub struct ExternalRequest {
    pub variant: ExternalVariant,
    pub vertices: Vec<VertexId>,
    pub edges: Vec<(VertexId, VertexId)>,
}

impl ExternalRequest {
    pub fn from_graph(graph: &Graph, variant: ExternalVariant) -> Self {
        Self {
            variant,
            vertices: graph.vertex_ids(),
            edges: graph.edges().map(|e| e.vertices()).collect(),
        }
    }
}

/// One `(cluster, vertex)` line of service output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub cluster: u64,
    pub vertex: VertexId,
}

/// A synchronous, cancellable cluster computation
pub trait ExternalClusterService {
    /// Compute assignments covering every vertex exactly once, grouped by
    /// cluster. Returns `Ok(None)` if `cancellation` fired first.
    fn compute(
        &mut self,
        request: &ExternalRequest,
        cancellation: &CancellationToken,
    ) -> Result<Option<Vec<Assignment>>>;
}

/// Runs an external program over temporary input/output files.
///
/// Both files are removed when the call returns, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct SubprocessClusterService {
    program: PathBuf,
    args: Vec<String>,
    poll_interval: Duration,
}

impl SubprocessClusterService {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            poll_interval: Duration::from_millis(50),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl ExternalClusterService for SubprocessClusterService {
    fn compute(
        &mut self,
        request: &ExternalRequest,
        cancellation: &CancellationToken,
    ) -> Result<Option<Vec<Assignment>>> {
        let input = tempfile::Builder::new()
            .prefix("graph-community-in-")
            .suffix(".txt")
            .tempfile()?;
        let output = tempfile::Builder::new()
            .prefix("graph-community-out-")
            .suffix(".txt")
            .tempfile()?;

        {
            let mut writer = BufWriter::new(input.as_file());
            write_interchange(&mut writer, &request.vertices, &request.edges)?;
            writer.flush()?;
        }

        log::debug!(
            "Running {} {:?} {} on {}",
            self.program.display(),
            self.args,
            request.variant.selector(),
            input.path().display()
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(request.variant.selector())
            .arg(input.path())
            .arg(output.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::external(format!("could not start {}: {}", self.program.display(), e)))?;

        let status = loop {
            if cancellation.is_cancelled() {
                log::info!("Cancelling external cluster computation");
                // The child may already have exited; either way it is reaped below
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => std::thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::external(format!(
                        "could not poll {}: {}",
                        self.program.display(),
                        e
                    )));
                }
            }
        };

        if !status.success() {
            return Err(Error::external(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }

        read_output(output.path(), &request.vertices).map(Some)
    }
}

/// Read the program's output file; a missing or unreadable file is an
/// external failure, not a local I/O error.
fn read_output(path: &Path, vertices: &[VertexId]) -> Result<Vec<Assignment>> {
    let file = File::open(path)
        .map_err(|e| Error::external(format!("could not read output {}: {}", path.display(), e)))?;
    parse_assignments(BufReader::new(file), vertices).map_err(|e| match e {
        Error::Io(io) => Error::external(format!("could not read output {}: {}", path.display(), io)),
        other => other,
    })
}

/// Parse and check service output against the requested vertex set
pub fn parse_assignments(reader: impl BufRead, vertices: &[VertexId]) -> Result<Vec<Assignment>> {
    let by_value: HashMap<u64, VertexId> = vertices.iter().map(|&v| (v.value(), v)).collect();
    let mut seen_vertices: HashSet<VertexId> = HashSet::with_capacity(vertices.len());
    let mut closed_clusters: HashSet<u64> = HashSet::new();
    let mut current_cluster: Option<u64> = None;
    let mut assignments = Vec::with_capacity(vertices.len());

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(cluster), Some(vertex), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(Error::external(format!("line {}: expected two fields", line_no + 1)));
        };
        let cluster: u64 = cluster
            .parse()
            .map_err(|_| Error::external(format!("line {}: bad cluster id '{}'", line_no + 1, cluster)))?;
        let vertex = vertex
            .parse::<u64>()
            .ok()
            .and_then(|v| by_value.get(&v).copied())
            .ok_or_else(|| Error::external(format!("line {}: unknown vertex '{}'", line_no + 1, vertex)))?;

        if current_cluster != Some(cluster) {
            if let Some(previous) = current_cluster {
                closed_clusters.insert(previous);
            }
            if closed_clusters.contains(&cluster) {
                return Err(Error::external(format!(
                    "line {}: cluster {} is not contiguous",
                    line_no + 1,
                    cluster
                )));
            }
            current_cluster = Some(cluster);
        }
        if !seen_vertices.insert(vertex) {
            return Err(Error::external(format!(
                "line {}: vertex {} assigned twice",
                line_no + 1,
                vertex
            )));
        }
        assignments.push(Assignment { cluster, vertex });
    }

    if seen_vertices.len() != vertices.len() {
        return Err(Error::external(format!(
            "{} of {} vertices were assigned",
            seen_vertices.len(),
            vertices.len()
        )));
    }
    Ok(assignments)
}
