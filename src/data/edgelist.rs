//! Plain-text edge lists: named input graphs and the external interchange format

use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::graph::{Graph, GraphBuilder, VertexId};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Load a graph from a file of `name1 name2` lines.
///
/// Blank lines and lines starting with `#` are skipped; a line with a single
/// name adds an isolated vertex. Edges rejected by the configured restrictions
/// are logged and dropped.
pub fn load_edge_list(path: impl AsRef<Path>, config: GraphConfig) -> Result<Graph> {
    let path = path.as_ref();
    log::info!("Reading edge list: {}", path.display());

    if !path.exists() {
        return Err(Error::invalid(format!("file not found: {}", path.display())));
    }

    let reader = BufReader::new(File::open(path)?);
    let graph = read_edge_list(reader, config)?;

    log::info!(
        "Loaded graph with {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Build a graph from edge-list text
pub fn read_edge_list(reader: impl BufRead, config: GraphConfig) -> Result<Graph> {
    let mut builder = GraphBuilder::with_config(1024, config);
    let mut rejected = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [name] => {
                builder.get_or_create_vertex(name);
            }
            [src, dst] => match builder.add_edge(src, dst) {
                Ok(_) => {}
                Err(e @ Error::RestrictionViolation { .. }) => {
                    log::warn!("line {}: skipping edge: {}", line_no + 1, e);
                    rejected += 1;
                }
                Err(e) => return Err(e),
            },
            _ => {
                return Err(Error::invalid(format!(
                    "line {}: expected one or two names, found {}",
                    line_no + 1,
                    fields.len()
                )))
            }
        }
    }

    if rejected > 0 {
        log::info!("Skipped {} edges that violate graph restrictions", rejected);
    }

    Ok(builder.build())
}

/// Write vertices and edges in the interchange format: one `id<TAB>id` line
/// per edge, then one `id` line per vertex no edge touches.
pub fn write_interchange(
    writer: &mut impl Write,
    vertices: &[VertexId],
    edges: &[(VertexId, VertexId)],
) -> std::io::Result<()> {
    let mut touched: HashSet<VertexId> = HashSet::with_capacity(vertices.len());
    for &(v1, v2) in edges {
        writeln!(writer, "{}\t{}", v1.value(), v2.value())?;
        touched.insert(v1);
        touched.insert(v2);
    }
    for vertex in vertices.iter().filter(|v| !touched.contains(v)) {
        writeln!(writer, "{}", vertex.value())?;
    }
    Ok(())
}
