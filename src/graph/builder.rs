//! Graph construction by vertex name

use crate::config::GraphConfig;
use crate::error::Result;
use crate::graph::{Directedness, EdgeId, Graph, VertexId};
use std::collections::HashMap;

/// Builder for incrementally constructing a [`Graph`] from named endpoints
pub struct GraphBuilder {
    /// Graph under construction
    graph: Graph,

    /// Mapping from vertex names to vertex identities
    name_to_vertex: HashMap<String, VertexId>,

    /// Whether edges added through the builder are directed
    directed: bool,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity.
    ///
    /// Extra validation, if configured, is on before the first vertex is added.
    pub fn with_config(capacity: usize, config: GraphConfig) -> Self {
        let mut graph = Graph::new(config.directedness, config.restrictions);
        graph.set_extra_validation(config.extra_validation);
        Self {
            graph,
            name_to_vertex: HashMap::with_capacity(capacity),
            directed: config.directedness == Directedness::Directed,
        }
    }

    /// Get or create a vertex for the given name
    pub fn get_or_create_vertex(&mut self, name: &str) -> VertexId {
        if let Some(&id) = self.name_to_vertex.get(name) {
            return id;
        }

        let id = self.graph.add_named_vertex(name);
        self.name_to_vertex.insert(name.to_string(), id);
        id
    }

    /// Add an edge between two named vertices, creating them if needed.
    ///
    /// Vertices are created even when the edge itself is rejected.
    pub fn add_edge(&mut self, src: &str, dst: &str) -> Result<EdgeId> {
        let src_id = self.get_or_create_vertex(src);
        let dst_id = self.get_or_create_vertex(dst);
        self.graph.add_edge(src_id, dst_id, self.directed)
    }

    /// Finish construction
    pub fn build(self) -> Graph {
        log::debug!(
            "built graph with {} vertices and {} edges",
            self.graph.vertex_count(),
            self.graph.edge_count()
        );
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::{EdgeId, Restriction};

    #[test]
    fn test_builder_reuses_names() {
        let mut builder = GraphBuilder::with_config(4, GraphConfig::default());
        builder.add_edge("a", "b").unwrap();
        builder.add_edge("b", "c").unwrap();
        builder.add_edge("c", "a").unwrap();
        let graph = builder.build();

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        let a = graph.find_vertex_by_name("a").unwrap();
        assert_eq!(graph.degree(a).unwrap(), 2);
    }

    #[test]
    fn test_builder_reports_restriction_violations() {
        let config = GraphConfig::new(Directedness::Directed).restrict(Restriction::NoSelfLoops);
        let mut builder = GraphBuilder::with_config(2, config);
        builder.add_edge("a", "b").unwrap();
        let err = builder.add_edge("a", "a").unwrap_err();
        assert!(matches!(err, Error::RestrictionViolation { .. }));

        let graph = builder.build();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|e| e.is_directed()));
    }

    #[test]
    fn test_extra_validation_runs_while_building() {
        let config = GraphConfig {
            extra_validation: true,
            ..GraphConfig::default()
        };
        let mut builder = GraphBuilder::with_config(4, config);
        let a = builder.get_or_create_vertex("a");

        // Index an edge the graph does not own; the next checked mutation must notice
        let slot = builder.graph.vertices.get_mut(&a).unwrap();
        slot.incidence.attach(EdgeId::next());

        let err = builder.add_edge("b", "c").unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
    }

    #[test]
    fn test_unvalidated_builder_skips_checks() {
        let mut builder = GraphBuilder::with_config(4, GraphConfig::default());
        let a = builder.get_or_create_vertex("a");
        let slot = builder.graph.vertices.get_mut(&a).unwrap();
        slot.incidence.attach(EdgeId::next());

        assert!(builder.add_edge("b", "c").is_ok());
    }
}
