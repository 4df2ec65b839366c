//! Deep copies of a graph with fresh identities

use crate::error::{Error, Result};
use crate::graph::element::{DefaultFactory, EdgeFactory, VertexFactory};
use crate::graph::{Graph, VertexId};
use std::collections::HashMap;

/// What to carry over when cloning a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneOptions {
    /// Copy vertex, edge and graph names
    pub copy_names: bool,
    /// Copy metadata maps and vertex locations
    pub copy_metadata: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            copy_names: true,
            copy_metadata: true,
        }
    }
}

impl Graph {
    /// Deep copy into a new graph using the default vertex and edge factories
    pub fn deep_clone(&self, options: CloneOptions) -> Result<Graph> {
        let mut factory = DefaultFactory;
        let mut edge_factory = DefaultFactory;
        self.deep_clone_with(&mut factory, &mut edge_factory, options)
    }

    /// Deep copy into a new graph, creating every vertex and edge through the
    /// given factories.
    ///
    /// The copy has the same directedness and restrictions, and its vertices
    /// and edges follow the source's iteration order, but every identity is new.
    pub fn deep_clone_with(
        &self,
        vertex_factory: &mut dyn VertexFactory,
        edge_factory: &mut dyn EdgeFactory,
        options: CloneOptions,
    ) -> Result<Graph> {
        let mut copy = Graph::new(self.directedness(), self.restrictions());
        copy.set_extra_validation(self.extra_validation());
        if options.copy_names {
            copy.name = self.name.clone();
        }
        if options.copy_metadata {
            copy.metadata = self.metadata.clone();
        }

        let mut mapping: HashMap<VertexId, VertexId> = HashMap::with_capacity(self.vertex_count());
        for source in self.vertices() {
            let mut vertex = vertex_factory.create_vertex();
            if vertex.id() == source.id() || vertex.graph().is_some() {
                return Err(Error::invalid("vertex factory must produce fresh, unowned vertices"));
            }
            if options.copy_names {
                vertex.name = source.name.clone();
            }
            if options.copy_metadata {
                vertex.location = source.location;
                vertex.metadata.extend(source.metadata.clone());
            }
            let id = copy.add_vertex(vertex)?;
            mapping.insert(source.id(), id);
        }

        for source in self.edges() {
            let (v1, v2) = source.vertices();
            let (Some(&c1), Some(&c2)) = (mapping.get(&v1), mapping.get(&v2)) else {
                return Err(Error::Inconsistent(format!(
                    "edge {} references a vertex outside the graph",
                    source.id()
                )));
            };
            let mut edge = edge_factory.create_edge(c1, c2, source.is_directed());
            if edge.id() == source.id() || edge.vertices() != (c1, c2) {
                return Err(Error::invalid("edge factory must produce a fresh edge on the given endpoints"));
            }
            if options.copy_names {
                edge.name = source.name.clone();
            }
            if options.copy_metadata {
                edge.metadata.extend(source.metadata.clone());
            }
            copy.insert_edge(edge)?;
        }

        log::debug!(
            "cloned graph {} into {} ({} vertices, {} edges)",
            self.id(),
            copy.id(),
            copy.vertex_count(),
            copy.edge_count()
        );
        Ok(copy)
    }
}
