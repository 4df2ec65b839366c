//! Per-vertex incidence index and the derived incidence queries

use crate::error::{Error, Result};
use crate::graph::element::Edge;
use crate::graph::{EdgeId, Graph, VertexId};

/// Edges touching one vertex, in attachment order.
///
/// A self-loop is recorded once.
#[derive(Debug, Default, Clone)]
pub(crate) struct IncidenceIndex {
    edges: Vec<EdgeId>,
}

impl IncidenceIndex {
    pub(crate) fn attach(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    pub(crate) fn detach(&mut self, edge: EdgeId) {
        if let Some(pos) = self.edges.iter().position(|&e| e == edge) {
            self.edges.remove(pos);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.edges.clear();
    }

    pub(crate) fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

impl Graph {
    fn incident_records(&self, vertex: VertexId) -> Result<impl Iterator<Item = &Edge> + '_> {
        let slot = self
            .vertices
            .get(&vertex)
            .ok_or_else(|| Error::invalid(format!("vertex {} is not in the graph", vertex)))?;
        Ok(slot.incidence.edges().iter().filter_map(|id| self.edges.get(id)))
    }

    /// Number of incident edges; a self-loop counts once
    pub fn degree(&self, vertex: VertexId) -> Result<usize> {
        self.vertices
            .get(&vertex)
            .map(|slot| slot.incidence.edges().len())
            .ok_or_else(|| Error::invalid(format!("vertex {} is not in the graph", vertex)))
    }

    /// Incident edges that are not self-loops
    pub fn degree_without_self_loops(&self, vertex: VertexId) -> Result<usize> {
        Ok(self.incident_records(vertex)?.filter(|e| !e.is_self_loop()).count())
    }

    pub fn incident_edges(&self, vertex: VertexId) -> Result<Vec<EdgeId>> {
        Ok(self.incident_records(vertex)?.map(Edge::id).collect())
    }

    /// Undirected incident edges plus directed edges whose front vertex is `vertex`
    pub fn incoming_edges(&self, vertex: VertexId) -> Result<Vec<EdgeId>> {
        Ok(self
            .incident_records(vertex)?
            .filter(|e| e.is_incoming_to(vertex))
            .map(Edge::id)
            .collect())
    }

    /// Undirected incident edges plus directed edges whose back vertex is `vertex`
    pub fn outgoing_edges(&self, vertex: VertexId) -> Result<Vec<EdgeId>> {
        Ok(self
            .incident_records(vertex)?
            .filter(|e| e.is_outgoing_from(vertex))
            .map(Edge::id)
            .collect())
    }

    /// Distinct vertices on the other end of incident edges
    pub fn adjacent_vertices(&self, vertex: VertexId) -> Result<Vec<VertexId>> {
        let edges = self.incident_records(vertex)?;
        Ok(collapse(edges.filter_map(|e| e.adjacent_vertex(vertex))))
    }

    /// Distinct vertices on the other end of incoming edges
    pub fn predecessor_vertices(&self, vertex: VertexId) -> Result<Vec<VertexId>> {
        let edges = self.incident_records(vertex)?;
        Ok(collapse(
            edges
                .filter(|e| e.is_incoming_to(vertex))
                .filter_map(|e| e.adjacent_vertex(vertex)),
        ))
    }

    /// Distinct vertices on the other end of outgoing edges
    pub fn successor_vertices(&self, vertex: VertexId) -> Result<Vec<VertexId>> {
        let edges = self.incident_records(vertex)?;
        Ok(collapse(
            edges
                .filter(|e| e.is_outgoing_from(vertex))
                .filter_map(|e| e.adjacent_vertex(vertex)),
        ))
    }
}

/// Drop repeated vertices, keeping first-seen order
fn collapse(vertices: impl Iterator<Item = VertexId>) -> Vec<VertexId> {
    let mut seen = Vec::new();
    for vertex in vertices {
        if !seen.contains(&vertex) {
            seen.push(vertex);
        }
    }
    seen
}
