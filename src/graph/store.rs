//! Graph container: owns vertex and edge slots and enforces restrictions

use crate::error::{Error, Result};
use crate::graph::element::{Edge, Metadata, Vertex};
use crate::graph::incidence::IncidenceIndex;
use crate::graph::{
    Directedness, EdgeId, GraphEvent, GraphId, GraphObserver, Restriction, Restrictions, VertexId,
};
use std::collections::BTreeMap;
use std::fmt;

/// Vertex record plus the incidence index the graph maintains for it
pub(crate) struct VertexSlot {
    pub(crate) vertex: Vertex,
    pub(crate) incidence: IncidenceIndex,
}

/// An in-memory multigraph.
///
/// Vertices and edges live in slots keyed by identity, so iteration follows
/// identity order and is reproducible for a fixed construction sequence.
/// Every public mutation either applies completely or leaves the graph untouched.
pub struct Graph {
    id: GraphId,
    directedness: Directedness,
    restrictions: Restrictions,
    extra_validation: bool,
    pub name: Option<String>,
    pub metadata: Metadata,
    pub(crate) vertices: BTreeMap<VertexId, VertexSlot>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    observers: Vec<Box<dyn GraphObserver + Send + Sync>>,
}

impl Graph {
    pub fn new(directedness: Directedness, restrictions: Restrictions) -> Self {
        Self {
            id: GraphId::next(),
            directedness,
            restrictions,
            extra_validation: false,
            name: None,
            metadata: Metadata::new(),
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn undirected() -> Self {
        Self::new(Directedness::Undirected, Restrictions::NONE)
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn directedness(&self) -> Directedness {
        self.directedness
    }

    pub fn restrictions(&self) -> Restrictions {
        self.restrictions
    }

    /// Run [`Graph::check_consistency`] after every mutation. Debug aid only.
    pub fn set_extra_validation(&mut self, enabled: bool) {
        self.extra_validation = enabled;
    }

    pub fn extra_validation(&self) -> bool {
        self.extra_validation
    }

    /// Register an observer for vertex/edge additions
    pub fn subscribe(&mut self, observer: Box<dyn GraphObserver + Send + Sync>) {
        self.observers.push(observer);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains_key(&vertex)
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains_key(&edge)
    }

    pub fn vertex(&self, vertex: VertexId) -> Option<&Vertex> {
        self.vertices.get(&vertex).map(|slot| &slot.vertex)
    }

    /// Mutable access to a vertex's name, location and metadata
    pub fn vertex_mut(&mut self, vertex: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&vertex).map(|slot| &mut slot.vertex)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge)
    }

    pub fn edge_mut(&mut self, edge: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&edge)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.values().map(|slot| &slot.vertex)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.keys().copied().collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().copied().collect()
    }

    /// First vertex with the given name. Names are not required to be unique.
    pub fn find_vertex_by_name(&self, name: &str) -> Option<VertexId> {
        self.vertices()
            .find(|v| v.name.as_deref() == Some(name))
            .map(Vertex::id)
    }

    pub fn self_loop_count(&self) -> usize {
        self.edges.values().filter(|e| e.is_self_loop()).count()
    }

    pub fn has_self_loops(&self) -> bool {
        self.edges.values().any(Edge::is_self_loop)
    }

    /// Add a vertex that does not yet belong to any graph
    pub fn add_vertex(&mut self, mut vertex: Vertex) -> Result<VertexId> {
        if let Some(owner) = vertex.parent {
            return Err(Error::invalid(format!(
                "vertex {} already belongs to graph {}",
                vertex.id(),
                owner
            )));
        }
        let id = vertex.id();
        if self.vertices.contains_key(&id) {
            return Err(Error::invalid(format!("vertex {} is already in the graph", id)));
        }

        vertex.parent = Some(self.id);
        self.vertices.insert(
            id,
            VertexSlot {
                vertex,
                incidence: IncidenceIndex::default(),
            },
        );

        self.after_mutation()?;
        self.notify(GraphEvent::VertexAdded(id));
        Ok(id)
    }

    /// Create and add an unnamed vertex
    pub fn add_new_vertex(&mut self) -> VertexId {
        let vertex = Vertex::new();
        let id = vertex.id();
        self.insert_vertex_unchecked(vertex);
        id
    }

    /// Create and add a named vertex
    pub fn add_named_vertex(&mut self, name: impl Into<String>) -> VertexId {
        let vertex = Vertex::named(name);
        let id = vertex.id();
        self.insert_vertex_unchecked(vertex);
        id
    }

    fn insert_vertex_unchecked(&mut self, mut vertex: Vertex) {
        let id = vertex.id();
        vertex.parent = Some(self.id);
        self.vertices.insert(
            id,
            VertexSlot {
                vertex,
                incidence: IncidenceIndex::default(),
            },
        );
        if self.extra_validation {
            if let Err(e) = self.check_consistency() {
                log::error!("consistency check failed after adding {}: {}", id, e);
            }
        }
        self.notify(GraphEvent::VertexAdded(id));
    }

    /// Remove a vertex and, first, every edge incident to it.
    ///
    /// The detached vertex is returned with its graph back-reference cleared.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Result<Vertex> {
        let incident = match self.vertices.get(&vertex) {
            Some(slot) => slot.incidence.edges().to_vec(),
            None => return Err(Error::invalid(format!("vertex {} is not in the graph", vertex))),
        };

        for edge in incident {
            self.detach_edge(edge);
        }

        let mut slot = self
            .vertices
            .remove(&vertex)
            .ok_or_else(|| Error::invalid(format!("vertex {} is not in the graph", vertex)))?;
        slot.vertex.parent = None;

        self.after_mutation()?;
        Ok(slot.vertex)
    }

    /// Create and add an edge between two member vertices
    pub fn add_edge(&mut self, vertex1: VertexId, vertex2: VertexId, directed: bool) -> Result<EdgeId> {
        self.insert_edge(Edge::new(vertex1, vertex2, directed))
    }

    /// Add a prebuilt edge that does not yet belong to any graph.
    ///
    /// Fails with `InvalidEndpoint` if an endpoint is not a member and with
    /// `RestrictionViolation` if the edge would break a restriction. On failure
    /// the graph is unchanged.
    pub fn insert_edge(&mut self, mut edge: Edge) -> Result<EdgeId> {
        let (vertex1, vertex2) = edge.vertices();
        let directed = edge.is_directed();

        if let Some(owner) = edge.parent {
            return Err(Error::invalid(format!(
                "edge {} already belongs to graph {}",
                edge.id(),
                owner
            )));
        }
        if self.edges.contains_key(&edge.id()) {
            return Err(Error::invalid(format!("edge {} is already in the graph", edge.id())));
        }
        if !self.directedness.permits(directed) {
            return Err(Error::invalid(format!(
                "a {} edge cannot be added to a {:?} graph",
                if directed { "directed" } else { "undirected" },
                self.directedness
            )));
        }
        for endpoint in [vertex1, vertex2] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(Error::InvalidEndpoint { vertex: endpoint });
            }
        }
        self.check_restrictions(vertex1, vertex2, directed)?;

        let id = edge.id();
        edge.parent = Some(self.id);
        self.edges.insert(id, edge);
        self.attach_edge(id, vertex1, vertex2);

        self.after_mutation()?;
        self.notify(GraphEvent::EdgeAdded(id));
        Ok(id)
    }

    /// Remove an edge, detaching it from both endpoints' incidence indexes
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<Edge> {
        let mut removed = self
            .detach_edge(edge)
            .ok_or_else(|| Error::invalid(format!("edge {} is not in the graph", edge)))?;
        removed.parent = None;
        self.after_mutation()?;
        Ok(removed)
    }

    /// Remove every edge, keeping the vertices
    pub fn clear_edges(&mut self) {
        self.edges.clear();
        for slot in self.vertices.values_mut() {
            slot.incidence.clear();
        }
    }

    /// Remove every edge and vertex
    pub fn clear(&mut self) {
        self.edges.clear();
        self.vertices.clear();
    }

    /// Edges joining `vertex1` and `vertex2` in either direction
    pub fn edges_connecting(&self, vertex1: VertexId, vertex2: VertexId) -> Vec<EdgeId> {
        let Some(slot) = self.vertices.get(&vertex1) else {
            return Vec::new();
        };
        slot.incidence
            .edges()
            .iter()
            .copied()
            .filter(|id| {
                self.edges
                    .get(id)
                    .and_then(|e| e.adjacent_vertex(vertex1))
                    == Some(vertex2)
            })
            .collect()
    }

    fn check_restrictions(&self, vertex1: VertexId, vertex2: VertexId, directed: bool) -> Result<()> {
        if self.restrictions.contains(Restriction::NoSelfLoops) && vertex1 == vertex2 {
            return Err(Error::RestrictionViolation {
                restriction: Restriction::NoSelfLoops,
                vertex1,
                vertex2,
            });
        }

        if self.restrictions.contains(Restriction::NoParallelEdges) {
            let parallel = self.vertices[&vertex1]
                .incidence
                .edges()
                .iter()
                .filter_map(|id| self.edges.get(id))
                .any(|e| e.is_parallel_to(vertex1, vertex2, directed));
            if parallel {
                return Err(Error::RestrictionViolation {
                    restriction: Restriction::NoParallelEdges,
                    vertex1,
                    vertex2,
                });
            }
        }

        Ok(())
    }

    fn attach_edge(&mut self, edge: EdgeId, vertex1: VertexId, vertex2: VertexId) {
        if let Some(slot) = self.vertices.get_mut(&vertex1) {
            slot.incidence.attach(edge);
        }
        if vertex1 != vertex2 {
            if let Some(slot) = self.vertices.get_mut(&vertex2) {
                slot.incidence.attach(edge);
            }
        }
    }

    fn detach_edge(&mut self, edge: EdgeId) -> Option<Edge> {
        let removed = self.edges.remove(&edge)?;
        let (vertex1, vertex2) = removed.vertices();
        if let Some(slot) = self.vertices.get_mut(&vertex1) {
            slot.incidence.detach(edge);
        }
        if vertex1 != vertex2 {
            if let Some(slot) = self.vertices.get_mut(&vertex2) {
                slot.incidence.detach(edge);
            }
        }
        Some(removed)
    }

    fn after_mutation(&self) -> Result<()> {
        if self.extra_validation {
            self.check_consistency()?;
        }
        Ok(())
    }

    fn notify(&mut self, event: GraphEvent) {
        if self.observers.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_event(self, event);
        }
        observers.append(&mut self.observers);
        self.observers = observers;
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("directedness", &self.directedness)
            .field("restrictions", &self.restrictions)
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edges.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_add_and_remove_vertex() {
        let mut graph = Graph::undirected();
        let a = graph.add_named_vertex("a");
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.vertex(a).unwrap().graph(), Some(graph.id()));

        let removed = graph.remove_vertex(a).unwrap();
        assert_eq!(removed.graph(), None);
        assert_eq!(removed.name.as_deref(), Some("a"));
        assert!(graph.is_empty());
        assert!(matches!(graph.remove_vertex(a), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_vertex_cannot_join_two_graphs() {
        let mut first = Graph::undirected();
        let mut second = Graph::undirected();
        let a = first.add_new_vertex();
        let detached = first.remove_vertex(a).unwrap();
        let a = second.add_vertex(detached).unwrap();
        assert!(second.contains_vertex(a));
        assert!(!first.contains_vertex(a));
    }

    #[test]
    fn test_edge_with_foreign_endpoint_is_rejected() {
        let mut graph = Graph::undirected();
        let mut other = Graph::undirected();
        let a = graph.add_new_vertex();
        let stranger = other.add_new_vertex();

        let err = graph.add_edge(a, stranger, false).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { vertex } if vertex == stranger));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_directedness_mode_is_enforced() {
        let mut graph = Graph::new(Directedness::Directed, Restrictions::NONE);
        let a = graph.add_new_vertex();
        let b = graph.add_new_vertex();
        assert!(matches!(graph.add_edge(a, b, false), Err(Error::InvalidArgument(_))));
        assert!(graph.add_edge(a, b, true).is_ok());

        let mut mixed = Graph::new(Directedness::Mixed, Restrictions::NONE);
        let a = mixed.add_new_vertex();
        let b = mixed.add_new_vertex();
        mixed.add_edge(a, b, true).unwrap();
        mixed.add_edge(a, b, false).unwrap();
        assert_eq!(mixed.edge_count(), 2);
    }

    #[test]
    fn test_no_parallel_edges_directed() {
        let restrictions = Restrictions::from(Restriction::NoParallelEdges);
        let mut graph = Graph::new(Directedness::Directed, restrictions);
        let a = graph.add_new_vertex();
        let b = graph.add_new_vertex();

        graph.add_edge(a, b, true).unwrap();
        // The reverse direction is a different ordered pair
        graph.add_edge(b, a, true).unwrap();
        let err = graph.add_edge(a, b, true).unwrap_err();
        assert!(matches!(
            err,
            Error::RestrictionViolation { restriction: Restriction::NoParallelEdges, .. }
        ));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_remove_edge_detaches_both_ends() {
        let mut graph = Graph::undirected();
        let a = graph.add_new_vertex();
        let b = graph.add_new_vertex();
        let e = graph.add_edge(a, b, false).unwrap();

        let removed = graph.remove_edge(e).unwrap();
        assert_eq!(removed.graph(), None);
        assert_eq!(graph.degree(a).unwrap(), 0);
        assert_eq!(graph.degree(b).unwrap(), 0);
        assert!(graph.remove_edge(e).is_err());
    }

    #[test]
    fn test_clear_edges_keeps_vertices() {
        let mut graph = Graph::undirected();
        let a = graph.add_new_vertex();
        let b = graph.add_new_vertex();
        graph.add_edge(a, b, false).unwrap();
        graph.add_edge(a, a, false).unwrap();

        graph.clear_edges();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.degree(a).unwrap(), 0);

        graph.clear();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_observer_sees_consistent_graph() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut graph = Graph::undirected();
        graph.subscribe(Box::new(move |g: &Graph, event: GraphEvent| {
            if let GraphEvent::EdgeAdded(edge) = event {
                let (v1, _) = g.edge(edge).unwrap().vertices();
                assert!(g.incident_edges(v1).unwrap().contains(&edge));
            }
            sink.lock().unwrap().push(event);
        }));

        let a = graph.add_new_vertex();
        let b = graph.add_new_vertex();
        let e = graph.add_edge(a, b, false).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                GraphEvent::VertexAdded(a),
                GraphEvent::VertexAdded(b),
                GraphEvent::EdgeAdded(e)
            ]
        );
    }

    #[test]
    fn test_edges_connecting() {
        let mut graph = Graph::new(Directedness::Mixed, Restrictions::NONE);
        let a = graph.add_new_vertex();
        let b = graph.add_new_vertex();
        let c = graph.add_new_vertex();
        let ab = graph.add_edge(a, b, true).unwrap();
        let ba = graph.add_edge(b, a, false).unwrap();
        graph.add_edge(a, c, false).unwrap();

        assert_eq!(graph.edges_connecting(a, b), vec![ab, ba]);
        assert_eq!(graph.edges_connecting(b, a), vec![ab, ba]);
        assert!(graph.edges_connecting(b, c).is_empty());
    }
}
