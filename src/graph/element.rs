//! Vertex and edge records plus the factories that create them

use crate::graph::{EdgeId, GraphId, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arbitrary key/value metadata attached to vertices, edges and graphs
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Optional positional attribute of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
}

/// A graph vertex.
///
/// The identity is fixed at creation. `parent` is set while the vertex is a
/// member of a graph and cleared when it is removed.
#[derive(Debug)]
pub struct Vertex {
    id: VertexId,
    pub name: Option<String>,
    pub location: Option<Location>,
    pub metadata: Metadata,
    pub(crate) parent: Option<GraphId>,
}

impl Vertex {
    pub fn new() -> Self {
        Self {
            id: VertexId::next(),
            name: None,
            location: None,
            metadata: Metadata::new(),
            parent: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let mut vertex = Self::new();
        vertex.name = Some(name.into());
        vertex
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The graph this vertex currently belongs to, if any
    pub fn graph(&self) -> Option<GraphId> {
        self.parent
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new()
    }
}

/// A graph edge connecting `vertex1` (the back vertex) to `vertex2` (the front vertex).
///
/// Directedness is fixed at creation. For an undirected edge the endpoint
/// order carries no meaning.
#[derive(Debug)]
pub struct Edge {
    id: EdgeId,
    vertex1: VertexId,
    vertex2: VertexId,
    directed: bool,
    pub name: Option<String>,
    pub metadata: Metadata,
    pub(crate) parent: Option<GraphId>,
}

impl Edge {
    pub fn new(vertex1: VertexId, vertex2: VertexId, directed: bool) -> Self {
        Self {
            id: EdgeId::next(),
            vertex1,
            vertex2,
            directed,
            name: None,
            metadata: Metadata::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn vertex1(&self) -> VertexId {
        self.vertex1
    }

    pub fn vertex2(&self) -> VertexId {
        self.vertex2
    }

    pub fn vertices(&self) -> (VertexId, VertexId) {
        (self.vertex1, self.vertex2)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_self_loop(&self) -> bool {
        self.vertex1 == self.vertex2
    }

    /// The graph this edge currently belongs to, if any
    pub fn graph(&self) -> Option<GraphId> {
        self.parent
    }

    /// Endpoint on the other side of `vertex`; a self-loop yields `vertex` itself
    pub fn adjacent_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        if self.vertex1 == vertex {
            Some(self.vertex2)
        } else if self.vertex2 == vertex {
            Some(self.vertex1)
        } else {
            None
        }
    }

    /// Whether this edge arrives at `vertex` (undirected edges arrive at both ends)
    pub fn is_incoming_to(&self, vertex: VertexId) -> bool {
        if self.directed {
            self.vertex2 == vertex
        } else {
            self.vertex1 == vertex || self.vertex2 == vertex
        }
    }

    /// Whether this edge leaves `vertex` (undirected edges leave both ends)
    pub fn is_outgoing_from(&self, vertex: VertexId) -> bool {
        if self.directed {
            self.vertex1 == vertex
        } else {
            self.vertex1 == vertex || self.vertex2 == vertex
        }
    }

    /// Whether an edge `vertex1 -> vertex2` with the given directedness would be
    /// parallel to this one. Two directed edges compare ordered endpoints; if
    /// either edge is undirected the endpoints compare unordered.
    pub fn is_parallel_to(&self, vertex1: VertexId, vertex2: VertexId, directed: bool) -> bool {
        if self.directed && directed {
            self.vertex1 == vertex1 && self.vertex2 == vertex2
        } else {
            (self.vertex1 == vertex1 && self.vertex2 == vertex2)
                || (self.vertex1 == vertex2 && self.vertex2 == vertex1)
        }
    }
}

/// Creates vertices for graph construction and cloning
pub trait VertexFactory {
    fn create_vertex(&mut self) -> Vertex;
}

/// Creates edges for graph construction and cloning
pub trait EdgeFactory {
    fn create_edge(&mut self, vertex1: VertexId, vertex2: VertexId, directed: bool) -> Edge;
}

/// Factory producing plain vertices and edges
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactory;

impl VertexFactory for DefaultFactory {
    fn create_vertex(&mut self) -> Vertex {
        Vertex::new()
    }
}

impl EdgeFactory for DefaultFactory {
    fn create_edge(&mut self, vertex1: VertexId, vertex2: VertexId, directed: bool) -> Edge {
        Edge::new(vertex1, vertex2, directed)
    }
}
