//! In-memory multigraph: vertices, edges, incidence views and structural restrictions

pub mod builder;
pub mod clone;
pub mod element;
pub mod incidence;
pub mod store;
pub mod validate;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

pub use builder::GraphBuilder;
pub use clone::CloneOptions;
pub use element::{DefaultFactory, Edge, EdgeFactory, Location, Metadata, Vertex, VertexFactory};
pub use store::Graph;

macro_rules! id_type {
    ($name:ident, $counter:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        static $counter: AtomicU64 = AtomicU64::new(1);

        impl $name {
            /// Allocate the next identity. Identities are never handed out twice
            /// within a process.
            pub(crate) fn next() -> Self {
                $name($counter.fetch_add(1, Ordering::Relaxed))
            }

            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(VertexId, NEXT_VERTEX_ID, "v");
id_type!(EdgeId, NEXT_EDGE_ID, "e");
id_type!(GraphId, NEXT_GRAPH_ID, "g");

/// Whether a graph's edges are undirected, directed, or a per-edge mixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directedness {
    #[default]
    Undirected,
    Directed,
    Mixed,
}

impl Directedness {
    /// Whether an edge with the given directedness may live in a graph of this mode
    pub fn permits(self, directed: bool) -> bool {
        match self {
            Directedness::Undirected => !directed,
            Directedness::Directed => directed,
            Directedness::Mixed => true,
        }
    }
}

impl FromStr for Directedness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "undirected" => Ok(Directedness::Undirected),
            "directed" => Ok(Directedness::Directed),
            "mixed" => Ok(Directedness::Mixed),
            other => Err(Error::invalid(format!("unrecognized directedness '{}'", other))),
        }
    }
}

/// A single structural restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Restriction {
    NoSelfLoops,
    NoParallelEdges,
}

impl Restriction {
    fn bit(self) -> u8 {
        match self {
            Restriction::NoSelfLoops => 0b01,
            Restriction::NoParallelEdges => 0b10,
        }
    }
}

/// Any combination of [`Restriction`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Restrictions(u8);

impl Restrictions {
    pub const NONE: Restrictions = Restrictions(0);
    const ALL_BITS: u8 = 0b11;

    /// Build from a raw bitset, rejecting bits that name no restriction
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::ALL_BITS != 0 {
            return Err(Error::invalid(format!("unrecognized restriction bits {:#04b}", bits)));
        }
        Ok(Restrictions(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn with(self, restriction: Restriction) -> Self {
        Restrictions(self.0 | restriction.bit())
    }

    pub fn contains(self, restriction: Restriction) -> bool {
        self.0 & restriction.bit() != 0
    }
}

impl From<Restriction> for Restrictions {
    fn from(restriction: Restriction) -> Self {
        Restrictions::NONE.with(restriction)
    }
}

impl TryFrom<u8> for Restrictions {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        Restrictions::from_bits(bits)
    }
}

impl From<Restrictions> for u8 {
    fn from(restrictions: Restrictions) -> u8 {
        restrictions.0
    }
}

/// Structural change fired after a mutation has been fully applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    VertexAdded(VertexId),
    EdgeAdded(EdgeId),
}

/// Receives [`GraphEvent`]s from a graph it has been registered with
pub trait GraphObserver {
    fn on_event(&mut self, graph: &Graph, event: GraphEvent);
}

impl<F> GraphObserver for F
where
    F: FnMut(&Graph, GraphEvent),
{
    fn on_event(&mut self, graph: &Graph, event: GraphEvent) {
        self(graph, event)
    }
}
