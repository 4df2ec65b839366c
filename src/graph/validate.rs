//! Consistency checks run when a graph has extra validation enabled

use crate::error::{Error, Result};
use crate::graph::{Graph, Restriction};

impl Graph {
    /// Verify that every incidence index agrees with the edge set and that
    /// the graph's restrictions hold.
    pub fn check_consistency(&self) -> Result<()> {
        for (id, edge) in &self.edges {
            if edge.parent != Some(self.id()) {
                return Err(Error::Inconsistent(format!("edge {} has a stale owner", id)));
            }
            let (v1, v2) = edge.vertices();
            for endpoint in [v1, v2] {
                let slot = self.vertices.get(&endpoint).ok_or_else(|| {
                    Error::Inconsistent(format!("edge {} references missing vertex {}", id, endpoint))
                })?;
                let hits = slot.incidence.edges().iter().filter(|&&e| e == *id).count();
                if hits != 1 {
                    return Err(Error::Inconsistent(format!(
                        "edge {} is indexed {} times at vertex {}",
                        id, hits, endpoint
                    )));
                }
            }
            if edge.is_self_loop() && self.restrictions().contains(Restriction::NoSelfLoops) {
                return Err(Error::Inconsistent(format!("self-loop {} in a no-self-loop graph", id)));
            }
        }

        for (id, slot) in &self.vertices {
            if slot.vertex.parent != Some(self.id()) {
                return Err(Error::Inconsistent(format!("vertex {} has a stale owner", id)));
            }
            for edge_id in slot.incidence.edges() {
                let touches = self
                    .edges
                    .get(edge_id)
                    .map(|e| e.adjacent_vertex(*id).is_some())
                    .unwrap_or(false);
                if !touches {
                    return Err(Error::Inconsistent(format!(
                        "vertex {} indexes edge {} which does not touch it",
                        id, edge_id
                    )));
                }
            }
        }

        if self.restrictions().contains(Restriction::NoParallelEdges) {
            let edges: Vec<_> = self.edges.values().collect();
            for (i, a) in edges.iter().enumerate() {
                let (v1, v2) = a.vertices();
                if edges[i + 1..]
                    .iter()
                    .any(|b| b.is_parallel_to(v1, v2, a.is_directed()))
                {
                    return Err(Error::Inconsistent(format!("edge {} has a parallel twin", a.id())));
                }
            }
        }

        Ok(())
    }
}
