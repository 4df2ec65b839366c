//! Partition cells and the pairwise modularity gains between them

use crate::graph::VertexId;
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

/// Identity of a community within one clustering run.
///
/// Initial communities take `0..n`; every merge allocates the next unused
/// identity, so a merged community always outranks every live one.
pub type CommunityId = usize;

/// Modularity gain from merging `community1` with `community2`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunityPair {
    pub community1: CommunityId,
    pub community2: CommunityId,
    pub delta_q: f64,
}

/// A cell of the partition being built.
///
/// `pairs` holds one entry per neighboring community, owned side first,
/// sorted by the neighbor's identity.
#[derive(Debug, Clone)]
pub struct Community {
    id: CommunityId,
    members: Vec<VertexId>,
    degree: usize,
    pairs: Vec<CommunityPair>,
    best: Option<CommunityPair>,
}

impl Community {
    /// Singleton community for one vertex. `degree` excludes self-loops.
    pub fn singleton(id: CommunityId, vertex: VertexId, degree: usize) -> Self {
        Self {
            id,
            members: vec![vertex],
            degree,
            pairs: Vec::new(),
            best: None,
        }
    }

    pub fn id(&self) -> CommunityId {
        self.id
    }

    pub fn members(&self) -> &[VertexId] {
        &self.members
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn pairs(&self) -> &[CommunityPair] {
        &self.pairs
    }

    /// Locally maximal pair; ties go to the lowest neighbor identity
    pub fn best_pair(&self) -> Option<CommunityPair> {
        self.best
    }

    pub fn pair_with(&self, neighbor: CommunityId) -> Option<&CommunityPair> {
        self.pairs
            .binary_search_by_key(&neighbor, |p| p.community2)
            .ok()
            .map(|i| &self.pairs[i])
    }

    /// Install the initial neighbor table. `neighbors` must be sorted by
    /// neighbor identity.
    pub(crate) fn set_pairs(&mut self, neighbors: impl IntoIterator<Item = (CommunityId, f64)>) {
        let id = self.id;
        self.pairs = neighbors
            .into_iter()
            .map(|(neighbor, delta_q)| CommunityPair {
                community1: id,
                community2: neighbor,
                delta_q,
            })
            .collect();
        debug_assert!(self.pairs.windows(2).all(|w| w[0].community2 < w[1].community2));
        self.refresh_best();
    }

    pub(crate) fn refresh_best(&mut self) {
        self.best = None;
        for pair in &self.pairs {
            match self.best {
                Some(best) if pair.delta_q <= best.delta_q => {}
                _ => self.best = Some(*pair),
            }
        }
    }

    /// Swap the entries for two consumed communities for a single entry
    /// naming the community they merged into.
    pub(crate) fn replace_neighbors(
        &mut self,
        consumed1: CommunityId,
        consumed2: CommunityId,
        merged: CommunityId,
        delta_q: f64,
    ) {
        self.pairs
            .retain(|p| p.community2 != consumed1 && p.community2 != consumed2);
        debug_assert!(self.pairs.last().map_or(true, |p| p.community2 < merged));
        let pair = CommunityPair {
            community1: self.id,
            community2: merged,
            delta_q,
        };
        self.pairs.push(pair);

        let stale = self
            .best
            .map_or(true, |b| b.community2 == consumed1 || b.community2 == consumed2);
        if stale {
            self.refresh_best();
        } else if let Some(best) = self.best {
            // The merged identity sorts last, so it only wins a strict improvement
            if delta_q > best.delta_q {
                self.best = Some(pair);
            }
        }
    }

    /// Combine two communities into a new one with identity `id`.
    ///
    /// The neighbor tables are merge-scanned in identity order:
    /// a neighbor of both takes the sum of the two gains; a neighbor of only
    /// one side is charged `2 * a_other * a_neighbor`; entries naming the
    /// partner are internal to the merge and dropped. `fraction` maps a
    /// community to its share of edge endpoints, `degree / 2m`.
    pub(crate) fn merge(
        id: CommunityId,
        c1: Community,
        c2: Community,
        fraction: impl Fn(CommunityId) -> f64,
    ) -> Community {
        let a1 = fraction(c1.id);
        let a2 = fraction(c2.id);
        let (id1, id2) = (c1.id, c2.id);

        let pairs: Vec<CommunityPair> = c1
            .pairs
            .iter()
            .filter(|p| p.community2 != id2)
            .merge_join_by(
                c2.pairs.iter().filter(|p| p.community2 != id1),
                |x, y| x.community2.cmp(&y.community2),
            )
            .map(|entry| match entry {
                EitherOrBoth::Both(p1, p2) => (p1.community2, p1.delta_q + p2.delta_q),
                EitherOrBoth::Left(p1) => {
                    (p1.community2, p1.delta_q - 2.0 * a2 * fraction(p1.community2))
                }
                EitherOrBoth::Right(p2) => {
                    (p2.community2, p2.delta_q - 2.0 * a1 * fraction(p2.community2))
                }
            })
            .map(|(neighbor, delta_q)| CommunityPair {
                community1: id,
                community2: neighbor,
                delta_q,
            })
            .collect();

        let mut members = c1.members;
        members.extend(c2.members);

        let mut merged = Community {
            id,
            members,
            degree: c1.degree + c2.degree,
            pairs,
            best: None,
        };
        merged.refresh_best();
        merged
    }
}
