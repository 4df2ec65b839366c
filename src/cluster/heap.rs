//! Indexed max-heap of communities keyed by their best modularity gain

use crate::cluster::community::CommunityId;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Entry {
    community: CommunityId,
    delta_q: f64,
}

impl Entry {
    /// Higher gain wins; equal gains go to the lower community identity
    fn outranks(&self, other: &Entry) -> bool {
        match self.delta_q.total_cmp(&other.delta_q) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.community < other.community,
        }
    }
}

/// Binary max-heap with a position index so that arbitrary communities can
/// be removed or re-keyed in `O(log n)`.
#[derive(Debug, Default, Clone)]
pub struct DeltaQMaxHeap {
    entries: Vec<Entry>,
    positions: HashMap<CommunityId, usize>,
}

impl DeltaQMaxHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, community: CommunityId) -> bool {
        self.positions.contains_key(&community)
    }

    pub fn get(&self, community: CommunityId) -> Option<f64> {
        self.positions.get(&community).map(|&i| self.entries[i].delta_q)
    }

    /// Insert a community, or re-key it if it is already present
    pub fn insert(&mut self, community: CommunityId, delta_q: f64) {
        if let Some(&pos) = self.positions.get(&community) {
            self.entries[pos].delta_q = delta_q;
            self.restore(pos);
            return;
        }
        self.entries.push(Entry { community, delta_q });
        let pos = self.entries.len() - 1;
        self.positions.insert(community, pos);
        self.sift_up(pos);
    }

    /// Remove a community wherever it sits, returning its key
    pub fn remove(&mut self, community: CommunityId) -> Option<f64> {
        let pos = self.positions.remove(&community)?;
        let last = self.entries.len() - 1;
        let removed = self.entries[pos];
        if pos != last {
            self.entries.swap(pos, last);
            self.positions.insert(self.entries[pos].community, pos);
        }
        self.entries.pop();
        if pos < self.entries.len() {
            self.restore(pos);
        }
        Some(removed.delta_q)
    }

    pub fn peek_max(&self) -> Option<(CommunityId, f64)> {
        self.entries.first().map(|e| (e.community, e.delta_q))
    }

    pub fn extract_max(&mut self) -> Option<(CommunityId, f64)> {
        let (community, delta_q) = self.peek_max()?;
        self.remove(community);
        Some((community, delta_q))
    }

    fn restore(&mut self, pos: usize) {
        if pos > 0 && self.entries[pos].outranks(&self.entries[(pos - 1) / 2]) {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.entries[pos].outranks(&self.entries[parent]) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut top = pos;
            if left < len && self.entries[left].outranks(&self.entries[top]) {
                top = left;
            }
            if right < len && self.entries[right].outranks(&self.entries[top]) {
                top = right;
            }
            if top == pos {
                break;
            }
            self.swap(pos, top);
            pos = top;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].community, a);
        self.positions.insert(self.entries[b].community, b);
    }
}
