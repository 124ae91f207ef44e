//! Tree pseudo-LRU replacement policy.
//!
//! One direction bit per internal node of a perfect binary tree over the
//! ways. An allocation descends from the root following the bits to the
//! victim leaf. A hit (or a claim) flips the bits on the root-to-leaf path
//! to point *away* from the touched leaf; an invalidation flips them to
//! point *toward* the invalidated leaf, making it the next victim.
//!
//! Chained multi-port behavior falls out of mutating the per-set bits in
//! call order: each port's update is visible to the next port's descent in
//! the same cycle, and successive allocations therefore receive distinct
//! ways (each claim steers the root path off the just-claimed leaf).

use super::ReplacementPolicy;
use crate::common::ConfigError;

/// Tree-PLRU state: one direction word per set.
///
/// Node `n` of the tree (heap order, root = 1) owns bit `n` of the set's
/// word. A clear bit descends left, a set bit descends right.
#[derive(Debug, Clone)]
pub struct TreePlru {
    nodes: Vec<u64>,
    ways: usize,
    levels: u32,
}

impl TreePlru {
    /// Creates a tree-PLRU instance for `sets` sets of `ways` ways.
    ///
    /// # Errors
    ///
    /// `ways` must be a power of two, at least 2, and at most 64.
    pub fn new(sets: usize, ways: usize) -> Result<Self, ConfigError> {
        if ways < 2 {
            return Err(ConfigError::TooFewWays(ways));
        }
        if !ways.is_power_of_two() {
            return Err(ConfigError::WaysNotPowerOfTwo(ways));
        }
        if ways > 64 {
            return Err(ConfigError::TooManyWays(ways));
        }
        Ok(Self {
            nodes: vec![0; sets],
            ways,
            levels: ways.trailing_zeros(),
        })
    }

    /// Follows the direction bits from the root to the victim leaf.
    fn descend(&self, set: usize) -> usize {
        let bits = self.nodes[set];
        let mut node = 1usize;
        for _ in 0..self.levels {
            let dir = ((bits >> node) & 1) as usize;
            node = node * 2 + dir;
        }
        node - self.ways
    }

    /// Rewrites the path bits for `way`; `toward` selects whether they end
    /// up pointing at the leaf (invalidate) or away from it (touch).
    fn repoint(&mut self, set: usize, way: usize, toward: bool) {
        debug_assert!(way < self.ways);
        let mut node = 1usize;
        for level in (0..self.levels).rev() {
            let went = (way >> level) & 1;
            let bit = if toward { went } else { 1 - went };
            if bit == 1 {
                self.nodes[set] |= 1 << node;
            } else {
                self.nodes[set] &= !(1 << node);
            }
            node = node * 2 + went;
        }
    }
}

impl ReplacementPolicy for TreePlru {
    fn ways(&self) -> usize {
        self.ways
    }

    fn hit(&mut self, set: usize, way: usize) {
        self.repoint(set, way, false);
    }

    fn alloc(&mut self, set: usize) -> usize {
        let way = self.descend(set);
        self.repoint(set, way, false);
        way
    }

    fn claim(&mut self, set: usize, way: usize) {
        self.repoint(set, way, false);
    }

    fn invalidate(&mut self, set: usize, way: usize) {
        self.repoint(set, way, true);
    }

    fn reset(&mut self) {
        for bits in &mut self.nodes {
            *bits = 0;
        }
    }
}
