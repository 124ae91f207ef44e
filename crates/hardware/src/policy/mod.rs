//! Cache replacement policies.
//!
//! A policy answers one question per allocation: which way of a set should
//! receive the incoming entry. Within one cycle a policy may serve several
//! ports; calls chain, so every call observes the effect of the calls made
//! before it in the same cycle (invalidates are issued first, then
//! allocations, matching the cache's fill processing order). Only the value
//! left at the end of the cycle persists, which makes a single mutable
//! state an exact model of the chained-update register.
//!
//! # Policies
//!
//! - `TreePlru`: binary-tree pseudo-LRU over a power-of-two way count.
//! - `AvailableInvalidated`: lowest-indexed invalid way, tracked by
//!   internal valid bits.

/// Available-invalidated replacement policy.
pub mod available;

/// Tree pseudo-LRU replacement policy.
pub mod tree_plru;

pub use available::AvailableInvalidated;
pub use tree_plru::TreePlru;

use crate::common::ConfigError;
use crate::config::{PolicyConfig, PolicyKind};

/// Trait for replacement policies.
///
/// All methods take the set index first; a policy instance covers every set
/// of its cache with independent per-set state.
pub trait ReplacementPolicy {
    /// Ways per set.
    fn ways(&self) -> usize;

    /// Records a hit on `way`: it becomes the least-evictable candidate.
    fn hit(&mut self, set: usize, way: usize);

    /// Chooses a way for an allocation and claims it, so that further
    /// allocations in the same cycle receive distinct ways.
    fn alloc(&mut self, set: usize) -> usize;

    /// Claims `way` for an allocation decided outside the policy (the
    /// cache's invalid-way-first rule). Equivalent to treating the way as
    /// just-used.
    fn claim(&mut self, set: usize, way: usize);

    /// Marks `way` most-evictable: it should be the next victim.
    fn invalidate(&mut self, set: usize, way: usize);

    /// Restores the power-on state of every set.
    fn reset(&mut self);
}

/// Builds a policy of the requested kind, validating its port shape.
///
/// # Errors
///
/// `TreePlru` requires a power-of-two way count of at least 2 and at least
/// one hit port. Both kinds require at most 64 ways and no more allocation
/// ports than ways.
pub fn build_policy(
    kind: PolicyKind,
    config: &PolicyConfig,
) -> Result<Box<dyn ReplacementPolicy>, ConfigError> {
    if config.alloc_ports > config.ways {
        return Err(ConfigError::TooManyAllocPorts {
            allocs: config.alloc_ports,
            ways: config.ways,
        });
    }
    match kind {
        PolicyKind::TreePlru => {
            if config.hit_ports == 0 {
                return Err(ConfigError::NoHitPorts);
            }
            Ok(Box::new(TreePlru::new(config.sets, config.ways)?))
        }
        PolicyKind::AvailableInvalidated => Ok(Box::new(AvailableInvalidated::new(
            config.sets,
            config.ways,
        )?)),
    }
}
