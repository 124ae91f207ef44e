//! Cache variants: direct-mapped, set-associative, fully-associative.
//!
//! All variants share one per-cycle contract ([`Cache::step`]): present the
//! cycle's read and fill commands, receive the cycle's combinational read
//! results and eviction outputs, and let the clock edge commit. Reads
//! forward same-cycle fills; read-with-invalidate clears are registered and
//! lose to a same-cycle fill of the same way; eviction outputs fire in the
//! cycle of the causing fill and carry the displaced entry's pre-eviction
//! address and data.

/// Direct-mapped cache (one way per line).
pub mod direct;

/// Fully-associative cache (one set, full-address tags).
pub mod full_assoc;

/// Set-associative cache (per-line replacement policy).
pub mod set_assoc;

mod ways;

pub use direct::DirectMappedCache;
pub use full_assoc::FullyAssocCache;
pub use set_assoc::SetAssocCache;

use crate::common::ConfigError;
use crate::config::{CacheConfig, CacheKind};
use crate::interface::{Eviction, FillCommand, Occupancy, ReadCommand, ReadResult};
use crate::stats::CacheStats;

/// All port inputs of one cache for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInputs {
    /// Read port commands, in port-index order.
    pub reads: Vec<ReadCommand>,
    /// Fill port commands, in port-index order.
    pub fills: Vec<FillCommand>,
    /// Level-sensitive flush: while set, every valid bit clears at the
    /// clock edge and the replacement state resets.
    pub flush: bool,
}

impl CacheInputs {
    /// All ports idle for a cache with the given port counts.
    pub fn idle(read_ports: usize, fill_ports: usize) -> Self {
        Self {
            reads: vec![ReadCommand::idle(); read_ports],
            fills: vec![FillCommand::idle(); fill_ports],
            flush: false,
        }
    }
}

/// All port outputs of one cache for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOutputs {
    /// Per-read-port results, in port-index order.
    pub reads: Vec<ReadResult>,
    /// Per-fill-port eviction outputs (empty when the cache was built
    /// without eviction ports).
    pub evictions: Vec<Option<Eviction>>,
}

/// Common contract of every cache variant.
pub trait Cache {
    /// Number of read ports.
    fn read_ports(&self) -> usize;

    /// Number of fill ports.
    fn fill_ports(&self) -> usize;

    /// Advances one clock cycle.
    fn step(&mut self, inputs: &CacheInputs) -> CacheOutputs;

    /// Valid-entry population, for variants that expose it
    /// (fully-associative only).
    fn occupancy(&self) -> Option<Occupancy> {
        None
    }

    /// Whether a fill can land in the slot an in-flight
    /// read-with-invalidate is freeing, in the freeing cycle. The
    /// registered invalidation delays the freeing by one cycle, so no
    /// current variant supports this.
    fn supports_fill_rwi_bypass(&self) -> bool {
        false
    }

    /// Counters accumulated since construction.
    fn stats(&self) -> CacheStats;
}

/// Builds the cache variant selected by `config.kind`.
///
/// # Errors
///
/// Propagates every [`CacheConfig::validate`] failure plus the chosen
/// replacement policy's own construction checks.
pub fn build_cache(config: &CacheConfig) -> Result<Box<dyn Cache>, ConfigError> {
    match config.kind {
        CacheKind::DirectMapped => Ok(Box::new(DirectMappedCache::new(config)?)),
        CacheKind::SetAssociative => Ok(Box::new(SetAssocCache::new(config)?)),
        CacheKind::FullyAssociative => Ok(Box::new(FullyAssocCache::new(config)?)),
    }
}
