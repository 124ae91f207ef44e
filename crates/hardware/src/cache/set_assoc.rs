//! Set-associative cache.
//!
//! Multiple ways per line, each line with independent replacement state.
//! Hit detection compares every way's tag in parallel, gated by its valid
//! bit. A fill miss allocates an invalid way when one exists; otherwise the
//! replacement policy chooses the victim, and if that victim is valid the
//! displaced entry's reconstructed address and data appear on the fill
//! port's eviction output in the same cycle.

use crate::common::ConfigError;
use crate::config::{CacheConfig, PolicyConfig};
use crate::interface::Occupancy;
use crate::policy::build_policy;
use crate::stats::CacheStats;

use super::ways::WayArray;
use super::{Cache, CacheInputs, CacheOutputs};

/// Set-associative cache over `lines` sets of `ways` ways.
#[derive(Debug)]
pub struct SetAssocCache {
    core: WayArray,
    fill_ports: usize,
}

impl SetAssocCache {
    /// Builds the cache from its configuration.
    ///
    /// # Errors
    ///
    /// Fails on any [`CacheConfig::validate`] violation, and on policy
    /// constraints (tree-PLRU needs a power-of-two way count and at least
    /// one hit port; neither policy accepts more allocation ports than
    /// ways).
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let geom = config.geometry()?;
        let rwi_reads: Vec<bool> = config.reads.iter().map(|p| p.read_with_invalidate).collect();
        let policy = build_policy(
            config.policy,
            &PolicyConfig {
                sets: geom.lines(),
                ways: config.ways,
                hit_ports: config.fills.len(),
                alloc_ports: config.fills.len(),
                invalidate_ports: config.fills.len()
                    + rwi_reads.iter().filter(|r| **r).count(),
            },
        )?;
        Ok(Self {
            core: WayArray::new(
                geom,
                config.ways,
                rwi_reads,
                config.eviction_ports != 0,
                policy,
            ),
            fill_ports: config.fills.len(),
        })
    }
}

impl Cache for SetAssocCache {
    fn read_ports(&self) -> usize {
        self.core.read_ports()
    }

    fn fill_ports(&self) -> usize {
        self.fill_ports
    }

    fn step(&mut self, inputs: &CacheInputs) -> CacheOutputs {
        self.core.step(inputs, self.fill_ports)
    }

    fn occupancy(&self) -> Option<Occupancy> {
        None
    }

    fn stats(&self) -> CacheStats {
        self.core.stats()
    }
}
