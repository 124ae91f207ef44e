//! Fully-associative cache.
//!
//! A single set of ways tagged with the full address: any address may live
//! in any way. Exposes occupancy (`{count, full, empty}` over the valid
//! bits), which the channel consults when it uses an associative structure
//! as a capacity-bounded store.
//!
//! When the cache is full, a fill in the same cycle as a
//! read-with-invalidate that frees a way cannot be accepted: the freeing is
//! registered and lands one cycle later ([`Cache::supports_fill_rwi_bypass`]
//! is false).

use crate::common::{ConfigError, Geometry};
use crate::config::{CacheConfig, PolicyConfig};
use crate::interface::Occupancy;
use crate::policy::build_policy;
use crate::stats::CacheStats;

use super::ways::WayArray;
use super::{Cache, CacheInputs, CacheOutputs};

/// Fully-associative cache of `ways` entries.
#[derive(Debug)]
pub struct FullyAssocCache {
    core: WayArray,
    fill_ports: usize,
}

impl FullyAssocCache {
    /// Builds the cache from its configuration (`lines` is ignored; the
    /// cache is a single set).
    ///
    /// # Errors
    ///
    /// Fails on any [`CacheConfig::validate`] violation and on policy
    /// constraints. The available-invalidated policy permits a single way;
    /// tree-PLRU needs a power-of-two way count of at least 2.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let geom = Geometry::new(config.addr_w, config.data_w, 1)?;
        let rwi_reads: Vec<bool> = config.reads.iter().map(|p| p.read_with_invalidate).collect();
        let policy = build_policy(
            config.policy,
            &PolicyConfig {
                sets: 1,
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

impl Cache for FullyAssocCache {
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
        Some(Occupancy::of(self.core.valid_count(), self.core.capacity()))
    }

    fn supports_fill_rwi_bypass(&self) -> bool {
        false
    }

    fn stats(&self) -> CacheStats {
        self.core.stats()
    }
}
