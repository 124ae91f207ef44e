//! Direct-mapped cache.
//!
//! One way per line: the line index selects the single candidate entry and
//! the stored tag disambiguates it. There is no replacement policy. A fill
//! to a line simply overrides it, and the eviction output fires when the
//! displaced entry was valid under a different tag.

use tracing::trace;

use crate::common::{ConfigError, Geometry};
use crate::config::CacheConfig;
use crate::interface::{Eviction, ReadResult};
use crate::regfile::RegisterFile;
use crate::stats::CacheStats;

use super::{Cache, CacheInputs, CacheOutputs};

/// Direct-mapped cache over `lines` entries.
#[derive(Debug)]
pub struct DirectMappedCache {
    geom: Geometry,
    rwi_reads: Vec<bool>,
    evictions: bool,
    fill_ports: usize,
    tags: RegisterFile<u64>,
    valids: RegisterFile<bool>,
    data: RegisterFile<u64>,
    stats: CacheStats,
}

impl DirectMappedCache {
    /// Builds the cache from its configuration.
    ///
    /// # Errors
    ///
    /// Fails on any [`CacheConfig::validate`] violation; in particular the
    /// way count must be exactly 1.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.ways != 1 {
            return Err(ConfigError::DirectMappedWays(config.ways));
        }
        let geom = config.geometry()?;
        let lines = geom.lines();
        Ok(Self {
            geom,
            rwi_reads: config.reads.iter().map(|p| p.read_with_invalidate).collect(),
            evictions: config.eviction_ports != 0,
            fill_ports: config.fills.len(),
            tags: RegisterFile::new(lines, 0),
            valids: RegisterFile::new(lines, false),
            data: RegisterFile::new(lines, 0),
            stats: CacheStats::default(),
        })
    }

    /// Forwarded hit test of `addr`'s line against its tag.
    fn hits(&self, line: usize, tag: u64) -> bool {
        self.valids.read(line) && self.tags.read(line) == tag
    }
}

impl Cache for DirectMappedCache {
    fn read_ports(&self) -> usize {
        self.rwi_reads.len()
    }

    fn fill_ports(&self) -> usize {
        self.fill_ports
    }

    fn step(&mut self, inputs: &CacheInputs) -> CacheOutputs {
        debug_assert_eq!(inputs.reads.len(), self.rwi_reads.len());
        debug_assert_eq!(inputs.fills.len(), self.fill_ports);

        let mut evictions = if self.evictions {
            vec![None; inputs.fills.len()]
        } else {
            Vec::new()
        };
        let mut filled: Vec<usize> = Vec::new();
        let mut evicted: Vec<usize> = Vec::new();

        // Invalidating fills first.
        for (port, fill) in inputs.fills.iter().enumerate() {
            if !fill.en || fill.valid {
                continue;
            }
            let addr = self.geom.mask_addr(fill.addr);
            let line = self.geom.line_of(addr);
            let tag = self.geom.tag_of(addr);
            if self.hits(line, tag) {
                trace!(addr, line, "invalidating fill hit");
                if self.evictions && !evicted.contains(&line) {
                    evictions[port] = Some(Eviction {
                        addr,
                        data: self.data.read_registered(line),
                    });
                    evicted.push(line);
                    self.stats.evictions += 1;
                }
                self.valids.stage(line, false);
                self.stats.invalidations += 1;
                filled.push(line);
            }
        }

        // Allocating fills second: a fill overrides the line.
        for (port, fill) in inputs.fills.iter().enumerate() {
            if !fill.en || !fill.valid {
                continue;
            }
            let addr = self.geom.mask_addr(fill.addr);
            let line = self.geom.line_of(addr);
            let tag = self.geom.tag_of(addr);
            let data = self.geom.mask_data(fill.data);
            let displaced = self.valids.read_registered(line)
                && self.tags.read_registered(line) != tag;
            if displaced && self.evictions && !evicted.contains(&line) {
                evictions[port] = Some(Eviction {
                    addr: self
                        .geom
                        .rebuild(self.tags.read_registered(line), line),
                    data: self.data.read_registered(line),
                });
                evicted.push(line);
                self.stats.evictions += 1;
            }
            trace!(addr, line, data, displaced, "fill");
            self.tags.stage(line, tag);
            self.data.stage(line, data);
            self.valids.stage(line, true);
            self.stats.fills += 1;
            filled.push(line);
        }

        // Reads last, observing this cycle's fills.
        let mut reads = Vec::with_capacity(inputs.reads.len());
        for (port, read) in inputs.reads.iter().enumerate() {
            if !read.en {
                reads.push(ReadResult::miss());
                continue;
            }
            debug_assert!(
                !read.invalidate || self.rwi_reads[port],
                "read-with-invalidate on a port not configured for it"
            );
            let addr = self.geom.mask_addr(read.addr);
            let line = self.geom.line_of(addr);
            let tag = self.geom.tag_of(addr);
            if self.hits(line, tag) {
                reads.push(ReadResult::hit(self.data.read(line)));
                self.stats.hits += 1;
                if read.invalidate && self.rwi_reads[port] && !filled.contains(&line) {
                    trace!(addr, line, "read-with-invalidate clearing");
                    self.valids.stage(line, false);
                    self.stats.invalidations += 1;
                }
            } else {
                reads.push(ReadResult::miss());
                self.stats.misses += 1;
            }
        }

        // Clock edge.
        self.tags.tick();
        self.data.tick();
        if inputs.flush {
            self.valids.reset_all(false);
        } else {
            self.valids.tick();
        }

        CacheOutputs { reads, evictions }
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }
}
