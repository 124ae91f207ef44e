//! Shared tag/valid/data engine for the associative cache variants.
//!
//! Holds per-way register files over the configured lines, a replacement
//! policy, and the per-cycle fill/read resolution shared by the
//! set-associative and fully-associative caches. One cycle resolves in a
//! fixed order:
//!
//! 1. Invalidating fills, in port order (policy invalidates chain first).
//! 2. Allocating fills, in port order (policy hits/allocations chain next);
//!    hit detection observes the earlier fills of the cycle, so a set never
//!    ends a cycle with two valid entries under one tag.
//! 3. Reads, which observe every fill of the cycle (same-cycle write
//!    forwarding) and register any read-with-invalidate clears.
//!
//! Array writes commit in staging order, so a later-indexed fill port wins
//! a same-way conflict; a fill always beats a same-cycle
//! read-with-invalidate of the way it writes.

use tracing::trace;

use crate::common::Geometry;
use crate::interface::{Eviction, ReadResult};
use crate::policy::ReplacementPolicy;
use crate::regfile::RegisterFile;
use crate::stats::CacheStats;

use super::{CacheInputs, CacheOutputs};

/// Per-way storage plus replacement state for one associative cache.
pub(crate) struct WayArray {
    geom: Geometry,
    ways: usize,
    rwi_reads: Vec<bool>,
    evictions: bool,
    tags: Vec<RegisterFile<u64>>,
    valids: Vec<RegisterFile<bool>>,
    data: Vec<RegisterFile<u64>>,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl WayArray {
    /// Builds the arrays: `ways` register files of `geom.lines()` entries
    /// each, with `policy` choosing victims.
    pub(crate) fn new(
        geom: Geometry,
        ways: usize,
        rwi_reads: Vec<bool>,
        evictions: bool,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        let lines = geom.lines();
        Self {
            geom,
            ways,
            rwi_reads,
            evictions,
            tags: (0..ways).map(|_| RegisterFile::new(lines, 0)).collect(),
            valids: (0..ways).map(|_| RegisterFile::new(lines, false)).collect(),
            data: (0..ways).map(|_| RegisterFile::new(lines, 0)).collect(),
            policy,
            stats: CacheStats::default(),
        }
    }

    /// Number of read ports.
    pub(crate) fn read_ports(&self) -> usize {
        self.rwi_reads.len()
    }

    /// Counters accumulated so far.
    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of valid entries in the pre-edge state.
    pub(crate) fn valid_count(&self) -> usize {
        self.valids
            .iter()
            .map(|way| way.iter_registered().filter(|v| **v).count())
            .sum()
    }

    /// Total entry capacity.
    pub(crate) fn capacity(&self) -> usize {
        self.ways * self.geom.lines()
    }

    /// Smallest way holding `tag` at `line`, in the forwarded view.
    fn lookup(&self, line: usize, tag: u64) -> Option<usize> {
        (0..self.ways)
            .find(|&w| self.valids[w].read(line) && self.tags[w].read(line) == tag)
    }

    /// Smallest invalid way at `line`, in the forwarded view.
    fn first_invalid(&self, line: usize) -> Option<usize> {
        (0..self.ways).find(|&w| !self.valids[w].read(line))
    }

    /// Resolves one cycle; see the module docs for the resolution order.
    pub(crate) fn step(&mut self, inputs: &CacheInputs, fill_ports: usize) -> CacheOutputs {
        debug_assert_eq!(inputs.reads.len(), self.rwi_reads.len());
        debug_assert_eq!(inputs.fills.len(), fill_ports);

        let mut evictions = if self.evictions {
            vec![None; inputs.fills.len()]
        } else {
            Vec::new()
        };
        // Ways written by a fill this cycle (fills beat RWI clears) and
        // entries already reported evicted (exactly one witness per entry).
        let mut filled: Vec<(usize, usize)> = Vec::new();
        let mut evicted: Vec<(usize, usize)> = Vec::new();

        // Invalidating fills first.
        for (port, fill) in inputs.fills.iter().enumerate() {
            if !fill.en || fill.valid {
                continue;
            }
            let addr = self.geom.mask_addr(fill.addr);
            let line = self.geom.line_of(addr);
            let tag = self.geom.tag_of(addr);
            if let Some(way) = self.lookup(line, tag) {
                let old = self.data[way].read_registered(line);
                trace!(addr, way, "invalidating fill hit");
                if self.evictions && !evicted.contains(&(line, way)) {
                    evictions[port] = Some(Eviction { addr, data: old });
                    evicted.push((line, way));
                    self.stats.evictions += 1;
                }
                self.valids[way].stage(line, false);
                self.policy.invalidate(line, way);
                self.stats.invalidations += 1;
                filled.push((line, way));
            }
        }

        // Allocating fills second.
        for (port, fill) in inputs.fills.iter().enumerate() {
            if !fill.en || !fill.valid {
                continue;
            }
            let addr = self.geom.mask_addr(fill.addr);
            let line = self.geom.line_of(addr);
            let tag = self.geom.tag_of(addr);
            let data = self.geom.mask_data(fill.data);
            if let Some(way) = self.lookup(line, tag) {
                // Update in place; the entry stays where it is.
                trace!(addr, way, data, "fill hit, updating");
                self.data[way].stage(line, data);
                self.valids[way].stage(line, true);
                self.policy.hit(line, way);
                filled.push((line, way));
            } else {
                let way = match self.first_invalid(line) {
                    Some(way) => {
                        // An invalid way always takes priority over the
                        // policy's victim.
                        self.policy.claim(line, way);
                        way
                    }
                    None => self.policy.alloc(line),
                };
                let was_valid = self.valids[way].read_registered(line);
                if was_valid && self.evictions && !evicted.contains(&(line, way)) {
                    let victim_addr = self
                        .geom
                        .rebuild(self.tags[way].read_registered(line), line);
                    evictions[port] = Some(Eviction {
                        addr: victim_addr,
                        data: self.data[way].read_registered(line),
                    });
                    evicted.push((line, way));
                    self.stats.evictions += 1;
                }
                trace!(addr, way, data, displaced = was_valid, "fill allocating");
                self.tags[way].stage(line, tag);
                self.data[way].stage(line, data);
                self.valids[way].stage(line, true);
                filled.push((line, way));
            }
            self.stats.fills += 1;
        }

        // Reads last: they observe every fill of this cycle.
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
            match self.lookup(line, tag) {
                Some(way) => {
                    reads.push(ReadResult::hit(self.data[way].read(line)));
                    self.stats.hits += 1;
                    if read.invalidate && self.rwi_reads[port] && !filled.contains(&(line, way)) {
                        // Registered clear: lands at this cycle's edge, so
                        // the entry is gone from the next cycle on. A fill
                        // that wrote the way this cycle wins instead.
                        trace!(addr, way, "read-with-invalidate clearing");
                        self.valids[way].stage(line, false);
                        self.policy.invalidate(line, way);
                        self.stats.invalidations += 1;
                    }
                }
                None => {
                    reads.push(ReadResult::miss());
                    self.stats.misses += 1;
                }
            }
        }

        // Clock edge.
        for way in 0..self.ways {
            self.tags[way].tick();
            self.data[way].tick();
            if inputs.flush {
                self.valids[way].reset_all(false);
            } else {
                self.valids[way].tick();
            }
        }
        if inputs.flush {
            self.policy.reset();
        }

        #[cfg(debug_assertions)]
        self.assert_tag_uniqueness();

        CacheOutputs { reads, evictions }
    }

    /// Post-edge check: no set may hold two valid entries under one tag.
    #[cfg(debug_assertions)]
    fn assert_tag_uniqueness(&self) {
        for line in 0..self.geom.lines() {
            for a in 0..self.ways {
                if !self.valids[a].read_registered(line) {
                    continue;
                }
                for b in (a + 1)..self.ways {
                    debug_assert!(
                        !(self.valids[b].read_registered(line)
                            && self.tags[b].read_registered(line)
                                == self.tags[a].read_registered(line)),
                        "ways {a} and {b} of line {line} share tag {:#x}",
                        self.tags[a].read_registered(line)
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for WayArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WayArray")
            .field("geom", &self.geom)
            .field("ways", &self.ways)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
