//! Content-addressable memory with optional invalidate-on-lookup.
//!
//! A CAM maps a tag to the smallest index of a valid entry holding it. Two
//! variants share this type: a plain CAM, and (with
//! `invalidate_on_lookup`) one whose lookup ports can atomically retire the
//! entry they matched. The clear is registered, so it lands at the next
//! clock edge. Same-cycle writes beat same-cycle invalidates to the same
//! entry; the channel never produces that collision because it refuses to
//! track an id that is already live (see [`crate::channel`]).

use tracing::trace;

use crate::common::geometry::mask_to;
use crate::common::ConfigError;
use crate::config::CamConfig;
use crate::interface::Occupancy;
use crate::regfile::RegisterFile;

/// One lookup port's inputs for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamLookup {
    /// Port enable.
    pub en: bool,
    /// Tag to search for.
    pub tag: u64,
    /// Clear the matched entry's valid bit at the next edge (only on CAMs
    /// built with `invalidate_on_lookup`).
    pub invalidate: bool,
}

impl CamLookup {
    /// An idle (disabled) lookup port.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A plain lookup of `tag`.
    pub fn lookup(tag: u64) -> Self {
        Self {
            en: true,
            tag,
            invalidate: false,
        }
    }

    /// A lookup of `tag` that retires the matched entry.
    pub fn lookup_invalidate(tag: u64) -> Self {
        Self {
            en: true,
            tag,
            invalidate: true,
        }
    }
}

/// One write port's inputs for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamWrite {
    /// Port enable.
    pub en: bool,
    /// Entry to write.
    pub idx: usize,
    /// Tag to store.
    pub tag: u64,
    /// New valid bit for the entry.
    pub set_valid: bool,
}

impl CamWrite {
    /// An idle (disabled) write port.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A write making entry `idx` valid with `tag`.
    pub fn store(idx: usize, tag: u64) -> Self {
        Self {
            en: true,
            idx,
            tag,
            set_valid: true,
        }
    }

    /// A write clearing entry `idx`.
    pub fn clear(idx: usize) -> Self {
        Self {
            en: true,
            idx,
            tag: 0,
            set_valid: false,
        }
    }
}

/// One lookup port's combinational outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamHit {
    /// A valid entry matched.
    pub hit: bool,
    /// Smallest matching index; 0 on a miss.
    pub idx: usize,
}

/// Associative tag store, stepped one cycle at a time.
#[derive(Debug)]
pub struct Cam {
    config: CamConfig,
    tag_mask: u64,
    tags: RegisterFile<u64>,
    valids: RegisterFile<bool>,
}

impl Cam {
    /// Builds a CAM from its configuration.
    ///
    /// # Errors
    ///
    /// Fails on a zero entry count, an empty lookup-port list, or a bad
    /// tag width.
    pub fn new(config: &CamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            tag_mask: mask_to(u64::MAX, config.tag_w),
            tags: RegisterFile::new(config.entries, 0),
            valids: RegisterFile::new(config.entries, false),
        })
    }

    /// Number of entries.
    #[inline]
    pub fn entries(&self) -> usize {
        self.config.entries
    }

    /// Combinational lookup against the pre-edge state.
    ///
    /// Returns a hit and the smallest index of a valid entry whose tag
    /// matches, or `{hit: false, idx: 0}`.
    pub fn lookup(&self, en: bool, tag: u64) -> CamHit {
        if !en {
            return CamHit::default();
        }
        let tag = tag & self.tag_mask;
        for idx in 0..self.config.entries {
            if self.valids.read_registered(idx) && self.tags.read_registered(idx) == tag {
                return CamHit { hit: true, idx };
            }
        }
        CamHit::default()
    }

    /// Occupancy derived from the pre-edge valid bits.
    pub fn occupancy(&self) -> Occupancy {
        let count = self.valids.iter_registered().filter(|v| **v).count();
        Occupancy::of(count, self.config.entries)
    }

    /// Advances one cycle: resolves all lookups combinationally, registers
    /// any invalidate-on-hit clears, applies the writes, and commits.
    ///
    /// Writes beat invalidates targeting the same entry in the same cycle.
    pub fn step(&mut self, lookups: &[CamLookup], writes: &[CamWrite]) -> Vec<CamHit> {
        debug_assert_eq!(lookups.len(), self.config.lookup_ports);
        debug_assert_eq!(writes.len(), self.config.write_ports);

        let hits: Vec<CamHit> = lookups
            .iter()
            .map(|l| self.lookup(l.en, l.tag))
            .collect();

        if self.config.invalidate_on_lookup {
            for (lookup, hit) in lookups.iter().zip(&hits) {
                if lookup.en && lookup.invalidate && hit.hit {
                    trace!(idx = hit.idx, tag = lookup.tag, "cam invalidate-on-hit");
                    self.valids.stage(hit.idx, false);
                }
            }
        } else {
            debug_assert!(
                lookups.iter().all(|l| !(l.en && l.invalidate)),
                "invalidate asserted on a CAM built without invalidate-on-lookup"
            );
        }

        for write in writes {
            if !write.en {
                continue;
            }
            let tag = write.tag & self.tag_mask;
            if write.set_valid {
                let dup = self.lookup(true, tag);
                debug_assert!(
                    !dup.hit || dup.idx == write.idx,
                    "CAM write of tag {tag:#x} duplicates valid entry {}",
                    dup.idx
                );
            }
            trace!(idx = write.idx, tag, valid = write.set_valid, "cam write");
            self.tags.stage(write.idx, tag);
            self.valids.stage(write.idx, write.set_valid);
        }

        self.tags.tick();
        self.valids.tick();
        hits
    }
}
