//! Port payloads and per-cycle command/result structs.
//!
//! These are the contracts between components: handshake payloads carried by
//! the channel, and the per-port command/result values a cache or CAM sees
//! in one cycle. A ready/valid handshake is modeled as `Option<T>` on the
//! valid side (None = valid deasserted) plus a plain `bool` on the ready
//! side; a transfer occurs in a cycle where both are present.

/// An upstream request: an id to answer under and an address to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Transaction id the response must carry.
    pub id: u64,
    /// Address to look up.
    pub addr: u64,
}

/// A response: the requested data tagged with the originating id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Transaction id of the request this answers.
    pub id: u64,
    /// Response data word.
    pub data: u64,
    /// When set, the data must not populate the address/data cache.
    pub non_cacheable: bool,
}

/// An external cache write or invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheWrite {
    /// Address to write or invalidate.
    pub addr: u64,
    /// Data to store (ignored when `invalidate` is set).
    pub data: u64,
    /// Invalidate the entry instead of writing it.
    pub invalidate: bool,
}

/// One read port's inputs for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCommand {
    /// Port enable; nothing happens while low.
    pub en: bool,
    /// Address to probe.
    pub addr: u64,
    /// Read-with-invalidate: on a hit, the matched way is invalidated one
    /// cycle later. Only legal on ports configured for it.
    pub invalidate: bool,
}

impl ReadCommand {
    /// An idle (disabled) read port.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A plain enabled read of `addr`.
    pub fn read(addr: u64) -> Self {
        Self {
            en: true,
            addr,
            invalidate: false,
        }
    }

    /// A read-with-invalidate of `addr`.
    pub fn read_invalidate(addr: u64) -> Self {
        Self {
            en: true,
            addr,
            invalidate: true,
        }
    }
}

/// One fill port's inputs for one cycle.
///
/// With `en` high, `valid` selects the write semantics: set means
/// write/allocate `data` at `addr`, clear means invalidate the entry at
/// `addr` if present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillCommand {
    /// Port enable; nothing happens while low.
    pub en: bool,
    /// Write/allocate when set, invalidate when clear.
    pub valid: bool,
    /// Target address.
    pub addr: u64,
    /// Data to store (ignored on an invalidation).
    pub data: u64,
}

impl FillCommand {
    /// An idle (disabled) fill port.
    pub fn idle() -> Self {
        Self::default()
    }

    /// An enabled write of `(addr, data)`.
    pub fn write(addr: u64, data: u64) -> Self {
        Self {
            en: true,
            valid: true,
            addr,
            data,
        }
    }

    /// An enabled invalidation of `addr`.
    pub fn invalidate(addr: u64) -> Self {
        Self {
            en: true,
            valid: false,
            addr,
            data: 0,
        }
    }
}

/// One read port's outputs for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadResult {
    /// Hit indicator. `data` is meaningful only when set.
    pub valid: bool,
    /// Data of the matched entry; undefined on a miss.
    pub data: u64,
}

impl ReadResult {
    /// A miss.
    pub fn miss() -> Self {
        Self::default()
    }

    /// A hit carrying `data`.
    pub fn hit(data: u64) -> Self {
        Self { valid: true, data }
    }
}

/// A displaced or cleared entry, reported in the cycle of the causing fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    /// Address the entry was cached under.
    pub addr: u64,
    /// The entry's pre-eviction data.
    pub data: u64,
}

/// Population of a storage structure, derived from its valid bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    /// Number of valid entries.
    pub count: usize,
    /// All entries valid.
    pub full: bool,
    /// No entries valid.
    pub empty: bool,
}

impl Occupancy {
    /// Derives the occupancy of a structure holding `count` of `capacity`.
    pub fn of(count: usize, capacity: usize) -> Self {
        Self {
            count,
            full: count == capacity,
            empty: count == 0,
        }
    }
}
