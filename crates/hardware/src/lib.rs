//! Cycle-accurate cache subsystem simulator.
//!
//! This crate implements a synchronous, single-clocked cache subsystem with
//! the following:
//! 1. **Caches:** Direct-mapped, set-associative, and fully-associative
//!    variants with multi-port read/fill, same-cycle write forwarding,
//!    eviction outputs, and read-with-invalidate.
//! 2. **Replacement:** Tree pseudo-LRU and available-invalidated policies
//!    with chained multi-port updates.
//! 3. **CAM:** Associative tag lookup with per-entry valid bits and an
//!    atomic, registered invalidate-on-lookup.
//! 4. **Channel:** A ready/valid request router that answers hits from the
//!    cache, forwards misses downstream while tracking ids in the CAM, and
//!    arbitrates hit and response traffic into a response FIFO.
//! 5. **Building blocks:** Multi-port register file and ready/valid FIFO.
//!
//! Everything advances in explicit clock cycles: each component exposes a
//! `step` that consumes one cycle's port inputs, returns the cycle's
//! combinational outputs, and commits the clock edge. Between steps no
//! intermediate state is observable.

/// Cache variants (direct-mapped, set-associative, fully-associative).
pub mod cache;
/// Content-addressable memory with optional invalidate-on-lookup.
pub mod cam;
/// Cached request/response channel.
pub mod channel;
/// Common types (errors, geometry).
pub mod common;
/// Construction-time configuration structures and validation.
pub mod config;
/// Ready/valid FIFO with optional zero-cycle bypass.
pub mod fifo;
/// Port payloads and per-cycle command/result structs.
pub mod interface;
/// Replacement policies (tree PLRU, available-invalidated).
pub mod policy;
/// Multi-port register file with same-cycle write forwarding.
pub mod regfile;
/// Event counters for caches and the channel.
pub mod stats;

/// Cache contract and factory; see [`cache`] for the variants.
pub use crate::cache::{build_cache, Cache, CacheInputs, CacheOutputs};
/// Associative tag store used for pending-request tracking.
pub use crate::cam::Cam;
/// Top-level request router; construct with [`CachedChannel::new`].
pub use crate::channel::{CachedChannel, ChannelInputs, ChannelOutputs};
/// Construction error type returned by every constructor.
pub use crate::common::ConfigError;
/// Root configuration types; start from their `Default` impls or JSON.
pub use crate::config::{CacheConfig, CamConfig, ChannelConfig, PolicyKind};
