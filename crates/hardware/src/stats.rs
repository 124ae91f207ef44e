//! Simulation statistics collection and reporting.
//!
//! Plain counters incremented on the interesting edges of each component:
//! 1. **Caches:** read hits/misses, committed fills, evictions, and
//!    invalidations (invalidating fills plus read-with-invalidate clears).
//! 2. **Channel:** accepted requests, hit responses, forwarded misses,
//!    downstream responses, non-cacheable responses, and external writes.
//!
//! Counters serialize with `serde` for machine consumption and implement
//! `Display` for quick human-readable reports.

use std::fmt;

use serde::Serialize;

/// Per-cache event counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Enabled reads that matched a valid entry.
    pub hits: u64,
    /// Enabled reads that matched nothing.
    pub misses: u64,
    /// Committed write/allocate fills.
    pub fills: u64,
    /// Eviction outputs fired (alloc-evict and invalidate-evict).
    pub evictions: u64,
    /// Entries cleared by invalidating fills or read-with-invalidate.
    pub invalidations: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "reads:   {} hits / {} misses", self.hits, self.misses)?;
        writeln!(f, "fills:   {}", self.fills)?;
        writeln!(f, "evicted: {}", self.evictions)?;
        write!(f, "cleared: {}", self.invalidations)
    }
}

/// Channel event counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    /// Upstream requests accepted (handshake fired).
    pub requests_accepted: u64,
    /// Requests answered directly from the cache.
    pub hits_returned: u64,
    /// Requests forwarded downstream with a CAM entry allocated.
    pub misses_forwarded: u64,
    /// Downstream responses consumed.
    pub responses_received: u64,
    /// Responses delivered upstream.
    pub responses_delivered: u64,
    /// Downstream responses flagged non-cacheable.
    pub non_cacheable: u64,
    /// External cache writes and invalidations accepted.
    pub external_writes: u64,
}

impl fmt::Display for ChannelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "requests:  {} accepted ({} hit, {} forwarded)",
            self.requests_accepted, self.hits_returned, self.misses_forwarded
        )?;
        writeln!(
            f,
            "responses: {} received ({} non-cacheable), {} delivered",
            self.responses_received, self.non_cacheable, self.responses_delivered
        )?;
        write!(f, "external:  {} writes", self.external_writes)
    }
}
