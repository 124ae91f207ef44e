//! Configuration error definitions.
//!
//! Every illegal configuration is rejected eagerly, at construction time.
//! Once a component is built, its per-cycle behavior is total: there are no
//! recoverable runtime errors anywhere in the simulator. Internal invariants
//! (duplicate tags in a set, a FIFO push while full) are `debug_assert!`s,
//! not error values.

use thiserror::Error;

/// An illegal construction parameter.
///
/// Returned by every component constructor. The variants mirror the checks
/// each component performs; the `Display` messages are the user-visible
/// failure text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Address width outside the supported 1..=64 range.
    #[error("address width {0} must be between 1 and 64 bits")]
    BadAddrWidth(u32),

    /// Data width outside the supported 1..=64 range.
    #[error("data width {0} must be between 1 and 64 bits")]
    BadDataWidth(u32),

    /// Id width outside the supported 1..=64 range.
    #[error("id width {0} must be between 1 and 64 bits")]
    BadIdWidth(u32),

    /// Line (set) count is not a power of two.
    #[error("line count {0} must be a nonzero power of two")]
    BadLineCount(usize),

    /// The address is narrower than the line index it must carry.
    #[error("address width {addr_w} is too narrow to index {lines} lines")]
    AddrTooNarrow {
        /// Configured address width in bits.
        addr_w: u32,
        /// Configured number of lines.
        lines: usize,
    },

    /// Tree-PLRU way count is not a power of two.
    #[error("way count {0} must be a power of two for tree PLRU")]
    WaysNotPowerOfTwo(usize),

    /// Tree-PLRU needs a tree, which needs at least two leaves.
    #[error("tree PLRU needs at least 2 ways, got {0}")]
    TooFewWays(usize),

    /// Way count exceeds the word-level representation limit.
    #[error("at most 64 ways are supported, got {0}")]
    TooManyWays(usize),

    /// More allocation ports than ways can never all receive distinct ways.
    #[error("{allocs} allocation ports exceed the {ways} available ways")]
    TooManyAllocPorts {
        /// Configured allocation port count.
        allocs: usize,
        /// Configured way count.
        ways: usize,
    },

    /// A replacement policy was configured with no hit ports.
    #[error("replacement policy needs at least one hit port")]
    NoHitPorts,

    /// A CAM was configured with no lookup ports.
    #[error("CAM needs at least one lookup port")]
    NoLookupPorts,

    /// A CAM was configured with no entries.
    #[error("CAM needs at least one entry")]
    NoCamEntries,

    /// `read_with_invalidate` was requested on a fill port.
    #[error("read-with-invalidate is not legal on a fill port")]
    InvalidateOnFillPort,

    /// Eviction ports must be absent or match the fill ports one-to-one.
    #[error("{got} eviction ports do not match {fills} fill ports")]
    EvictionPortMismatch {
        /// Configured eviction port count.
        got: usize,
        /// Configured fill port count.
        fills: usize,
    },

    /// A cache was configured with no read ports.
    #[error("cache needs at least one read port")]
    NoReadPorts,

    /// Direct-mapped caches have one way by definition.
    #[error("direct-mapped cache has exactly one way, got {0}")]
    DirectMappedWays(usize),

    /// An associative cache needs at least one way.
    #[error("associative cache needs at least one way")]
    NoWays,

    /// A set-associative cache with one way is direct-mapped.
    #[error("set-associative cache needs at least 2 ways, got {0}")]
    SetAssocWays(usize),

    /// FIFOs cannot hold anything at depth zero.
    #[error("FIFO depth must be at least 1")]
    ZeroFifoDepth,

    /// The channel and its cache were configured with different widths.
    #[error("channel {0} width does not match its cache")]
    ChannelWidthMismatch(&'static str),

    /// The channel cache has no fill port to receive response data.
    #[error("channel cache needs at least one fill port")]
    NoChannelFillPort,

    /// The same-cycle CAM freeing hook was enabled, but every CAM
    /// registers its invalidations and frees slots one cycle late.
    #[error("no CAM implementation supports same-cycle slot freeing")]
    UnsupportedCamBypass,
}
