//! Configuration system for the cache subsystem simulator.
//!
//! This module defines all construction-time configuration structures and
//! enums. It provides:
//! 1. **Defaults:** Baseline hardware constants (widths, line/way counts,
//!    CAM and FIFO depths).
//! 2. **Structures:** Per-component configs for caches, CAMs, replacement
//!    policies, and the cached request/response channel.
//! 3. **Validation:** Every illegal combination is rejected eagerly with a
//!    descriptive [`ConfigError`] before any state is built.
//!
//! Configuration is supplied as JSON (`serde_json`) or built in code; use
//! the `Default` impls as a starting point.

use serde::Deserialize;

use crate::common::{ConfigError, Geometry};

/// Default configuration constants.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Default address width in bits.
    pub const ADDR_W: u32 = 32;

    /// Default data width in bits.
    pub const DATA_W: u32 = 32;

    /// Default transaction-id width in bits.
    pub const ID_W: u32 = 8;

    /// Default number of cache lines (sets).
    pub const LINES: usize = 64;

    /// Default cache associativity.
    pub const WAYS: usize = 4;

    /// Default number of CAM entries.
    pub const CAM_ENTRIES: usize = 8;

    /// Default response FIFO depth.
    ///
    /// Expected to exceed the CAM entry count so that the CAM, not the
    /// FIFO, is the binding capacity of the channel.
    pub const RESP_DEPTH: usize = 16;
}

/// Replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PolicyKind {
    /// Tree pseudo-LRU: one direction bit per internal node of a binary
    /// tree over the ways. Requires a power-of-two way count of at least 2.
    #[default]
    #[serde(alias = "PLRU")]
    TreePlru,

    /// Available-invalidated: tracks per-way valid bits and allocates the
    /// lowest-indexed invalid way. Hits are ignored. Permits one way.
    AvailableInvalidated,
}

/// Cache organizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CacheKind {
    /// One way per line; the line index alone selects the entry.
    DirectMapped,

    /// Multiple ways per line with a per-line replacement policy.
    #[default]
    SetAssociative,

    /// A single set of ways tagged with the full address.
    FullyAssociative,
}

/// Per-port capability flags, shared by read and fill port lists.
///
/// `read_with_invalidate` is only legal on read ports; requesting it on a
/// fill port is a construction error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PortConfig {
    /// Enable read-with-invalidate on this port.
    #[serde(default)]
    pub read_with_invalidate: bool,
}

impl PortConfig {
    /// A port with no extra capabilities.
    pub fn plain() -> Self {
        Self::default()
    }

    /// A read port with read-with-invalidate enabled.
    pub fn with_invalidate() -> Self {
        Self {
            read_with_invalidate: true,
        }
    }
}

/// Construction parameters of one cache.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{CacheConfig, CacheKind};
///
/// let json = r#"{
///     "kind": "FullyAssociative",
///     "addr_w": 8,
///     "data_w": 8,
///     "ways": 4
/// }"#;
/// let config: CacheConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.kind, CacheKind::FullyAssociative);
/// assert_eq!(config.reads.len(), 1);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Cache organization.
    #[serde(default)]
    pub kind: CacheKind,

    /// Address width in bits (1..=64).
    #[serde(default = "CacheConfig::default_addr_w")]
    pub addr_w: u32,

    /// Data width in bits (1..=64).
    #[serde(default = "CacheConfig::default_data_w")]
    pub data_w: u32,

    /// Number of lines (sets). Ignored for fully-associative caches.
    #[serde(default = "CacheConfig::default_lines")]
    pub lines: usize,

    /// Associativity. Must be 1 for direct-mapped caches.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Read port list, in port-index order.
    #[serde(default = "CacheConfig::default_ports")]
    pub reads: Vec<PortConfig>,

    /// Fill port list, in port-index order.
    #[serde(default = "CacheConfig::default_ports")]
    pub fills: Vec<PortConfig>,

    /// Eviction port count: 0 (no eviction outputs) or one per fill port.
    #[serde(default)]
    pub eviction_ports: usize,

    /// Replacement policy for associative organizations.
    #[serde(default)]
    pub policy: PolicyKind,
}

impl CacheConfig {
    /// Returns the default address width.
    fn default_addr_w() -> u32 {
        defaults::ADDR_W
    }

    /// Returns the default data width.
    fn default_data_w() -> u32 {
        defaults::DATA_W
    }

    /// Returns the default line count.
    fn default_lines() -> usize {
        defaults::LINES
    }

    /// Returns the default way count.
    fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Returns the default port list: one plain port.
    fn default_ports() -> Vec<PortConfig> {
        vec![PortConfig::default()]
    }

    /// Number of lines the built cache will have (1 for fully-associative).
    pub fn effective_lines(&self) -> usize {
        match self.kind {
            CacheKind::FullyAssociative => 1,
            CacheKind::DirectMapped | CacheKind::SetAssociative => self.lines,
        }
    }

    /// The geometry implied by this configuration.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(self.addr_w, self.data_w, self.effective_lines())
    }

    /// Checks every construction-time constraint.
    ///
    /// # Errors
    ///
    /// Rejects bad widths and line counts, way counts illegal for the
    /// chosen organization, an empty read port list, eviction ports that
    /// do not match the fill ports one-to-one, and any fill port asking
    /// for read-with-invalidate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.geometry()?;
        if self.reads.is_empty() {
            return Err(ConfigError::NoReadPorts);
        }
        if self.fills.iter().any(|p| p.read_with_invalidate) {
            return Err(ConfigError::InvalidateOnFillPort);
        }
        if self.eviction_ports != 0 && self.eviction_ports != self.fills.len() {
            return Err(ConfigError::EvictionPortMismatch {
                got: self.eviction_ports,
                fills: self.fills.len(),
            });
        }
        match self.kind {
            CacheKind::DirectMapped => {
                if self.ways != 1 {
                    return Err(ConfigError::DirectMappedWays(self.ways));
                }
            }
            CacheKind::SetAssociative => {
                if self.ways < 2 {
                    return Err(ConfigError::SetAssocWays(self.ways));
                }
            }
            CacheKind::FullyAssociative => {
                if self.ways == 0 {
                    return Err(ConfigError::NoWays);
                }
            }
        }
        if self.ways > 64 {
            return Err(ConfigError::TooManyWays(self.ways));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: CacheKind::default(),
            addr_w: defaults::ADDR_W,
            data_w: defaults::DATA_W,
            lines: defaults::LINES,
            ways: defaults::WAYS,
            reads: Self::default_ports(),
            fills: Self::default_ports(),
            eviction_ports: 0,
            policy: PolicyKind::default(),
        }
    }
}

/// Construction parameters of a CAM.
#[derive(Debug, Clone, Deserialize)]
pub struct CamConfig {
    /// Number of entries.
    #[serde(default = "CamConfig::default_entries")]
    pub entries: usize,

    /// Tag width in bits (1..=64).
    #[serde(default = "CamConfig::default_tag_w")]
    pub tag_w: u32,

    /// Lookup port count.
    #[serde(default = "CamConfig::default_one")]
    pub lookup_ports: usize,

    /// Write port count.
    #[serde(default = "CamConfig::default_one")]
    pub write_ports: usize,

    /// Enable invalidate-on-lookup: a lookup asserting `invalidate` clears
    /// the matched entry's valid bit at the next clock edge.
    #[serde(default)]
    pub invalidate_on_lookup: bool,
}

impl CamConfig {
    /// Returns the default entry count.
    fn default_entries() -> usize {
        defaults::CAM_ENTRIES
    }

    /// Returns the default tag width.
    fn default_tag_w() -> u32 {
        defaults::ID_W
    }

    /// Returns the default port count.
    fn default_one() -> usize {
        1
    }

    /// Checks every construction-time constraint.
    ///
    /// # Errors
    ///
    /// Rejects an empty entry set, an empty lookup-port list, and a bad
    /// tag width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries == 0 {
            return Err(ConfigError::NoCamEntries);
        }
        if self.lookup_ports == 0 {
            return Err(ConfigError::NoLookupPorts);
        }
        if self.tag_w == 0 || self.tag_w > 64 {
            return Err(ConfigError::BadIdWidth(self.tag_w));
        }
        Ok(())
    }
}

impl Default for CamConfig {
    fn default() -> Self {
        Self {
            entries: defaults::CAM_ENTRIES,
            tag_w: defaults::ID_W,
            lookup_ports: 1,
            write_ports: 1,
            invalidate_on_lookup: false,
        }
    }
}

/// Port shape of one replacement policy instance.
///
/// Policies are constructed per cache (one logical instance per line for
/// set-associative caches) with fixed port counts; the per-cycle call
/// pattern must match them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Number of independent sets.
    pub sets: usize,
    /// Ways per set.
    pub ways: usize,
    /// Hit port count.
    pub hit_ports: usize,
    /// Allocation port count.
    pub alloc_ports: usize,
    /// Invalidate port count.
    pub invalidate_ports: usize,
}

/// Construction parameters of the cached request/response channel.
///
/// The nested `cache` must agree with the channel on address and data
/// widths; the channel adds the id width for request tracking.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Transaction-id width in bits (1..=64).
    #[serde(default = "ChannelConfig::default_id_w")]
    pub id_w: u32,

    /// Address width in bits (1..=64).
    #[serde(default = "ChannelConfig::default_addr_w")]
    pub addr_w: u32,

    /// Data width in bits (1..=64).
    #[serde(default = "ChannelConfig::default_data_w")]
    pub data_w: u32,

    /// Capacity of the pending-request CAM.
    #[serde(default = "ChannelConfig::default_cam_ways")]
    pub cam_ways: usize,

    /// Response FIFO depth. Expected to exceed `cam_ways`.
    #[serde(default = "ChannelConfig::default_resp_depth")]
    pub resp_depth: usize,

    /// Zero-cycle bypass on the response FIFO.
    #[serde(default)]
    pub resp_bypass: bool,

    /// Accept a miss in the same cycle a downstream response frees a CAM
    /// slot. Declared but not yet supported by any CAM; must stay false.
    #[serde(default)]
    pub cam_fill_rwi_bypass: bool,

    /// Address/data cache configuration.
    #[serde(default = "ChannelConfig::default_cache")]
    pub cache: CacheConfig,
}

impl ChannelConfig {
    /// Returns the default id width.
    fn default_id_w() -> u32 {
        defaults::ID_W
    }

    /// Returns the default address width.
    fn default_addr_w() -> u32 {
        defaults::ADDR_W
    }

    /// Returns the default data width.
    fn default_data_w() -> u32 {
        defaults::DATA_W
    }

    /// Returns the default CAM capacity.
    fn default_cam_ways() -> usize {
        defaults::CAM_ENTRIES
    }

    /// Returns the default response FIFO depth.
    fn default_resp_depth() -> usize {
        defaults::RESP_DEPTH
    }

    /// Returns the default nested cache configuration.
    fn default_cache() -> CacheConfig {
        CacheConfig::default()
    }

    /// Checks every construction-time constraint, including the nested
    /// cache's own validation.
    ///
    /// # Errors
    ///
    /// Rejects bad widths, a zero-entry CAM, a zero-depth response FIFO,
    /// a cache whose widths disagree with the channel's, and a cache
    /// without a fill port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_w == 0 || self.id_w > 64 {
            return Err(ConfigError::BadIdWidth(self.id_w));
        }
        if self.cam_ways == 0 {
            return Err(ConfigError::NoCamEntries);
        }
        if self.resp_depth == 0 {
            return Err(ConfigError::ZeroFifoDepth);
        }
        if self.cam_fill_rwi_bypass {
            return Err(ConfigError::UnsupportedCamBypass);
        }
        self.cache.validate()?;
        if self.cache.addr_w != self.addr_w {
            return Err(ConfigError::ChannelWidthMismatch("address"));
        }
        if self.cache.data_w != self.data_w {
            return Err(ConfigError::ChannelWidthMismatch("data"));
        }
        if self.cache.fills.is_empty() {
            return Err(ConfigError::NoChannelFillPort);
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id_w: defaults::ID_W,
            addr_w: defaults::ADDR_W,
            data_w: defaults::DATA_W,
            cam_ways: defaults::CAM_ENTRIES,
            resp_depth: defaults::RESP_DEPTH,
            resp_bypass: false,
            cam_fill_rwi_bypass: false,
            cache: CacheConfig::default(),
        }
    }
}
