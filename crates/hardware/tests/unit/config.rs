//! Construction-Time Validation Tests.
//!
//! Every illegal configuration must fail eagerly with a descriptive
//! error; nothing is detected at runtime. Also covers the JSON
//! configuration surface and its defaults.

use cachesim_core::cache::build_cache;
use cachesim_core::common::ConfigError;
use cachesim_core::config::{CacheConfig, CacheKind, PolicyKind, PortConfig};
use cachesim_core::{CachedChannel, ChannelConfig};
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Cache configuration
// ══════════════════════════════════════════════════════════

/// Bad widths and line counts are rejected with the offending value.
#[rstest]
#[case(0, 8, 4, ConfigError::BadAddrWidth(0))]
#[case(65, 8, 4, ConfigError::BadAddrWidth(65))]
#[case(8, 0, 4, ConfigError::BadDataWidth(0))]
#[case(8, 8, 3, ConfigError::BadLineCount(3))]
#[case(8, 8, 0, ConfigError::BadLineCount(0))]
#[case(2, 8, 8, ConfigError::AddrTooNarrow { addr_w: 2, lines: 8 })]
fn bad_shapes_rejected(
    #[case] addr_w: u32,
    #[case] data_w: u32,
    #[case] lines: usize,
    #[case] expected: ConfigError,
) {
    let config = CacheConfig {
        addr_w,
        data_w,
        lines,
        ..CacheConfig::default()
    };
    assert_eq!(config.validate(), Err(expected));
}

/// Read-with-invalidate on a fill port is a construction error.
#[test]
fn rwi_on_fill_port_rejected() {
    let config = CacheConfig {
        fills: vec![PortConfig::with_invalidate()],
        ..CacheConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::InvalidateOnFillPort));
}

/// Eviction ports must be absent or match the fill ports one-to-one.
#[test]
fn eviction_port_mismatch_rejected() {
    let config = CacheConfig {
        fills: vec![PortConfig::plain(), PortConfig::plain()],
        eviction_ports: 1,
        ..CacheConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::EvictionPortMismatch { got: 1, fills: 2 })
    );
}

/// A cache with no read ports is useless and rejected.
#[test]
fn empty_read_port_list_rejected() {
    let config = CacheConfig {
        reads: Vec::new(),
        ..CacheConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::NoReadPorts));
}

/// Way-count rules follow the organization.
#[rstest]
#[case(CacheKind::DirectMapped, 2, ConfigError::DirectMappedWays(2))]
#[case(CacheKind::SetAssociative, 1, ConfigError::SetAssocWays(1))]
#[case(CacheKind::FullyAssociative, 0, ConfigError::NoWays)]
fn way_count_rules(
    #[case] kind: CacheKind,
    #[case] ways: usize,
    #[case] expected: ConfigError,
) {
    let config = CacheConfig {
        kind,
        ways,
        ..CacheConfig::default()
    };
    assert_eq!(config.validate(), Err(expected));
}

/// The factory propagates the policy's constraints: a 3-way tree PLRU
/// never constructs.
#[test]
fn factory_propagates_policy_errors() {
    let result = build_cache(&CacheConfig {
        kind: CacheKind::FullyAssociative,
        ways: 3,
        policy: PolicyKind::TreePlru,
        ..CacheConfig::default()
    });
    assert_eq!(result.err(), Some(ConfigError::WaysNotPowerOfTwo(3)));
}

// ══════════════════════════════════════════════════════════
// 2. Channel configuration
// ══════════════════════════════════════════════════════════

/// The default channel configuration constructs.
#[test]
fn default_channel_constructs() {
    assert!(CachedChannel::new(&ChannelConfig::default()).is_ok());
}

/// Channel and cache widths must agree.
#[test]
fn channel_width_mismatch_rejected() {
    let config = ChannelConfig {
        addr_w: 16,
        ..ChannelConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::ChannelWidthMismatch("address"))
    );
}

/// A zero-entry CAM and a zero-depth FIFO are rejected.
#[test]
fn zero_capacities_rejected() {
    let config = ChannelConfig {
        cam_ways: 0,
        ..ChannelConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::NoCamEntries));

    let config = ChannelConfig {
        resp_depth: 0,
        ..ChannelConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroFifoDepth));
}

/// The same-cycle CAM freeing hook stays disabled: enabling it fails.
#[test]
fn cam_bypass_hook_rejected() {
    let config = ChannelConfig {
        cam_fill_rwi_bypass: true,
        ..ChannelConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::UnsupportedCamBypass));
}

// ══════════════════════════════════════════════════════════
// 3. JSON surface
// ══════════════════════════════════════════════════════════

/// A sparse JSON config deserializes with defaults filled in and
/// validates.
#[test]
fn json_defaults_fill_in() {
    let json = r#"{
        "id_w": 4,
        "addr_w": 4,
        "data_w": 4,
        "cam_ways": 4,
        "cache": {
            "kind": "FullyAssociative",
            "addr_w": 4,
            "data_w": 4,
            "ways": 8,
            "policy": "AvailableInvalidated"
        }
    }"#;
    let config: ChannelConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.resp_depth, 16, "default FIFO depth");
    assert_eq!(config.cache.reads.len(), 1, "default port lists");
    assert_eq!(config.cache.policy, PolicyKind::AvailableInvalidated);
    assert!(config.validate().is_ok());
    assert!(CachedChannel::new(&config).is_ok());
}

/// The PLRU alias is accepted for the tree policy.
#[test]
fn plru_alias_accepted() {
    let config: CacheConfig =
        serde_json::from_str(r#"{ "policy": "PLRU" }"#).unwrap();
    assert_eq!(config.policy, PolicyKind::TreePlru);
}
