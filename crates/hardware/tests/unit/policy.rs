//! Replacement Policy Tests.
//!
//! Verifies victim selection and chained multi-port behavior for the tree
//! pseudo-LRU and available-invalidated policies, plus the construction
//! checks of the policy factory. Policies are exercised in isolation:
//! `alloc` picks and claims a victim, `hit`/`claim` protect a way,
//! `invalidate` marks a way most-evictable, and every call observes the
//! calls made before it in the same cycle.

use cachesim_core::common::ConfigError;
use cachesim_core::config::{PolicyConfig, PolicyKind};
use cachesim_core::policy::{build_policy, AvailableInvalidated, ReplacementPolicy, TreePlru};

// ══════════════════════════════════════════════════════════
// 1. Tree PLRU
// ══════════════════════════════════════════════════════════

/// Fresh tree bits all point left: the first victim is way 0.
#[test]
fn plru_initial_victim_is_zero() {
    let mut plru = TreePlru::new(1, 4).unwrap();
    assert_eq!(plru.alloc(0), 0);
}

/// Chained allocations receive distinct ways: each claim steers the root
/// path off the just-claimed leaf.
#[test]
fn plru_chained_allocs_are_distinct() {
    let mut plru = TreePlru::new(1, 4).unwrap();
    let picks: Vec<usize> = (0..4).map(|_| plru.alloc(0)).collect();
    assert_eq!(picks, vec![0, 2, 1, 3]);
}

/// Eight-way chained allocations still cover every way exactly once.
#[test]
fn plru_eight_way_allocs_cover_all_ways() {
    let mut plru = TreePlru::new(1, 8).unwrap();
    let mut picks: Vec<usize> = (0..8).map(|_| plru.alloc(0)).collect();
    picks.sort_unstable();
    assert_eq!(picks, (0..8).collect::<Vec<_>>());
}

/// A hit flips the path bits away from the touched leaf.
#[test]
fn plru_hit_protects_way() {
    let mut plru = TreePlru::new(1, 4).unwrap();
    plru.hit(0, 0);
    // The root now points right, away from leaf 0.
    assert_eq!(plru.alloc(0), 2);
}

/// An invalidated way becomes the very next victim.
#[test]
fn plru_invalidate_targets_way() {
    let mut plru = TreePlru::new(1, 4).unwrap();
    plru.hit(0, 0);
    plru.hit(0, 1);
    plru.hit(0, 2);
    plru.invalidate(0, 1);
    assert_eq!(plru.alloc(0), 1);
}

/// Two-way toggle: touching one way points the single bit at the other.
#[test]
fn plru_two_way_toggles() {
    let mut plru = TreePlru::new(1, 2).unwrap();
    plru.hit(0, 0);
    assert_eq!(plru.alloc(0), 1);
    // The alloc claimed way 1, so the bit points back at way 0.
    assert_eq!(plru.alloc(0), 0);
}

/// Per-set state is independent.
#[test]
fn plru_independent_sets() {
    let mut plru = TreePlru::new(2, 4).unwrap();
    plru.hit(0, 0);
    assert_eq!(plru.alloc(0), 2, "set 0 steered away from way 0");
    assert_eq!(plru.alloc(1), 0, "set 1 untouched");
}

/// `claim` behaves like a hit: the externally-chosen way is protected.
#[test]
fn plru_claim_matches_hit() {
    let mut a = TreePlru::new(1, 4).unwrap();
    let mut b = TreePlru::new(1, 4).unwrap();
    a.hit(0, 3);
    b.claim(0, 3);
    assert_eq!(a.alloc(0), b.alloc(0));
}

/// Reset restores the power-on victim order.
#[test]
fn plru_reset_restores_initial_state() {
    let mut plru = TreePlru::new(1, 4).unwrap();
    let _ = plru.alloc(0);
    let _ = plru.alloc(0);
    plru.reset();
    assert_eq!(plru.alloc(0), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Available-invalidated
// ══════════════════════════════════════════════════════════

/// Allocation returns the lowest-indexed available way.
#[test]
fn available_allocates_lowest_invalid() {
    let mut avail = AvailableInvalidated::new(1, 4).unwrap();
    assert_eq!(avail.alloc(0), 0);
    assert_eq!(avail.alloc(0), 1);
    assert_eq!(avail.alloc(0), 2);
    assert_eq!(avail.alloc(0), 3);
    assert!(avail.is_full(0));
}

/// Invalidation releases a way for the next allocation.
#[test]
fn available_invalidate_releases_way() {
    let mut avail = AvailableInvalidated::new(1, 4).unwrap();
    for _ in 0..4 {
        let _ = avail.alloc(0);
    }
    avail.invalidate(0, 2);
    assert!(!avail.is_full(0));
    assert_eq!(avail.alloc(0), 2);
}

/// Hits are ignored: they neither claim nor release.
#[test]
fn available_ignores_hits() {
    let mut avail = AvailableInvalidated::new(1, 2).unwrap();
    avail.hit(0, 0);
    avail.hit(0, 1);
    assert_eq!(avail.alloc(0), 0);
}

/// A single-way instance is legal (unlike tree PLRU).
#[test]
fn available_permits_one_way() {
    let mut avail = AvailableInvalidated::new(1, 1).unwrap();
    assert_eq!(avail.alloc(0), 0);
    assert!(avail.is_full(0));
    avail.invalidate(0, 0);
    assert_eq!(avail.alloc(0), 0);
}

/// `claim` marks an externally-chosen way used.
#[test]
fn available_claim_skips_way() {
    let mut avail = AvailableInvalidated::new(1, 4).unwrap();
    avail.claim(0, 0);
    assert_eq!(avail.alloc(0), 1);
}

/// Reset releases every way.
#[test]
fn available_reset_releases_all() {
    let mut avail = AvailableInvalidated::new(1, 2).unwrap();
    let _ = avail.alloc(0);
    let _ = avail.alloc(0);
    avail.reset();
    assert_eq!(avail.alloc(0), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Construction checks
// ══════════════════════════════════════════════════════════

/// Tree PLRU rejects non-power-of-two and sub-2 way counts.
#[test]
fn plru_rejects_bad_way_counts() {
    assert_eq!(
        TreePlru::new(1, 3).unwrap_err(),
        ConfigError::WaysNotPowerOfTwo(3)
    );
    assert_eq!(TreePlru::new(1, 1).unwrap_err(), ConfigError::TooFewWays(1));
    assert_eq!(TreePlru::new(1, 0).unwrap_err(), ConfigError::TooFewWays(0));
    assert_eq!(
        TreePlru::new(1, 128).unwrap_err(),
        ConfigError::TooManyWays(128)
    );
}

/// The available-invalidated policy rejects only zero and oversize ways.
#[test]
fn available_rejects_zero_ways() {
    assert_eq!(
        AvailableInvalidated::new(1, 0).unwrap_err(),
        ConfigError::NoWays
    );
    assert!(AvailableInvalidated::new(1, 1).is_ok());
}

/// The factory rejects more allocation ports than ways.
#[test]
fn factory_rejects_excess_alloc_ports() {
    let config = PolicyConfig {
        sets: 1,
        ways: 4,
        hit_ports: 1,
        alloc_ports: 5,
        invalidate_ports: 1,
    };
    assert_eq!(
        build_policy(PolicyKind::TreePlru, &config).err(),
        Some(ConfigError::TooManyAllocPorts { allocs: 5, ways: 4 })
    );
}

/// The factory rejects a tree PLRU with no hit ports.
#[test]
fn factory_rejects_missing_hit_ports() {
    let config = PolicyConfig {
        sets: 1,
        ways: 4,
        hit_ports: 0,
        alloc_ports: 1,
        invalidate_ports: 1,
    };
    assert_eq!(
        build_policy(PolicyKind::TreePlru, &config).err(),
        Some(ConfigError::NoHitPorts)
    );
    assert!(
        build_policy(PolicyKind::AvailableInvalidated, &config).is_ok(),
        "available-invalidated ignores hits and accepts zero hit ports"
    );
}
