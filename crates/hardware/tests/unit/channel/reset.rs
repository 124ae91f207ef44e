//! Cache Reset Tests.
//!
//! `reset_cache` is level-sensitive and non-blocking: while asserted,
//! every request looks like a miss and response fills are suppressed, but
//! the CAM keeps tracking outstanding ids and the response FIFO keeps
//! flowing. Deassertion leaves an empty cache behind.

use cachesim_core::interface::Response;
use pretty_assertions::assert_eq;

use crate::common::harness::ChannelHarness;

use super::channel_config;

/// While reset is asserted, a cached address still misses and is
/// forwarded downstream.
#[test]
fn reset_suppresses_hits() {
    let mut h = ChannelHarness::new(&channel_config(8, 8));
    h.fetch(1, 0xA, 0x5);

    h.reset_cache = true;
    h.submit(2, 0xA);
    let _ = h.step();
    assert_eq!(h.forwarded.len(), 2, "the cached address was forwarded anyway");
}

/// Responses consumed during reset still reach upstream (the CAM and
/// FIFO operate normally), but nothing lands in the cache.
#[test]
fn reset_keeps_cam_and_fifo_alive() {
    let mut h = ChannelHarness::new(&channel_config(8, 8));

    h.reset_cache = true;
    h.submit(1, 0xA);
    let _ = h.step();
    assert_eq!(h.channel.pending().count, 1, "CAM tracked the miss");

    h.respond(1, 0xD);
    h.step_n(2);
    assert_eq!(
        h.delivered,
        vec![Response { id: 1, data: 0xD, non_cacheable: false }],
        "the response flowed through the FIFO"
    );
    assert!(h.channel.pending().empty, "the CAM entry retired");

    // Deassert: the suppressed fill left nothing behind.
    h.reset_cache = false;
    h.submit(2, 0xA);
    let _ = h.step();
    assert_eq!(h.forwarded.len(), 2, "the address was never cached");
}

/// Deassertion reveals an empty cache: everything cached before the
/// reset misses afterwards.
#[test]
fn reset_empties_cache() {
    let mut h = ChannelHarness::new(&channel_config(8, 8));
    h.fetch(1, 0xA, 0x5);
    h.fetch(2, 0xB, 0x6);

    // One reset cycle with no other traffic.
    h.reset_cache = true;
    let _ = h.step();
    h.reset_cache = false;

    h.submit(3, 0xA);
    let _ = h.step();
    h.submit(4, 0xB);
    let _ = h.step();
    assert_eq!(h.forwarded.len(), 4, "both previously cached addresses missed");
}

/// A hit in flight before the reset is unaffected; a request held across
/// the assertion edge resolves as a miss.
#[test]
fn reset_is_level_sensitive() {
    let mut h = ChannelHarness::new(&channel_config(8, 8));
    h.fetch(1, 0xA, 0x5);

    // Normal hit before the reset.
    h.submit(2, 0xA);
    h.step_n(2);
    assert_eq!(h.forwarded.len(), 1);

    // Assert reset mid-stream with a request already held.
    h.submit(3, 0xA);
    h.reset_cache = true;
    let _ = h.step();
    assert_eq!(h.forwarded.len(), 2, "the held request became a miss");
    h.reset_cache = false;

    h.respond(3, 0x5);
    h.step_n(2);
    let order: Vec<u64> = h.delivered.iter().map(|r| r.id).collect();
    assert_eq!(order, vec![1, 2, 3]);
}
