//! Cached request/response channel.
//!
//! Routes upstream requests through an address/data cache: a hit is
//! answered locally through a response FIFO, a miss is forwarded to the
//! downstream request port while `(id, addr)` is recorded in a
//! pending-request CAM. A downstream response looks up the CAM by id
//! (retiring the entry), fills the cache with the saved address, and joins
//! the same response FIFO. An external cache-write port has absolute
//! priority over response fills, and a level-sensitive `reset_cache` input
//! suppresses hits and fills while flushing the cache; the CAM and FIFO
//! keep operating throughout.
//!
//! All decisions are single-cycle: the channel's state machine is implicit
//! in the CAM and FIFO occupancies, stepped once per clock by [`CachedChannel::step`].

use tracing::{debug, trace};

use crate::cache::{build_cache, Cache, CacheInputs};
use crate::cam::{Cam, CamLookup, CamWrite};
use crate::common::geometry::mask_to;
use crate::common::ConfigError;
use crate::config::{CacheConfig, CamConfig, ChannelConfig};
use crate::fifo::Fifo;
use crate::interface::{CacheWrite, FillCommand, Occupancy, ReadCommand, Request, Response};
use crate::policy::{AvailableInvalidated, ReplacementPolicy};
use crate::regfile::RegisterFile;
use crate::stats::{CacheStats, ChannelStats};

/// All channel inputs for one cycle.
///
/// `Option` fields model the valid side of a ready/valid handshake; the
/// `*_ready` booleans are the far consumers' ready signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelInputs {
    /// Upstream request (consumer side): valid + payload.
    pub upstream_req: Option<Request>,
    /// Upstream response consumer's ready.
    pub upstream_resp_ready: bool,
    /// Downstream request consumer's ready.
    pub downstream_req_ready: bool,
    /// Downstream response (consumer side): valid + payload.
    pub downstream_resp: Option<Response>,
    /// External cache write (consumer side): valid + payload.
    pub cache_write: Option<CacheWrite>,
    /// Level-sensitive cache reset; no handshake.
    pub reset_cache: bool,
}

impl ChannelInputs {
    /// A cycle with every input idle.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// All channel outputs for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelOutputs {
    /// Ready toward the upstream requester.
    pub upstream_req_ready: bool,
    /// Upstream response: valid + payload.
    pub upstream_resp: Option<Response>,
    /// Downstream request: valid + payload.
    pub downstream_req: Option<Request>,
    /// Ready toward the downstream responder.
    pub downstream_resp_ready: bool,
    /// Ready toward the external cache writer (constant high).
    pub cache_write_ready: bool,
}

/// Request router with address-based response caching and in-flight
/// request tracking.
///
/// # Examples
///
/// ```
/// use cachesim_core::channel::ChannelInputs;
/// use cachesim_core::interface::Request;
/// use cachesim_core::{CachedChannel, ChannelConfig};
///
/// let mut channel = CachedChannel::new(&ChannelConfig::default())?;
/// let out = channel.step(&ChannelInputs {
///     upstream_req: Some(Request { id: 1, addr: 0xA0 }),
///     upstream_resp_ready: true,
///     downstream_req_ready: true,
///     ..ChannelInputs::idle()
/// });
/// assert!(out.downstream_req.is_some(), "cold cache: the miss forwards");
/// assert!(out.upstream_req_ready, "and the request is accepted");
/// # Ok::<(), cachesim_core::ConfigError>(())
/// ```
pub struct CachedChannel {
    config: ChannelConfig,
    id_mask: u64,
    addr_mask: u64,
    data_mask: u64,
    cache: Box<dyn Cache>,
    cam: Cam,
    pending_addr: RegisterFile<u64>,
    slots: AvailableInvalidated,
    resp_fifo: Fifo<Response>,
    stats: ChannelStats,
}

impl CachedChannel {
    /// Builds a channel, constructing its cache from `config.cache`.
    ///
    /// # Errors
    ///
    /// Propagates every [`ChannelConfig::validate`] failure plus the cache
    /// and policy construction checks.
    pub fn new(config: &ChannelConfig) -> Result<Self, ConfigError> {
        Self::with_cache_factory(config, |cache_config| build_cache(cache_config))
    }

    /// Builds a channel whose cache comes from `factory`, letting callers
    /// choose any [`Cache`] implementation.
    ///
    /// # Errors
    ///
    /// Propagates [`ChannelConfig::validate`] failures and whatever the
    /// factory returns.
    pub fn with_cache_factory<F>(config: &ChannelConfig, factory: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&CacheConfig) -> Result<Box<dyn Cache>, ConfigError>,
    {
        config.validate()?;
        let cache = factory(&config.cache)?;
        let cam = Cam::new(&CamConfig {
            entries: config.cam_ways,
            tag_w: config.id_w,
            lookup_ports: 1,
            write_ports: 1,
            invalidate_on_lookup: true,
        })?;
        Ok(Self {
            config: config.clone(),
            id_mask: mask_to(u64::MAX, config.id_w),
            addr_mask: mask_to(u64::MAX, config.addr_w),
            data_mask: mask_to(u64::MAX, config.data_w),
            cache,
            cam,
            pending_addr: RegisterFile::new(config.cam_ways, 0),
            slots: AvailableInvalidated::new(1, config.cam_ways)?,
            resp_fifo: Fifo::new(config.resp_depth, config.resp_bypass)?,
            stats: ChannelStats::default(),
        })
    }

    /// Channel event counters.
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// The internal cache's event counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Occupancy of the pending-request CAM (pre-edge view).
    pub fn pending(&self) -> Occupancy {
        self.cam.occupancy()
    }

    /// Advances one clock cycle.
    pub fn step(&mut self, inputs: &ChannelInputs) -> ChannelOutputs {
        let req = inputs.upstream_req.map(|r| Request {
            id: r.id & self.id_mask,
            addr: r.addr & self.addr_mask,
        });
        let dresp = inputs.downstream_resp.map(|r| Response {
            id: r.id & self.id_mask,
            data: r.data & self.data_mask,
            non_cacheable: r.non_cacheable,
        });
        let cw = inputs.cache_write.map(|w| CacheWrite {
            addr: w.addr & self.addr_mask,
            data: w.data & self.data_mask,
            invalidate: w.invalidate,
        });
        let reset_cache = inputs.reset_cache;
        let cw_active = cw.is_some();

        // Pending-request lookup by response id (combinational).
        let cam_hit = self.cam.lookup(dresp.is_some(), dresp.map_or(0, |r| r.id));
        let resp_from_down = dresp.is_some() && cam_hit.hit;
        let resp_from_down_g = resp_from_down && !cw_active;

        let cam_full = self.cam.occupancy().full;
        // Hook for a CAM that frees a slot in the lookup cycle; every
        // current CAM registers the clear, so the plain check applies.
        let cam_space = if self.config.cam_fill_rwi_bypass {
            !cam_full || resp_from_down_g
        } else {
            !cam_full
        };

        // Cache fill select: the external write port wins, then response
        // fills. A non-cacheable or reset-shadowed response fills with
        // valid low, which clears any stale entry under that address.
        let fill = if let Some(w) = cw {
            FillCommand {
                en: true,
                valid: !w.invalidate,
                addr: w.addr,
                data: w.data,
            }
        } else if let Some(resp) = dresp.filter(|_| resp_from_down) {
            FillCommand {
                en: true,
                valid: !resp.non_cacheable && !reset_cache,
                addr: self.pending_addr.read_registered(cam_hit.idx),
                data: resp.data,
            }
        } else {
            FillCommand::idle()
        };

        // One cache cycle: probe the request address, apply the fill.
        let mut cache_in = CacheInputs::idle(self.cache.read_ports(), self.cache.fill_ports());
        cache_in.reads[0] = ReadCommand {
            en: req.is_some(),
            addr: req.map_or(0, |r| r.addr),
            invalidate: false,
        };
        cache_in.fills[0] = fill;
        cache_in.flush = reset_cache;
        let cache_out = self.cache.step(&cache_in);
        let read0 = cache_out.reads[0];
        let cache_hit = req.is_some() && read0.valid && !reset_cache;

        let fifo_ready = self.resp_fifo.in_ready();

        // Upstream handshake: hits need FIFO room and an uncontended
        // cycle; misses need downstream room and a free CAM slot.
        let hit_ready = cache_hit && fifo_ready && !resp_from_down_g && !cw_active;
        let miss_ready =
            !cache_hit && inputs.downstream_req_ready && cam_space && !cw_active;
        let upstream_req_ready = hit_ready || miss_ready;

        let downstream_req = req.filter(|_| !cache_hit && cam_space && !cw_active);
        let downstream_fire = downstream_req.is_some() && inputs.downstream_req_ready;
        let downstream_resp_ready = fifo_ready && !cw_active;
        let dresp_fire = dresp.is_some() && downstream_resp_ready;

        // CAM cycle: the lookup retires its entry only when the response
        // actually transfers; a forwarded miss stores (id, addr) in the
        // lowest free slot.
        let lookup = CamLookup {
            en: dresp.is_some(),
            tag: dresp.map_or(0, |r| r.id),
            invalidate: downstream_resp_ready,
        };
        let mut write = CamWrite::idle();
        if downstream_fire
            && let Some(r) = downstream_req
        {
            debug_assert!(
                !self.cam.lookup(true, r.id).hit,
                "forwarding a request whose id {:#x} is already in flight",
                r.id
            );
            let slot = self.slots.alloc(0);
            trace!(id = r.id, addr = r.addr, slot, "tracking forwarded miss");
            write = CamWrite::store(slot, r.id);
            self.pending_addr.stage(slot, r.addr);
        }
        if resp_from_down && downstream_resp_ready {
            self.slots.invalidate(0, cam_hit.idx);
        }
        let _ = self.cam.step(&[lookup], &[write]);
        self.pending_addr.tick();

        // Response FIFO: downstream responses preempt same-cycle hits.
        let push = if resp_from_down_g && fifo_ready {
            dresp
        } else if hit_ready {
            req.map(|r| Response {
                id: r.id,
                data: read0.data & self.data_mask,
                non_cacheable: false,
            })
        } else {
            None
        };
        let fifo_out = self.resp_fifo.step(push, inputs.upstream_resp_ready);
        let upstream_resp = fifo_out.out;

        self.update_stats(
            hit_ready,
            downstream_fire,
            dresp_fire,
            dresp,
            cw_active,
            upstream_resp.is_some() && inputs.upstream_resp_ready,
        );

        ChannelOutputs {
            upstream_req_ready,
            upstream_resp,
            downstream_req,
            downstream_resp_ready,
            cache_write_ready: true,
        }
    }

    /// Bumps the event counters for one stepped cycle.
    fn update_stats(
        &mut self,
        hit_fire: bool,
        downstream_fire: bool,
        dresp_fire: bool,
        dresp: Option<Response>,
        cw_active: bool,
        delivered: bool,
    ) {
        if hit_fire {
            debug!("request answered from cache");
            self.stats.requests_accepted += 1;
            self.stats.hits_returned += 1;
        }
        if downstream_fire {
            debug!("miss forwarded downstream");
            self.stats.requests_accepted += 1;
            self.stats.misses_forwarded += 1;
        }
        if dresp_fire {
            self.stats.responses_received += 1;
            if dresp.is_some_and(|r| r.non_cacheable) {
                self.stats.non_cacheable += 1;
            }
        }
        if cw_active {
            self.stats.external_writes += 1;
        }
        if delivered {
            self.stats.responses_delivered += 1;
        }
    }
}

impl std::fmt::Debug for CachedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedChannel")
            .field("config", &self.config)
            .field("pending", &self.cam.occupancy())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
