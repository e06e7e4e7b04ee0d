//! The adapter: both faces of the bridging core.
//!
//! ```text
//! submit (network face) ─▶ validate ─▶ classify ─▶ filter ─▶ rendezvous
//! read / cancel (user face) ──────────────────────▶ rendezvous
//! write (user face) ─▶ framing translator ─▶ FrameSink
//! ```
//!
//! `Adapter` is a cheap clone over shared inner state; producers and
//! consumers call it concurrently from any number of contexts.

use crate::buffer::FrameBuf;
use crate::config::{AdapterConfig, Mode};
use crate::error::{Error, Result};
use crate::filter::{self, Verdict};
use crate::framing::{self, EthTemplates};
use crate::rendezvous::{CancelOutcome, PushOutcome, ReadId, ReadOutcome, Rendezvous};
use crate::stats::{AdapterStats, StatsSnapshot};
use crate::{ETHERNET_HEADER_SIZE, MIN_FRAME_SIZE, VLAN_TAG_SIZE};
use std::borrow::Cow;
use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace, warn};
use vport_wire::{classify, EthernetHeader};

/// The network-submission collaborator: receives frames the core injects
/// toward the host networking stack, as if they had arrived from the wire.
///
/// Implementations must not call back into the adapter from `inject`.
pub trait FrameSink: Send + Sync {
    /// Indicate one complete link-layer frame to the host stack
    fn inject(&self, frame: &[u8]);
}

struct ConfigState {
    config: AdapterConfig,
    templates: EthTemplates,
}

struct AdapterInner {
    config: RwLock<ConfigState>,
    rendezvous: Rendezvous,
    stats: AdapterStats,
    sink: Arc<dyn FrameSink>,
}

/// A virtual network adapter's bridging core
#[derive(Clone)]
pub struct Adapter {
    inner: Arc<AdapterInner>,
}

impl Adapter {
    /// Create an adapter in the ready state (device bring-up)
    #[must_use]
    pub fn new(config: AdapterConfig, sink: Arc<dyn FrameSink>) -> Self {
        let templates = EthTemplates::derive(&config);
        Self {
            inner: Arc::new(AdapterInner {
                config: RwLock::new(ConfigState { config, templates }),
                rendezvous: Rendezvous::new(),
                stats: AdapterStats::default(),
                sink,
            }),
        }
    }

    fn config_state(&self) -> (AdapterConfig, EthTemplates) {
        let state = self.inner.config.read().expect("config lock poisoned");
        (state.config.clone(), state.templates)
    }

    /// Submit a batch of outbound frames from the host stack
    /// (network face).
    ///
    /// Length validation is all-or-nothing: one bad frame rejects the
    /// whole batch and nothing is queued. Past validation each frame is
    /// deep-copied, classified, filtered (point-to-point mode) and handed
    /// to the rendezvous independently; a single frame's allocation
    /// failure or a not-ready drop is counted but does not fail the batch.
    /// Never suspends.
    pub fn submit(&self, frames: &[&[u8]]) -> Result<()> {
        let (config, templates) = self.config_state();

        let min = MIN_FRAME_SIZE;
        let max = ETHERNET_HEADER_SIZE + VLAN_TAG_SIZE + config.mtu;
        for frame in frames {
            if frame.len() < min || frame.len() > max {
                self.inner.stats.length_rejected.fetch_add(1, Ordering::Relaxed);
                debug!(len = frame.len(), min, max, "rejecting batch: invalid frame length");
                return Err(Error::InvalidLength {
                    len: frame.len(),
                    min,
                    max,
                });
            }
        }

        // Readiness gates all admission: while down, nothing is
        // inspected or answered, every frame is dropped and counted.
        if !self.inner.rendezvous.is_ready() {
            self.inner
                .stats
                .dropped_not_ready
                .fetch_add(frames.len() as u64, Ordering::Relaxed);
            debug!(count = frames.len(), "dropping batch: adapter not ready");
            return Ok(());
        }

        let point_to_point = config.mode == Mode::PointToPoint;

        for bytes in frames {
            // Length is validated, so the header parse cannot fail.
            let Ok(eth) = EthernetHeader::parse(bytes) else {
                continue;
            };
            let class = classify(eth.dest);

            if point_to_point {
                match filter::inspect(bytes, &config, &templates, self.inner.sink.as_ref()) {
                    Verdict::Queue => {}
                    Verdict::Consumed => continue,
                    Verdict::Filtered => {
                        self.inner.stats.filtered.fetch_add(1, Ordering::Relaxed);
                        trace!(len = bytes.len(), "filtered outbound frame");
                        continue;
                    }
                }
            }

            let frame = match FrameBuf::copy_from(bytes, class, point_to_point) {
                Ok(frame) => frame,
                Err(Error::NoMemory) => {
                    self.inner.stats.no_memory.fetch_add(1, Ordering::Relaxed);
                    warn!(len = bytes.len(), "dropping frame: allocation failed");
                    continue;
                }
                Err(err) => return Err(err),
            };

            trace!(
                len = frame.wire_len(),
                dump = %hex::encode(&frame.wire()[..frame.wire_len().min(54)]),
                "outbound frame"
            );

            let wire_len = frame.wire_len();
            match self.inner.rendezvous.push_frame(frame) {
                PushOutcome::Delivered | PushOutcome::Queued => {
                    self.inner.stats.tx.record(class, wire_len);
                }
                PushOutcome::DroppedNotReady => {
                    self.inner.stats.dropped_not_ready.fetch_add(1, Ordering::Relaxed);
                    debug!("dropping frame: adapter not ready");
                }
            }
        }

        Ok(())
    }

    /// Read one frame (user face), offering `capacity` bytes.
    ///
    /// Returns the oldest queued frame immediately when one fits, or a
    /// pending ticket that resolves asynchronously exactly once. The
    /// oldest frame exceeding `capacity` is an error for this caller and
    /// stays queued.
    pub fn read(&self, capacity: usize) -> Result<ReadOutcome> {
        self.inner.rendezvous.take_or_register(capacity)
    }

    /// Inject a frame received "from the wire" (user face).
    ///
    /// Bridge mode expects a full link-layer frame; point-to-point mode
    /// expects a bare network-layer packet and synthesizes the link
    /// header. On success the translated frame is handed to the
    /// [`FrameSink`] and the write reports the bytes consumed.
    pub fn write(&self, bytes: &[u8]) -> Result<usize> {
        if !self.inner.rendezvous.is_ready() {
            return Err(Error::NotReady);
        }

        let (config, templates) = self.config_state();

        // Bridge mode lends the caller's bytes straight to the sink; only
        // point-to-point writes allocate, for the synthetic link header.
        let frame: Cow<'_, [u8]> = match config.mode {
            Mode::Bridge => {
                if bytes.len() < ETHERNET_HEADER_SIZE {
                    return Err(Error::BufferTooSmall {
                        required: ETHERNET_HEADER_SIZE,
                        capacity: bytes.len(),
                    });
                }
                Cow::Borrowed(bytes)
            }
            Mode::PointToPoint => Cow::Owned(framing::encapsulate(&templates, bytes)?),
        };

        // The frame holds at least a link header by construction.
        let class = EthernetHeader::parse(&frame)
            .map(|eth| classify(eth.dest))
            .map_err(Error::Wire)?;

        trace!(
            len = frame.len(),
            dump = %hex::encode(&frame[..frame.len().min(54)]),
            "injecting frame"
        );

        self.inner.sink.inject(&frame);
        self.inner.stats.rx.record(class, frame.len());

        Ok(bytes.len())
    }

    /// Cancel an outstanding read request. Idempotent; racing a
    /// concurrent delivery reports [`CancelOutcome::AlreadyResolved`]
    /// and the delivery stands.
    pub fn cancel(&self, id: ReadId) -> CancelOutcome {
        self.inner.rendezvous.cancel(id)
    }

    /// Readiness signal from the device lifecycle (link up/down,
    /// teardown). Going not-ready drains the queue and resolves every
    /// pending read with a not-ready outcome.
    pub fn set_ready(&self, ready: bool) {
        let report = self.inner.rendezvous.set_ready(ready);
        if report.dropped_frames > 0 {
            self.inner
                .stats
                .dropped_not_ready
                .fetch_add(report.dropped_frames, Ordering::Relaxed);
        }
        if !ready {
            debug!(
                dropped = report.dropped_frames,
                aborted = report.aborted_reads,
                "adapter not ready; drained rendezvous"
            );
        }
    }

    /// Current readiness
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.rendezvous.is_ready()
    }

    /// Switch operating mode (configuration path, not hot)
    pub fn set_mode(&self, mode: Mode) {
        let mut state = self.inner.config.write().expect("config lock poisoned");
        state.config.mode = mode;
        state.templates = EthTemplates::derive(&state.config);
        debug!(?mode, "mode changed");
    }

    /// Update the MTU bounding admissible frame lengths
    pub fn set_mtu(&self, mtu: usize) {
        let mut state = self.inner.config.write().expect("config lock poisoned");
        state.config.mtu = mtu;
        debug!(mtu, "mtu changed");
    }

    /// Update the point-to-point addressing and rebuild the synthetic
    /// header templates
    pub fn set_addresses(
        &self,
        local_ip: Ipv4Addr,
        remote_network: Ipv4Addr,
        remote_netmask: Ipv4Addr,
    ) {
        let mut state = self.inner.config.write().expect("config lock poisoned");
        state.config.local_ip = local_ip;
        state.config.remote_network = remote_network;
        state.config.remote_netmask = remote_netmask;
        state.templates = EthTemplates::derive(&state.config);
        debug!(%local_ip, %remote_network, %remote_netmask, "addresses changed");
    }

    /// Point-in-time statistics
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Zero all counters (adapter reinitialization only)
    pub fn reset_stats(&self) {
        self.inner.stats.reset();
    }

    /// Copy of the current configuration
    #[must_use]
    pub fn config(&self) -> AdapterConfig {
        self.inner.config.read().expect("config lock poisoned").config.clone()
    }

    /// Frames currently held in the outbound queue (diagnostics)
    #[must_use]
    pub fn queued_frames(&self) -> usize {
        self.inner.rendezvous.queued_frames()
    }

    /// Read requests currently outstanding (diagnostics)
    #[must_use]
    pub fn pending_reads(&self) -> usize {
        self.inner.rendezvous.pending_reads()
    }
}
