//! Adapter statistics counters.
//!
//! Counters are independent relaxed atomics: they carry no cross-invariant
//! with queue state, so they never take the rendezvous lock. Monotonic for
//! the adapter's lifetime; reset only at reinitialization, never by reads.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use vport_wire::FrameClass;

/// Frame/byte counter pairs for one direction, keyed by classification
#[derive(Debug, Default)]
pub struct DirectionCounters {
    /// Directed (unicast) frames
    pub directed_frames: AtomicU64,
    /// Directed bytes
    pub directed_bytes: AtomicU64,
    /// Broadcast frames
    pub broadcast_frames: AtomicU64,
    /// Broadcast bytes
    pub broadcast_bytes: AtomicU64,
    /// Multicast frames
    pub multicast_frames: AtomicU64,
    /// Multicast bytes
    pub multicast_bytes: AtomicU64,
}

impl DirectionCounters {
    /// Attribute one frame to exactly one counter pair
    pub fn record(&self, class: FrameClass, bytes: usize) {
        let (frames, byte_count) = match class {
            FrameClass::Directed => (&self.directed_frames, &self.directed_bytes),
            FrameClass::Broadcast => (&self.broadcast_frames, &self.broadcast_bytes),
            FrameClass::Multicast => (&self.multicast_frames, &self.multicast_bytes),
        };
        frames.fetch_add(1, Ordering::Relaxed);
        byte_count.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DirectionSnapshot {
        DirectionSnapshot {
            directed_frames: self.directed_frames.load(Ordering::Relaxed),
            directed_bytes: self.directed_bytes.load(Ordering::Relaxed),
            broadcast_frames: self.broadcast_frames.load(Ordering::Relaxed),
            broadcast_bytes: self.broadcast_bytes.load(Ordering::Relaxed),
            multicast_frames: self.multicast_frames.load(Ordering::Relaxed),
            multicast_bytes: self.multicast_bytes.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.directed_frames.store(0, Ordering::Relaxed);
        self.directed_bytes.store(0, Ordering::Relaxed);
        self.broadcast_frames.store(0, Ordering::Relaxed);
        self.broadcast_bytes.store(0, Ordering::Relaxed);
        self.multicast_frames.store(0, Ordering::Relaxed);
        self.multicast_bytes.store(0, Ordering::Relaxed);
    }
}

/// All counters of one adapter
#[derive(Debug, Default)]
pub struct AdapterStats {
    /// Network face → consumer direction (frames leaving the host stack)
    pub tx: DirectionCounters,
    /// Consumer → network face direction (frames injected by user writes)
    pub rx: DirectionCounters,
    /// Frames discarded because the adapter was not ready when they would
    /// have been queued
    pub dropped_not_ready: AtomicU64,
    /// Point-to-point frames dropped by protocol/address filtering
    pub filtered: AtomicU64,
    /// Frames dropped because their copy allocation failed
    pub no_memory: AtomicU64,
    /// Batches rejected by the length validator
    pub length_rejected: AtomicU64,
}

impl AdapterStats {
    /// Consistent-enough point-in-time view for diagnostics
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tx: self.tx.snapshot(),
            rx: self.rx.snapshot(),
            dropped_not_ready: self.dropped_not_ready.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            no_memory: self.no_memory.load(Ordering::Relaxed),
            length_rejected: self.length_rejected.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter. Called only at adapter reinitialization.
    pub fn reset(&self) {
        self.tx.reset();
        self.rx.reset();
        self.dropped_not_ready.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.no_memory.store(0, Ordering::Relaxed);
        self.length_rejected.store(0, Ordering::Relaxed);
    }
}

/// Plain-value copy of [`DirectionCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionSnapshot {
    /// Directed frames
    pub directed_frames: u64,
    /// Directed bytes
    pub directed_bytes: u64,
    /// Broadcast frames
    pub broadcast_frames: u64,
    /// Broadcast bytes
    pub broadcast_bytes: u64,
    /// Multicast frames
    pub multicast_frames: u64,
    /// Multicast bytes
    pub multicast_bytes: u64,
}

impl DirectionSnapshot {
    /// Total frames across all classes
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.directed_frames + self.broadcast_frames + self.multicast_frames
    }

    /// Total bytes across all classes
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.directed_bytes + self.broadcast_bytes + self.multicast_bytes
    }
}

/// Plain-value copy of [`AdapterStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Send-direction counters
    pub tx: DirectionSnapshot,
    /// Receive-direction counters
    pub rx: DirectionSnapshot,
    /// Not-ready discards
    pub dropped_not_ready: u64,
    /// Filter discards
    pub filtered: u64,
    /// Allocation-failure discards
    pub no_memory: u64,
    /// Length-rejected batches
    pub length_rejected: u64,
}
