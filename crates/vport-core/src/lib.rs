//! # vport-core
//!
//! The packet bridging core of a virtual network interface. The core
//! presents two faces: a **network face**, which accepts batches of
//! outbound frames from a host networking stack, and a **user face**,
//! which lets an application read those frames and inject new ones as if
//! they had arrived from the wire.
//!
//! ## Architecture
//!
//! ```text
//! network face ──▶ length validator ──▶ classifier ──▶ framing / filter
//!                                                            │
//!                                                            ▼
//!                  pending-read registry ◀── rendezvous ── outbound queue
//!                           │
//!                           ▼
//!                     user-face read
//!
//! user-face write ──▶ framing translator ──▶ FrameSink (host stack)
//! ```
//!
//! The outbound queue and the pending-read registry form one logically
//! atomic structure under a single lock; every queued frame or registered
//! read request yields exactly one outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod error;
pub mod filter;
pub mod framing;
pub mod rendezvous;
pub mod stats;

pub use adapter::{Adapter, FrameSink};
pub use buffer::FrameBuf;
pub use config::{AdapterConfig, Mode};
pub use error::{Error, Result};
pub use rendezvous::{CancelOutcome, ReadId, ReadOutcome, ReadTicket};
pub use stats::{AdapterStats, DirectionSnapshot, StatsSnapshot};

pub use vport_wire::{FrameClass, MacAddr, ETHERNET_HEADER_SIZE, VLAN_TAG_SIZE};

/// Smallest admissible frame: one Ethernet header plus one IPv4 header
pub const MIN_FRAME_SIZE: usize = ETHERNET_HEADER_SIZE + vport_wire::IPV4_HEADER_SIZE;

/// Default adapter MTU in bytes
pub const DEFAULT_MTU: usize = 1500;
