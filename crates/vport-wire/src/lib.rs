//! # vport-wire
//!
//! Link-layer and network-layer header codecs used by the vport bridging
//! core. This crate has no opinion about queueing or adapter state; it only
//! knows how to read and write the headers that cross the virtual wire:
//!
//! - Ethernet framing and destination-address classification
//! - ARP request recognition and reply synthesis
//! - IP version sniffing of raw network-layer payloads
//! - IPv6 neighbor-discovery interception (solicitation / advertisement)
//!
//! All multi-byte fields are big-endian (network byte order).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arp;
pub mod error;
pub mod ethernet;
pub mod ip;
pub mod ndp;

pub use arp::{ArpFrame, ARP_FRAME_SIZE};
pub use error::WireError;
pub use ethernet::{
    classify, EtherType, EthernetHeader, FrameClass, MacAddr, ETHERNET_HEADER_SIZE, VLAN_TAG_SIZE,
};
pub use ip::{ip_version, IPV4_HEADER_SIZE, IPV6_HEADER_SIZE};
