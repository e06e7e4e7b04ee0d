//! Ethernet header codec and destination-address classification.

use crate::error::WireError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ethernet header size in bytes (destination + source + EtherType)
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// 802.1Q VLAN tag allowance added on top of the MTU when validating
/// frame lengths
pub const VLAN_TAG_SIZE: usize = 4;

/// A 48-bit IEEE 802 MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// The link-layer broadcast address (ff:ff:ff:ff:ff:ff)
    pub const BROADCAST: Self = Self([0xFF; 6]);

    /// True iff this is the broadcast address
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// True iff the group bit is set (includes broadcast)
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Derive a related unicast address by offsetting the NIC-specific
    /// part. Used to synthesize the point-to-point peer address from the
    /// adapter's own address.
    #[must_use]
    pub fn related(&self, offset: u32) -> Self {
        let mut out = self.0;
        let nic = u32::from_be_bytes([0, out[3], out[4], out[5]]);
        let nic = (nic.wrapping_add(offset)) & 0x00FF_FFFF;
        let bytes = nic.to_be_bytes();
        out[3] = bytes[1];
        out[4] = bytes[2];
        out[5] = bytes[3];
        out[0] &= !0x01; // never derive a group address
        Self(out)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// EtherType field values the core cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EtherType {
    /// IPv4 (0x0800)
    Ipv4,
    /// ARP (0x0806)
    Arp,
    /// IPv6 (0x86DD)
    Ipv6,
    /// Anything else
    Other(u16),
}

impl EtherType {
    /// Decode from the raw 16-bit field
    #[must_use]
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => Self::Ipv4,
            0x0806 => Self::Arp,
            0x86DD => Self::Ipv6,
            other => Self::Other(other),
        }
    }

    /// Encode to the raw 16-bit field
    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ipv4 => 0x0800,
            Self::Arp => 0x0806,
            Self::Ipv6 => 0x86DD,
            Self::Other(other) => other,
        }
    }
}

/// Parsed Ethernet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination address
    pub dest: MacAddr,
    /// Source address
    pub src: MacAddr,
    /// EtherType
    pub ethertype: EtherType,
}

impl EthernetHeader {
    /// Parse the first [`ETHERNET_HEADER_SIZE`] bytes of a frame
    pub fn parse(data: &[u8]) -> Result<Self, WireError> {
        if data.len() < ETHERNET_HEADER_SIZE {
            return Err(WireError::TooShort {
                expected: ETHERNET_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut dest = [0u8; 6];
        dest.copy_from_slice(&data[0..6]);
        let mut src = [0u8; 6];
        src.copy_from_slice(&data[6..12]);
        let ethertype = EtherType::from_u16(u16::from_be_bytes([data[12], data[13]]));

        Ok(Self {
            dest: MacAddr(dest),
            src: MacAddr(src),
            ethertype,
        })
    }

    /// Emit the header as raw bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ETHERNET_HEADER_SIZE] {
        let mut out = [0u8; ETHERNET_HEADER_SIZE];
        out[0..6].copy_from_slice(&self.dest.0);
        out[6..12].copy_from_slice(&self.src.0);
        out[12..14].copy_from_slice(&self.ethertype.as_u16().to_be_bytes());
        out
    }
}

/// Destination-address classification of a frame.
///
/// Drives statistics attribution only; never affects queueing or delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameClass {
    /// Unicast to a specific station
    Directed,
    /// Link-layer broadcast
    Broadcast,
    /// Group address that is not the broadcast address
    Multicast,
}

/// Classify a frame by its destination address.
///
/// Broadcast iff the address equals ff:ff:ff:ff:ff:ff; multicast iff the
/// group bit is set and it is not broadcast; directed otherwise.
#[must_use]
pub fn classify(dest: MacAddr) -> FrameClass {
    if dest.is_broadcast() {
        FrameClass::Broadcast
    } else if dest.is_multicast() {
        FrameClass::Multicast
    } else {
        FrameClass::Directed
    }
}
