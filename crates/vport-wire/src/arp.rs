//! ARP (IPv4-over-Ethernet) parsing and reply synthesis.
//!
//! Only the fixed 42-byte request/reply layout is recognized; anything
//! else is not ARP as far as the bridging core is concerned.

use crate::error::WireError;
use crate::ethernet::{EtherType, EthernetHeader, MacAddr, ETHERNET_HEADER_SIZE};
use std::net::Ipv4Addr;

/// Total size of an Ethernet ARP frame: link header + 28-byte ARP body
pub const ARP_FRAME_SIZE: usize = ETHERNET_HEADER_SIZE + 28;

const OP_REQUEST: u16 = 1;
const OP_REPLY: u16 = 2;

/// Zero-copy view of an Ethernet ARP frame
#[derive(Debug)]
pub struct ArpFrame<'a> {
    raw: &'a [u8],
}

impl<'a> ArpFrame<'a> {
    /// Parse a full Ethernet frame as ARP.
    ///
    /// Requires the exact request/reply size and the IPv4-over-Ethernet
    /// hardware/protocol signature (htype 1, ptype 0x0800, hlen 6, plen 4).
    pub fn parse(data: &'a [u8]) -> Result<Self, WireError> {
        if data.len() < ARP_FRAME_SIZE {
            return Err(WireError::TooShort {
                expected: ARP_FRAME_SIZE,
                actual: data.len(),
            });
        }

        let htype = u16::from_be_bytes([data[14], data[15]]);
        let ptype = u16::from_be_bytes([data[16], data[17]]);
        let hlen = data[18];
        let plen = data[19];

        if htype != 1 || ptype != 0x0800 || hlen != 6 || plen != 4 {
            return Err(WireError::NotArp);
        }

        Ok(Self { raw: data })
    }

    /// Operation field (1 = request, 2 = reply)
    #[must_use]
    pub fn op(&self) -> u16 {
        u16::from_be_bytes([self.raw[20], self.raw[21]])
    }

    /// True iff this is an ARP request
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.op() == OP_REQUEST
    }

    /// Sender hardware address
    #[must_use]
    pub fn sender_mac(&self) -> MacAddr {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&self.raw[22..28]);
        MacAddr(mac)
    }

    /// Sender protocol (IPv4) address
    #[must_use]
    pub fn sender_ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.raw[28], self.raw[29], self.raw[30], self.raw[31])
    }

    /// Target protocol (IPv4) address being resolved
    #[must_use]
    pub fn target_ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.raw[38], self.raw[39], self.raw[40], self.raw[41])
    }
}

/// Synthesize the reply to an ARP request, resolving `target_ip` (the
/// address the request asked about) to `resolved_mac`.
///
/// The reply is addressed to the requester's hardware and protocol
/// addresses as they appeared in the request.
#[must_use]
pub fn build_reply(request: &ArpFrame<'_>, resolved_mac: MacAddr) -> Vec<u8> {
    let requester_mac = request.sender_mac();
    let requester_ip = request.sender_ip();
    let resolved_ip = request.target_ip();

    let eth = EthernetHeader {
        dest: requester_mac,
        src: resolved_mac,
        ethertype: EtherType::Arp,
    };

    let mut out = Vec::with_capacity(ARP_FRAME_SIZE);
    out.extend_from_slice(&eth.to_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // htype: Ethernet
    out.extend_from_slice(&0x0800u16.to_be_bytes()); // ptype: IPv4
    out.push(6); // hlen
    out.push(4); // plen
    out.extend_from_slice(&OP_REPLY.to_be_bytes());
    out.extend_from_slice(&resolved_mac.0);
    out.extend_from_slice(&resolved_ip.octets());
    out.extend_from_slice(&requester_mac.0);
    out.extend_from_slice(&requester_ip.octets());

    out
}
