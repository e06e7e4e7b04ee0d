//! IPv6 neighbor-discovery interception.
//!
//! A neighbor solicitation addressed to the reserved link-local target
//! `fe80::8` is a local signal ("handled by the virtual interface", never
//! forwarded). The core answers it with a synthesized neighbor
//! advertisement resolving that target to the point-to-point peer address.

use crate::error::WireError;
use crate::ethernet::{EtherType, EthernetHeader, MacAddr, ETHERNET_HEADER_SIZE};
use crate::ip::{IPV6_HEADER_SIZE, IP_PROTO_ICMPV6};

/// The reserved link-local signaling target (fe80::8)
pub const SIGNALING_TARGET: [u8; 16] = [
    0xFE, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08,
];

const ICMPV6_NEIGHBOR_SOLICITATION: u8 = 135;
const ICMPV6_NEIGHBOR_ADVERTISEMENT: u8 = 136;

/// Offset of the IPv6 header within the frame
const IP6: usize = ETHERNET_HEADER_SIZE;
/// Offset of the ICMPv6 message within the frame
const ICMP6: usize = ETHERNET_HEADER_SIZE + IPV6_HEADER_SIZE;

/// Minimal frame length of a neighbor solicitation
/// (link header + IPv6 header + 24-byte ICMPv6 NS body)
const MIN_SOLICITATION_LEN: usize = ICMP6 + 24;

/// Advertisement body: 24-byte NA + 8-byte target link-layer option
const ADVERTISEMENT_BODY_LEN: usize = 32;

/// True iff `frame` is an ICMPv6 neighbor solicitation whose target is the
/// reserved signaling address. Assumes the caller already checked the
/// EtherType.
#[must_use]
pub fn is_signaling_solicitation(frame: &[u8]) -> bool {
    if frame.len() < MIN_SOLICITATION_LEN {
        return false;
    }

    frame[IP6 + 6] == IP_PROTO_ICMPV6
        && frame[ICMP6] == ICMPV6_NEIGHBOR_SOLICITATION
        && frame[ICMP6 + 1] == 0
        && frame[ICMP6 + 8..ICMP6 + 24] == SIGNALING_TARGET
}

/// Synthesize the neighbor advertisement answering a signaling
/// solicitation, resolving `fe80::8` to `resolved_mac`.
pub fn build_advertisement(
    solicitation: &[u8],
    resolved_mac: MacAddr,
) -> Result<Vec<u8>, WireError> {
    if solicitation.len() < MIN_SOLICITATION_LEN {
        return Err(WireError::TooShort {
            expected: MIN_SOLICITATION_LEN,
            actual: solicitation.len(),
        });
    }

    let requester = EthernetHeader::parse(solicitation)?;
    let mut requester_ip = [0u8; 16];
    requester_ip.copy_from_slice(&solicitation[IP6 + 8..IP6 + 24]);

    let eth = EthernetHeader {
        dest: requester.src,
        src: resolved_mac,
        ethertype: EtherType::Ipv6,
    };

    let mut out = Vec::with_capacity(ICMP6 + ADVERTISEMENT_BODY_LEN);
    out.extend_from_slice(&eth.to_bytes());

    // IPv6 header
    out.push(0x60); // version 6
    out.extend_from_slice(&[0, 0, 0]); // traffic class / flow label
    out.extend_from_slice(&(ADVERTISEMENT_BODY_LEN as u16).to_be_bytes());
    out.push(IP_PROTO_ICMPV6);
    out.push(255); // hop limit required for ND
    out.extend_from_slice(&SIGNALING_TARGET);
    out.extend_from_slice(&requester_ip);

    // ICMPv6 neighbor advertisement
    out.push(ICMPV6_NEIGHBOR_ADVERTISEMENT);
    out.push(0); // code
    out.extend_from_slice(&[0, 0]); // checksum placeholder
    out.extend_from_slice(&[0x60, 0, 0, 0]); // flags: solicited | override
    out.extend_from_slice(&SIGNALING_TARGET);

    // Target link-layer address option
    out.push(2); // option type
    out.push(1); // length in units of 8 bytes
    out.extend_from_slice(&resolved_mac.0);

    let sum = icmpv6_checksum(
        &SIGNALING_TARGET,
        &requester_ip,
        &out[ICMP6..ICMP6 + ADVERTISEMENT_BODY_LEN],
    );
    out[ICMP6 + 2..ICMP6 + 4].copy_from_slice(&sum.to_be_bytes());

    Ok(out)
}

/// ICMPv6 checksum over the IPv6 pseudo-header and message body.
/// The checksum field inside `body` must be zero.
fn icmpv6_checksum(src: &[u8; 16], dst: &[u8; 16], body: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut add_words = |bytes: &[u8]| {
        let mut chunks = bytes.chunks_exact(2);
        for chunk in &mut chunks {
            sum += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
        }
        if let Some(&last) = chunks.remainder().first() {
            sum += u32::from(u16::from_be_bytes([last, 0]));
        }
    };

    add_words(src);
    add_words(dst);
    add_words(&(body.len() as u32).to_be_bytes());
    add_words(&[0, 0, 0, IP_PROTO_ICMPV6]);
    add_words(body);

    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !(sum as u16)
}
