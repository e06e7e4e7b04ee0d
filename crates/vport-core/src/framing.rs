//! Mode-dependent framing translation.
//!
//! In point-to-point mode the user face carries bare network-layer
//! packets, but the network face speaks full link-layer frames. A pair of
//! synthetic Ethernet header templates bridges the two: one direction for
//! user writes entering the host stack, the other for frames leaving the
//! stack toward the consumer. Bridge mode needs no translation.

use crate::config::AdapterConfig;
use crate::error::Error;
use vport_wire::{
    ip_version, EtherType, EthernetHeader, ETHERNET_HEADER_SIZE, IPV4_HEADER_SIZE,
};

/// Synthetic Ethernet headers derived from the adapter addresses.
///
/// Rebuilt whenever the mode or addresses change; read-only on the hot
/// path.
#[derive(Debug, Clone, Copy)]
pub struct EthTemplates {
    /// Header prepended to user-written IPv4 payloads (frame appears to
    /// the host stack as received from the peer)
    pub user_to_tap_v4: EthernetHeader,
    /// Header prepended to user-written IPv6 payloads
    pub user_to_tap_v6: EthernetHeader,
    /// Header carried by IPv4 frames leaving the stack for the consumer;
    /// the directed-match reference in point-to-point mode
    pub tap_to_user_v4: EthernetHeader,
    /// IPv6 counterpart of the above
    pub tap_to_user_v6: EthernetHeader,
}

impl EthTemplates {
    /// Derive the template pair from the adapter configuration
    #[must_use]
    pub fn derive(config: &AdapterConfig) -> Self {
        let local = config.local_mac;
        let peer = config.peer_mac();

        Self {
            user_to_tap_v4: EthernetHeader {
                dest: local,
                src: peer,
                ethertype: EtherType::Ipv4,
            },
            user_to_tap_v6: EthernetHeader {
                dest: local,
                src: peer,
                ethertype: EtherType::Ipv6,
            },
            tap_to_user_v4: EthernetHeader {
                dest: peer,
                src: local,
                ethertype: EtherType::Ipv4,
            },
            tap_to_user_v6: EthernetHeader {
                dest: peer,
                src: local,
                ethertype: EtherType::Ipv6,
            },
        }
    }
}

/// Wrap a user-written network-layer payload in the synthetic link header
/// selected by its IP version field (point-to-point user→tap direction).
///
/// Payloads shorter than one IPv4 header are rejected; a version nibble
/// other than 6 selects the IPv4 template, as the write contract only
/// distinguishes the two families.
pub fn encapsulate(templates: &EthTemplates, payload: &[u8]) -> Result<Vec<u8>, Error> {
    if payload.len() < IPV4_HEADER_SIZE {
        return Err(Error::BufferTooSmall {
            required: IPV4_HEADER_SIZE,
            capacity: payload.len(),
        });
    }

    let template = if ip_version(payload) == Some(6) {
        &templates.user_to_tap_v6
    } else {
        &templates.user_to_tap_v4
    };

    let mut frame = Vec::new();
    frame
        .try_reserve_exact(ETHERNET_HEADER_SIZE + payload.len())
        .map_err(|_| Error::NoMemory)?;
    frame.extend_from_slice(&template.to_bytes());
    frame.extend_from_slice(payload);

    Ok(frame)
}
