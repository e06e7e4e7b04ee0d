//! Adapter configuration.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use vport_wire::MacAddr;

/// Operating mode of the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Wire framing: full link-layer frames cross the user face unchanged
    Bridge,
    /// Payload-only framing: the user face carries network-layer packets;
    /// a synthetic link-layer header bridges them onto the network face
    PointToPoint,
}

/// Adapter configuration.
///
/// Mutated only by lifecycle signals (`set_mode`, `set_mtu`,
/// `set_addresses`), never on the hot path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Operating mode
    pub mode: Mode,

    /// MTU in bytes; bounds admissible frame lengths together with the
    /// link header and VLAN allowance
    pub mtu: usize,

    /// The adapter's own link-layer address
    pub local_mac: MacAddr,

    /// Local protocol address (point-to-point mode: the address ARP
    /// requests originate from)
    pub local_ip: Ipv4Addr,

    /// Remote network the point-to-point peer answers for
    pub remote_network: Ipv4Addr,

    /// Netmask of the remote network
    pub remote_netmask: Ipv4Addr,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Bridge,
            mtu: crate::DEFAULT_MTU,
            local_mac: MacAddr([0x00, 0xFF, 0x10, 0x20, 0x30, 0x40]),
            local_ip: Ipv4Addr::new(10, 3, 0, 1),
            remote_network: Ipv4Addr::new(10, 3, 0, 0),
            remote_netmask: Ipv4Addr::new(255, 255, 255, 0),
        }
    }
}

impl AdapterConfig {
    /// The synthetic link-layer address of the point-to-point peer,
    /// derived from the adapter's own address
    #[must_use]
    pub fn peer_mac(&self) -> MacAddr {
        self.local_mac.related(1)
    }

    /// True iff `ip` falls inside the configured remote network
    #[must_use]
    pub fn in_remote_network(&self, ip: Ipv4Addr) -> bool {
        let ip = u32::from(ip);
        let network = u32::from(self.remote_network);
        let mask = u32::from(self.remote_netmask);
        ip & mask == network & mask
    }
}
