//! Minimal network-layer inspection: version sniffing and header sizes.

/// IPv4 header size without options, in bytes
pub const IPV4_HEADER_SIZE: usize = 20;

/// Fixed IPv6 header size, in bytes
pub const IPV6_HEADER_SIZE: usize = 40;

/// IP protocol / next-header number for ICMPv6
pub const IP_PROTO_ICMPV6: u8 = 58;

/// Read the IP version nibble of a raw network-layer payload.
///
/// Returns `None` for an empty buffer; the caller decides whether an
/// unexpected version is an error.
#[must_use]
pub fn ip_version(payload: &[u8]) -> Option<u8> {
    payload.first().map(|b| b >> 4)
}
