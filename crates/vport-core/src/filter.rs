//! Control-frame interception for point-to-point mode.
//!
//! Outbound frames from the host stack are inspected before queueing:
//! address resolution and neighbor-discovery signaling are answered
//! internally, directed IP traffic is queued for the consumer, everything
//! else is dropped as filtered (counted, never an error).

use crate::adapter::FrameSink;
use crate::config::AdapterConfig;
use crate::framing::EthTemplates;
use tracing::trace;
use vport_wire::{
    arp, ndp, ArpFrame, EtherType, EthernetHeader, ARP_FRAME_SIZE, ETHERNET_HEADER_SIZE,
    IPV4_HEADER_SIZE, IPV6_HEADER_SIZE,
};

/// Disposition of an outbound frame in point-to-point mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Deliverable traffic; hand it to the rendezvous
    Queue,
    /// Answered internally; the frame is spent
    Consumed,
    /// Not deliverable over the point-to-point link; drop and count
    Filtered,
}

/// Inspect one admitted outbound frame.
///
/// The frame has already passed the length validator, so it holds at
/// least an Ethernet header and an IPv4 header.
pub fn inspect(
    frame: &[u8],
    config: &AdapterConfig,
    templates: &EthTemplates,
    sink: &dyn FrameSink,
) -> Verdict {
    let Ok(eth) = EthernetHeader::parse(frame) else {
        return Verdict::Filtered;
    };

    match eth.ethertype {
        EtherType::Arp => {
            if frame.len() != ARP_FRAME_SIZE {
                return Verdict::Filtered;
            }
            match ArpFrame::parse(frame) {
                Ok(request)
                    if request.is_request()
                        && request.sender_ip() == config.local_ip
                        && config.in_remote_network(request.target_ip()) =>
                {
                    let reply = arp::build_reply(&request, config.peer_mac());
                    trace!(
                        target_ip = %request.target_ip(),
                        peer_mac = %config.peer_mac(),
                        "answering ARP request internally"
                    );
                    sink.inject(&reply);
                    Verdict::Consumed
                }
                _ => Verdict::Filtered,
            }
        }

        EtherType::Ipv4 => {
            if frame.len() < ETHERNET_HEADER_SIZE + IPV4_HEADER_SIZE {
                return Verdict::Filtered;
            }
            // Only directed traffic crosses the point-to-point link.
            if frame[..ETHERNET_HEADER_SIZE] == templates.tap_to_user_v4.to_bytes() {
                Verdict::Queue
            } else {
                Verdict::Filtered
            }
        }

        EtherType::Ipv6 => {
            if frame.len() < ETHERNET_HEADER_SIZE + IPV6_HEADER_SIZE {
                return Verdict::Filtered;
            }
            if ndp::is_signaling_solicitation(frame) {
                match ndp::build_advertisement(frame, config.peer_mac()) {
                    Ok(advertisement) => {
                        trace!("answering signaling neighbor solicitation internally");
                        sink.inject(&advertisement);
                        Verdict::Consumed
                    }
                    Err(_) => Verdict::Filtered,
                }
            } else if frame[..ETHERNET_HEADER_SIZE] == templates.tap_to_user_v6.to_bytes() {
                Verdict::Queue
            } else {
                Verdict::Filtered
            }
        }

        EtherType::Other(_) => Verdict::Filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    struct CollectingSink {
        frames: Mutex<Vec<Vec<u8>>>,
    }

    impl CollectingSink {
        fn new() -> Self {
            Self {
                frames: Mutex::new(Vec::new()),
            }
        }

        fn injected(&self) -> Vec<Vec<u8>> {
            self.frames.lock().unwrap().clone()
        }
    }

    impl FrameSink for CollectingSink {
        fn inject(&self, frame: &[u8]) {
            self.frames.lock().unwrap().push(frame.to_vec());
        }
    }

    fn config() -> AdapterConfig {
        AdapterConfig {
            mode: crate::Mode::PointToPoint,
            ..AdapterConfig::default()
        }
    }

    fn arp_request(config: &AdapterConfig, target: Ipv4Addr) -> Vec<u8> {
        let eth = EthernetHeader {
            dest: vport_wire::MacAddr::BROADCAST,
            src: config.local_mac,
            ethertype: EtherType::Arp,
        };

        let mut out = Vec::with_capacity(ARP_FRAME_SIZE);
        out.extend_from_slice(&eth.to_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&0x0800u16.to_be_bytes());
        out.push(6);
        out.push(4);
        out.extend_from_slice(&1u16.to_be_bytes()); // op: request
        out.extend_from_slice(&config.local_mac.0);
        out.extend_from_slice(&config.local_ip.octets());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&target.octets());
        out
    }

    fn directed_ipv4(templates: &EthTemplates) -> Vec<u8> {
        let mut out = templates.tap_to_user_v4.to_bytes().to_vec();
        out.extend_from_slice(&[0x45u8; IPV4_HEADER_SIZE + 26]);
        out
    }

    #[test]
    fn test_arp_for_remote_network_is_answered() {
        let config = config();
        let templates = EthTemplates::derive(&config);
        let sink = CollectingSink::new();

        let request = arp_request(&config, Ipv4Addr::new(10, 3, 0, 2));
        let verdict = inspect(&request, &config, &templates, &sink);

        assert_eq!(verdict, Verdict::Consumed);
        let injected = sink.injected();
        assert_eq!(injected.len(), 1);

        let reply = ArpFrame::parse(&injected[0]).unwrap();
        assert_eq!(reply.op(), 2);
        assert_eq!(reply.sender_mac(), config.peer_mac());
        assert_eq!(reply.sender_ip(), Ipv4Addr::new(10, 3, 0, 2));
    }

    #[test]
    fn test_arp_outside_remote_network_is_filtered() {
        let config = config();
        let templates = EthTemplates::derive(&config);
        let sink = CollectingSink::new();

        let request = arp_request(&config, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(
            inspect(&request, &config, &templates, &sink),
            Verdict::Filtered
        );
        assert!(sink.injected().is_empty());
    }

    #[test]
    fn test_directed_ipv4_is_queued() {
        let config = config();
        let templates = EthTemplates::derive(&config);
        let sink = CollectingSink::new();

        let frame = directed_ipv4(&templates);
        assert_eq!(inspect(&frame, &config, &templates, &sink), Verdict::Queue);
    }

    #[test]
    fn test_broadcast_ipv4_is_filtered() {
        let config = config();
        let templates = EthTemplates::derive(&config);
        let sink = CollectingSink::new();

        let mut frame = directed_ipv4(&templates);
        frame[0..6].copy_from_slice(&[0xFF; 6]);
        assert_eq!(
            inspect(&frame, &config, &templates, &sink),
            Verdict::Filtered
        );
    }

    #[test]
    fn test_unknown_protocol_is_filtered() {
        let config = config();
        let templates = EthTemplates::derive(&config);
        let sink = CollectingSink::new();

        let mut frame = directed_ipv4(&templates);
        frame[12..14].copy_from_slice(&0x88CCu16.to_be_bytes());
        assert_eq!(
            inspect(&frame, &config, &templates, &sink),
            Verdict::Filtered
        );
    }

    #[test]
    fn test_signaling_solicitation_is_answered() {
        let config = config();
        let templates = EthTemplates::derive(&config);
        let sink = CollectingSink::new();

        let mut frame = templates.tap_to_user_v6.to_bytes().to_vec();
        frame.push(0x60);
        frame.extend_from_slice(&[0, 0, 0]);
        frame.extend_from_slice(&24u16.to_be_bytes());
        frame.push(58); // ICMPv6
        frame.push(255);
        frame.extend_from_slice(&[0xFE, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        frame.extend_from_slice(&[0xFF; 16]);
        frame.push(135); // neighbor solicitation
        frame.push(0);
        frame.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        frame.extend_from_slice(&ndp::SIGNALING_TARGET);

        assert_eq!(
            inspect(&frame, &config, &templates, &sink),
            Verdict::Consumed
        );
        let injected = sink.injected();
        assert_eq!(injected.len(), 1);
        assert_eq!(injected[0][54], 136); // neighbor advertisement
    }
}
