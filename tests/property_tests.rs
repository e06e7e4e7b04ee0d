//! Property-based tests for the bridging core.
//!
//! Uses proptest to verify invariants across large input spaces.

use proptest::prelude::*;

// ============================================================================
// Link-Layer Codec Properties
// ============================================================================

mod wire_properties {
    use super::*;
    use vport_wire::{classify, EtherType, EthernetHeader, FrameClass, MacAddr};

    proptest! {
        /// Header roundtrip: serialize then parse is the identity.
        #[test]
        fn header_roundtrip(
            dest in any::<[u8; 6]>(),
            src in any::<[u8; 6]>(),
            ethertype in any::<u16>(),
        ) {
            let header = EthernetHeader {
                dest: MacAddr(dest),
                src: MacAddr(src),
                ethertype: EtherType::from_u16(ethertype),
            };
            let parsed = EthernetHeader::parse(&header.to_bytes()).unwrap();
            prop_assert_eq!(parsed, header);
        }

        /// Classification is total and consistent with the address bits.
        #[test]
        fn classification_matches_address_bits(dest in any::<[u8; 6]>()) {
            let mac = MacAddr(dest);
            let class = classify(mac);
            if dest == [0xFF; 6] {
                prop_assert_eq!(class, FrameClass::Broadcast);
            } else if dest[0] & 0x01 != 0 {
                prop_assert_eq!(class, FrameClass::Multicast);
            } else {
                prop_assert_eq!(class, FrameClass::Directed);
            }
        }

        /// A related address is never a group address, for any base
        /// address and offset.
        #[test]
        fn related_address_is_unicast(base in any::<[u8; 6]>(), offset in any::<u32>()) {
            let related = MacAddr(base).related(offset);
            prop_assert!(!related.is_multicast());
            prop_assert!(!related.is_broadcast());
        }
    }
}

// ============================================================================
// Adapter Properties
// ============================================================================

mod adapter_properties {
    use super::*;
    use vport_core::{Error, ReadOutcome, ETHERNET_HEADER_SIZE, MIN_FRAME_SIZE, VLAN_TAG_SIZE};
    use vport_integration_tests::test_helpers::{bridge_adapter, ipv4_frame, p2p_adapter};
    use vport_wire::MacAddr;

    /// Strategy for a batch of admissible bridge-mode frame lengths.
    fn valid_lengths() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(MIN_FRAME_SIZE..=ETHERNET_HEADER_SIZE + VLAN_TAG_SIZE + 1500, 1..16)
    }

    proptest! {
        /// Every admitted frame is delivered byte-identical, in
        /// submission order, and the byte counters balance.
        #[test]
        fn bridge_conserves_frames_in_order(lengths in valid_lengths(), src in any::<[u8; 6]>()) {
            let (adapter, _sink) = bridge_adapter();
            let local = adapter.config().local_mac;

            let frames: Vec<Vec<u8>> = lengths
                .iter()
                .enumerate()
                .map(|(i, &len)| ipv4_frame(local, MacAddr(src), len, i as u8))
                .collect();
            let refs: Vec<&[u8]> = frames.iter().map(Vec::as_slice).collect();

            adapter.submit(&refs).unwrap();
            prop_assert_eq!(adapter.queued_frames(), frames.len());

            for expected in &frames {
                match adapter.read(4096).unwrap() {
                    ReadOutcome::Frame(bytes) => prop_assert_eq!(&bytes, expected),
                    ReadOutcome::Pending(_) => prop_assert!(false, "queue should not be empty"),
                }
            }

            let total: u64 = frames.iter().map(|f| f.len() as u64).sum();
            prop_assert_eq!(adapter.stats().tx.total_bytes(), total);
        }

        /// A single out-of-bounds length anywhere in the batch rejects
        /// the whole batch atomically.
        #[test]
        fn invalid_length_rejects_atomically(
            valid in valid_lengths(),
            bad_len in prop_oneof![0usize..MIN_FRAME_SIZE, 1519usize..4096],
            position in any::<prop::sample::Index>(),
        ) {
            let (adapter, _sink) = bridge_adapter();
            let local = adapter.config().local_mac;
            let src = MacAddr([0x02, 0, 0, 0, 0, 1]);

            let mut frames: Vec<Vec<u8>> = valid
                .iter()
                .map(|&len| ipv4_frame(local, src, len, 0))
                .collect();
            let index = position.index(frames.len() + 1);
            frames.insert(index, vec![0u8; bad_len]);
            let refs: Vec<&[u8]> = frames.iter().map(Vec::as_slice).collect();

            let result = adapter.submit(&refs);
            prop_assert!(
                matches!(result, Err(Error::InvalidLength { .. })),
                "expected Err(Error::InvalidLength), got {:?}",
                result
            );
            prop_assert_eq!(adapter.queued_frames(), 0);
            prop_assert_eq!(adapter.stats().tx.total_frames(), 0);
        }

        /// Point-to-point writes prepend exactly one link header and
        /// preserve the payload bytes.
        #[test]
        fn p2p_write_preserves_payload(
            payload in prop::collection::vec(any::<u8>(), 20..1500),
            version in prop_oneof![Just(4u8), Just(6u8), 0u8..16],
        ) {
            let (adapter, sink) = p2p_adapter();

            let mut payload = payload;
            payload[0] = (version << 4) | (payload[0] & 0x0F);

            let written = adapter.write(&payload).unwrap();
            prop_assert_eq!(written, payload.len());

            let injected = sink.injected();
            prop_assert_eq!(injected.len(), 1);
            let frame = &injected[0];
            prop_assert_eq!(frame.len(), payload.len() + ETHERNET_HEADER_SIZE);
            prop_assert_eq!(&frame[ETHERNET_HEADER_SIZE..], payload.as_slice());

            let expected_ethertype: [u8; 2] = if version == 6 {
                0x86DDu16.to_be_bytes()
            } else {
                0x0800u16.to_be_bytes()
            };
            prop_assert_eq!(&frame[12..14], expected_ethertype);
        }
    }
}
