/// Property Tests for the wire codecs: zero-coding and the datagram
/// envelope must hand back exactly what was written.
use proptest::prelude::*;

use gridlink_server::shared::builtin::ChatFromViewer;
use gridlink_shared::{
    zerocode, MessageContainer, Packet, PacketFlags, Uuid, Variable2, MAX_APPENDED_ACKS,
    SEQUENCE_MODULUS,
};
use gridlink_test::protocol;

/// Bytes with long zero runs, which is what zero-coding is for
fn zero_heavy_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![3 => Just(0u8), 1 => any::<u8>()],
        0..2000,
    )
}

proptest! {
    #[test]
    fn zerocode_round_trips(input in zero_heavy_bytes()) {
        let coded = zerocode::encode(&input);
        prop_assert_eq!(zerocode::decode(&coded).unwrap(), input);
    }

    #[test]
    fn zerocode_leaves_zero_free_input_alone(input in prop::collection::vec(1u8..=255, 0..500)) {
        prop_assert_eq!(zerocode::encode(&input), input);
    }

    #[test]
    fn zero_runs_never_grow(run in 1usize..2000) {
        let input = vec![0u8; run];
        let coded = zerocode::encode(&input);
        prop_assert_eq!(coded.len(), run.div_ceil(255) * 2);
        prop_assert_eq!(zerocode::decode(&coded).unwrap(), input);
    }

    #[test]
    fn envelope_round_trips(
        sequence in 0..SEQUENCE_MODULUS,
        acks in prop::collection::vec(0..SEQUENCE_MODULUS, 0..50),
        text in "[a-z \\x00]{0,400}",
        resent in any::<bool>(),
        agent in any::<u128>(),
    ) {
        let message = ChatFromViewer {
            agent_id: Uuid::from_u128(agent),
            session_id: Uuid::nil(),
            message: Variable2::from_str_truncated(&text),
            chat_type: 1,
            channel: 0,
        };
        let kinds = protocol().message_kinds;
        let mut flags = PacketFlags::NONE;
        flags.set(PacketFlags::RESENT, resent);
        let bytes = kinds
            .build_packet(&MessageContainer::new(message.clone()), flags, sequence, &acks)
            .unwrap();

        let packet = Packet::parse(&bytes).unwrap();
        prop_assert_eq!(packet.sequence, sequence);
        prop_assert_eq!(&packet.acks, &acks);
        prop_assert!(packet.flags.is_reliable());
        prop_assert_eq!(packet.flags.is_resent(), resent);
        prop_assert_eq!(packet.flags.has_acks(), !acks.is_empty());
        let decoded = kinds.read_body(&packet.body).unwrap();
        prop_assert_eq!(decoded.into_message::<ChatFromViewer>(), Some(message));
    }

    #[test]
    fn appended_acks_respect_limit_and_mtu(
        body_len in 1usize..1190,
        acks in prop::collection::vec(0..SEQUENCE_MODULUS, 0..400),
        limit in 0usize..400,
    ) {
        let mut bytes = Packet::new(PacketFlags::NONE, 1, vec![0xAB; body_len])
            .encode()
            .unwrap();
        let encoded_len = bytes.len();
        let appended = Packet::append_acks(&mut bytes, &acks, limit);

        prop_assert!(appended <= limit.min(acks.len()).min(MAX_APPENDED_ACKS));
        prop_assert!(bytes.len() <= gridlink_shared::MTU_SIZE_BYTES);
        let packet = Packet::parse(&bytes).unwrap();
        prop_assert_eq!(&packet.acks[..], &acks[..appended]);
        prop_assert_eq!(packet.body.len(), encoded_len - 6);
    }
}
