//! Example: Building an unsolicited Neighbor Advertisement
//!
//! This example encodes an NA with the Override flag set, as a host would
//! send after its link-layer address changed, and decodes it back.

use pktgen_core::MacAddr;
use pktgen_packet::layer::*;
use pktgen_packet::{decode, Codec, PacketStack, PnetCodec};

fn main() {
    let src_mac = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    // all-nodes multicast
    let dst_mac = MacAddr::new([0x33, 0x33, 0x00, 0x00, 0x00, 0x01]);
    let target = "fe80::211:22ff:fe33:4455".parse().unwrap();

    let stack = PacketStack::new(vec![
        LogicalHeader::Ethernet(EthernetHeader {
            src: src_mac,
            dst: dst_mac,
        }),
        LogicalHeader::Ipv6(Ipv6Header {
            src: target,
            dst: "ff02::1".parse().unwrap(),
            hop_limit: NDP_HOP_LIMIT,
            next_header: IpProtocol::Icmpv6,
        }),
        LogicalHeader::NdpAdvertisement(NdpAdvertisement {
            target,
            flags: NdpFlags {
                router: false,
                solicited: false,
                override_: true,
            },
            target_lla: src_mac,
        }),
    ])
    .expect("Failed to build Neighbor Advertisement stack");

    let frame = PnetCodec
        .encode(&stack)
        .expect("Failed to encode Neighbor Advertisement");

    print!("{}", stack);
    println!("Total size: {} bytes", frame.len());
    println!("ICMPv6 type: {}", frame[54]);
    println!("Flags byte: 0x{:02X}", frame[58]);

    let decoded = decode(&frame).expect("Failed to decode frame");
    println!("Round trip matches: {}", decoded == stack);
}
