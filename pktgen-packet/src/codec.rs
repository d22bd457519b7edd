//! Serialization of header stacks
//!
//! [`PnetCodec`] lays every [`LogicalHeader`] of a [`PacketStack`] into one
//! contiguous buffer through the `pnet_packet` mutable views. Lengths are
//! taken from the stack, checksums come from `pnet_packet`. Fields the
//! logical model does not expose get fixed values:
//!
//! | Layer | Fixed fields |
//! |---|---|
//! | IPv4 | IHL 5, TOS 0, identification 1, flags 0, fragment offset 0 |
//! | IPv6 | traffic class 0, flow label 0 |
//! | TCP | seq 0, ack 0, data offset 5, flags SYN, window 8192 |
//! | ICMP | echo request, id 0, sequence 0 |
//! | NS/NA | code 0, one 8-octet link-layer address option |
//!
//! No minimum-size padding is appended; short frames are padded by the NIC.

use crate::layer::*;
use crate::stack::PacketStack;
use bytes::{Bytes, BytesMut};
use pktgen_core::{ethertypes, Error, MacAddr, Result};
use pnet_packet::arp::{self, ArpHardwareTypes, MutableArpPacket};
use pnet_packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};
use pnet_packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet_packet::icmp::{IcmpCode, IcmpTypes};
use pnet_packet::icmpv6::ndp::{
    MutableNeighborAdvertPacket, MutableNeighborSolicitPacket, NdpOption, NdpOptionType,
    NdpOptionTypes,
};
use pnet_packet::icmpv6::{self, Icmpv6Code, Icmpv6Packet, Icmpv6Types};
use pnet_packet::ip::IpNextHeaderProtocol;
use pnet_packet::ipv4::{self, MutableIpv4Packet};
use pnet_packet::ipv6::MutableIpv6Packet;
use pnet_packet::tcp::{self, MutableTcpPacket, TcpFlags};
use pnet_packet::udp::{self, MutableUdpPacket};
use pnet_packet::{util, Packet};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::trace;

/// IPv4 identification written into every datagram
pub const IPV4_IDENTIFICATION: u16 = 1;
/// TCP window written into every segment
pub const TCP_WINDOW: u16 = 8192;

/// Turns a header stack into wire octets.
pub trait Codec {
    fn encode(&self, stack: &PacketStack) -> Result<Bytes>;
}

/// [`Codec`] backed by `pnet_packet`
#[derive(Debug, Clone, Copy, Default)]
pub struct PnetCodec;

impl Codec for PnetCodec {
    fn encode(&self, stack: &PacketStack) -> Result<Bytes> {
        let mut frame = BytesMut::zeroed(stack.wire_len());
        let network = stack.network();
        let mut offset = 0;

        for (index, layer) in stack.iter().enumerate() {
            let end = offset + layer.wire_len();
            let slot = &mut frame[offset..end];

            match layer {
                LogicalHeader::Ethernet(eth) => write_ethernet(slot, eth, ethertype_for(network)?)?,
                LogicalHeader::Arp(arp) => write_arp(slot, arp)?,
                LogicalHeader::Ipv4(ip) => write_ipv4(slot, ip, stack.payload_len(index))?,
                LogicalHeader::Ipv6(ip) => write_ipv6(slot, ip, stack.payload_len(index))?,
                LogicalHeader::Tcp(tcp) => write_tcp(slot, tcp, Endpoints::of(network)?)?,
                LogicalHeader::Udp(udp) => write_udp(slot, udp, Endpoints::of(network)?)?,
                LogicalHeader::IcmpEcho(_) => write_icmp_echo(slot)?,
                LogicalHeader::NdpSolicitation(ns) => {
                    write_solicitation(slot, ns, Endpoints::of(network)?.ipv6()?)?
                }
                LogicalHeader::NdpAdvertisement(na) => {
                    write_advertisement(slot, na, Endpoints::of(network)?.ipv6()?)?
                }
            }

            offset = end;
        }

        trace!("Encoded {} layers into {} bytes", stack.len(), frame.len());
        Ok(frame.freeze())
    }
}

/// Source and destination used for transport pseudo-header checksums
#[derive(Debug, Clone, Copy)]
enum Endpoints {
    V4(Ipv4Addr, Ipv4Addr),
    V6(Ipv6Addr, Ipv6Addr),
}

impl Endpoints {
    fn of(network: &LogicalHeader) -> Result<Self> {
        match network {
            LogicalHeader::Ipv4(ip) => Ok(Endpoints::V4(ip.src, ip.dst)),
            LogicalHeader::Ipv6(ip) => Ok(Endpoints::V6(ip.src, ip.dst)),
            other => Err(Error::encoding(format!(
                "no IP endpoints for a transport header under {}",
                other.name()
            ))),
        }
    }

    fn ipv6(self) -> Result<(Ipv6Addr, Ipv6Addr)> {
        match self {
            Endpoints::V6(src, dst) => Ok((src, dst)),
            Endpoints::V4(..) => Err(Error::encoding(
                "ICMPv6 message under an IPv4 header (address family mismatch)",
            )),
        }
    }
}

fn too_short(layer: &str) -> Error {
    Error::encoding(format!("buffer too short for {} header", layer))
}

fn to_pnet_mac(mac: MacAddr) -> pnet_base::MacAddr {
    let b = mac.0;
    pnet_base::MacAddr::new(b[0], b[1], b[2], b[3], b[4], b[5])
}

fn ethertype_for(network: &LogicalHeader) -> Result<EtherType> {
    let value = match network {
        LogicalHeader::Arp(_) => ethertypes::ARP,
        LogicalHeader::Ipv4(_) => ethertypes::IPV4,
        LogicalHeader::Ipv6(_) => ethertypes::IPV6,
        other => {
            return Err(Error::encoding(format!(
                "{} cannot sit directly on Ethernet",
                other.name()
            )))
        }
    };
    Ok(EtherType::new(value))
}

fn write_ethernet(buf: &mut [u8], eth: &EthernetHeader, ethertype: EtherType) -> Result<()> {
    let mut pkt = MutableEthernetPacket::new(buf).ok_or_else(|| too_short("Ethernet"))?;
    pkt.set_destination(to_pnet_mac(eth.dst));
    pkt.set_source(to_pnet_mac(eth.src));
    pkt.set_ethertype(ethertype);
    Ok(())
}

fn write_arp(buf: &mut [u8], header: &ArpHeader) -> Result<()> {
    let mut pkt = MutableArpPacket::new(buf).ok_or_else(|| too_short("ARP"))?;
    pkt.set_hardware_type(ArpHardwareTypes::Ethernet);
    pkt.set_protocol_type(EtherTypes::Ipv4);
    pkt.set_hw_addr_len(6);
    pkt.set_proto_addr_len(4);
    pkt.set_operation(arp::ArpOperation::new(header.operation.opcode()));
    pkt.set_sender_hw_addr(to_pnet_mac(header.sender_mac));
    pkt.set_sender_proto_addr(header.sender_ip);
    pkt.set_target_hw_addr(to_pnet_mac(header.target_mac));
    pkt.set_target_proto_addr(header.target_ip);
    Ok(())
}

fn write_ipv4(buf: &mut [u8], header: &Ipv4Header, payload_len: usize) -> Result<()> {
    let total_len = u16::try_from(IPV4_LEN + payload_len)
        .map_err(|_| Error::encoding("IPv4 datagram exceeds 65535 bytes"))?;

    let mut pkt = MutableIpv4Packet::new(buf).ok_or_else(|| too_short("IPv4"))?;
    pkt.set_version(4);
    pkt.set_header_length((IPV4_LEN / 4) as u8);
    pkt.set_dscp(0);
    pkt.set_ecn(0);
    pkt.set_total_length(total_len);
    pkt.set_identification(IPV4_IDENTIFICATION);
    pkt.set_flags(0);
    pkt.set_fragment_offset(0);
    pkt.set_ttl(header.ttl);
    pkt.set_next_level_protocol(IpNextHeaderProtocol::new(header.protocol.to_u8()));
    pkt.set_source(header.src);
    pkt.set_destination(header.dst);

    let checksum = ipv4::checksum(&pkt.to_immutable());
    pkt.set_checksum(checksum);
    Ok(())
}

fn write_ipv6(buf: &mut [u8], header: &Ipv6Header, payload_len: usize) -> Result<()> {
    let payload_len = u16::try_from(payload_len)
        .map_err(|_| Error::encoding("IPv6 payload exceeds 65535 bytes"))?;

    let mut pkt = MutableIpv6Packet::new(buf).ok_or_else(|| too_short("IPv6"))?;
    pkt.set_version(6);
    pkt.set_traffic_class(0);
    pkt.set_flow_label(0);
    pkt.set_payload_length(payload_len);
    pkt.set_next_header(IpNextHeaderProtocol::new(header.next_header.to_u8()));
    pkt.set_hop_limit(header.hop_limit);
    pkt.set_source(header.src);
    pkt.set_destination(header.dst);
    Ok(())
}

fn write_tcp(buf: &mut [u8], header: &TcpHeader, endpoints: Endpoints) -> Result<()> {
    let mut pkt = MutableTcpPacket::new(buf).ok_or_else(|| too_short("TCP"))?;
    pkt.set_source(header.sport);
    pkt.set_destination(header.dport);
    pkt.set_sequence(0);
    pkt.set_acknowledgement(0);
    pkt.set_data_offset((TCP_LEN / 4) as u8);
    pkt.set_reserved(0);
    pkt.set_flags(TcpFlags::SYN);
    pkt.set_window(TCP_WINDOW);
    pkt.set_urgent_ptr(0);

    let checksum = match endpoints {
        Endpoints::V4(src, dst) => tcp::ipv4_checksum(&pkt.to_immutable(), &src, &dst),
        Endpoints::V6(src, dst) => tcp::ipv6_checksum(&pkt.to_immutable(), &src, &dst),
    };
    pkt.set_checksum(checksum);
    Ok(())
}

fn write_udp(buf: &mut [u8], header: &UdpHeader, endpoints: Endpoints) -> Result<()> {
    let len = buf.len() as u16;
    let mut pkt = MutableUdpPacket::new(buf).ok_or_else(|| too_short("UDP"))?;
    pkt.set_source(header.sport);
    pkt.set_destination(header.dport);
    pkt.set_length(len);

    let checksum = match endpoints {
        Endpoints::V4(src, dst) => udp::ipv4_checksum(&pkt.to_immutable(), &src, &dst),
        Endpoints::V6(src, dst) => udp::ipv6_checksum(&pkt.to_immutable(), &src, &dst),
    };
    pkt.set_checksum(checksum);
    Ok(())
}

fn write_icmp_echo(buf: &mut [u8]) -> Result<()> {
    let mut pkt = MutableEchoRequestPacket::new(buf).ok_or_else(|| too_short("ICMP"))?;
    pkt.set_icmp_type(IcmpTypes::EchoRequest);
    pkt.set_icmp_code(IcmpCode::new(0));
    pkt.set_identifier(0);
    pkt.set_sequence_number(0);

    // checksum is the second 16-bit word
    let checksum = util::checksum(pkt.packet(), 1);
    pkt.set_checksum(checksum);
    Ok(())
}

fn lla_option(option_type: NdpOptionType, mac: MacAddr) -> NdpOption {
    NdpOption {
        option_type,
        length: (NDP_LLA_OPTION_LEN / 8) as u8,
        data: mac.octets().to_vec(),
    }
}

fn icmpv6_checksum(message: &[u8], (src, dst): (Ipv6Addr, Ipv6Addr)) -> Result<u16> {
    let pkt = Icmpv6Packet::new(message).ok_or_else(|| too_short("ICMPv6"))?;
    Ok(icmpv6::checksum(&pkt, &src, &dst))
}

fn write_solicitation(
    buf: &mut [u8],
    header: &NdpSolicitation,
    endpoints: (Ipv6Addr, Ipv6Addr),
) -> Result<()> {
    let mut pkt =
        MutableNeighborSolicitPacket::new(buf).ok_or_else(|| too_short("Neighbor Solicitation"))?;
    pkt.set_icmpv6_type(Icmpv6Types::NeighborSolicit);
    pkt.set_icmpv6_code(Icmpv6Code::new(0));
    pkt.set_reserved(0);
    pkt.set_target_addr(header.target);
    pkt.set_options(&[lla_option(NdpOptionTypes::SourceLLAddr, header.source_lla)]);

    let checksum = icmpv6_checksum(pkt.packet(), endpoints)?;
    pkt.set_checksum(checksum);
    Ok(())
}

fn write_advertisement(
    buf: &mut [u8],
    header: &NdpAdvertisement,
    endpoints: (Ipv6Addr, Ipv6Addr),
) -> Result<()> {
    let mut pkt = MutableNeighborAdvertPacket::new(buf)
        .ok_or_else(|| too_short("Neighbor Advertisement"))?;
    pkt.set_icmpv6_type(Icmpv6Types::NeighborAdvert);
    pkt.set_icmpv6_code(Icmpv6Code::new(0));
    pkt.set_flags(header.flags.bits());
    pkt.set_reserved(0);
    pkt.set_target_addr(header.target);
    pkt.set_options(&[lla_option(NdpOptionTypes::TargetLLAddr, header.target_lla)]);

    let checksum = icmpv6_checksum(pkt.packet(), endpoints)?;
    pkt.set_checksum(checksum);
    Ok(())
}
