//! Frame decoding
//!
//! Reads an Ethernet frame back into a [`PacketStack`] using the
//! `pnet_packet` immutable views. Only the shapes the builder produces are
//! recognized; anything else is a [`Error::PacketParsing`].

use crate::layer::*;
use crate::stack::PacketStack;
use pktgen_core::{ethertypes, Error, MacAddr, Result};
use pnet_packet::arp::ArpPacket;
use pnet_packet::ethernet::EthernetPacket;
use pnet_packet::icmp::{IcmpPacket, IcmpTypes};
use pnet_packet::icmpv6::ndp::{
    NdpOption, NdpOptionType, NdpOptionTypes, NeighborAdvertPacket, NeighborSolicitPacket,
};
use pnet_packet::icmpv6::{Icmpv6Packet, Icmpv6Types};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::ipv6::Ipv6Packet;
use pnet_packet::tcp::TcpPacket;
use pnet_packet::udp::UdpPacket;
use pnet_packet::Packet;

fn parse_error<S: Into<String>>(msg: S) -> Error {
    Error::PacketParsing(msg.into())
}

fn truncated(layer: &str) -> Error {
    parse_error(format!("truncated {} header", layer))
}

fn from_pnet_mac(mac: pnet_base::MacAddr) -> MacAddr {
    MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5])
}

/// Decode a frame produced by [`crate::PnetCodec`].
pub fn decode(frame: &[u8]) -> Result<PacketStack> {
    let eth = EthernetPacket::new(frame).ok_or_else(|| truncated("Ethernet"))?;
    let mut layers = vec![LogicalHeader::Ethernet(EthernetHeader {
        src: from_pnet_mac(eth.get_source()),
        dst: from_pnet_mac(eth.get_destination()),
    })];

    match eth.get_ethertype().0 {
        ethertypes::ARP => layers.push(decode_arp(eth.payload())?),
        ethertypes::IPV4 => decode_ipv4(eth.payload(), &mut layers)?,
        ethertypes::IPV6 => decode_ipv6(eth.payload(), &mut layers)?,
        other => return Err(parse_error(format!("unsupported ethertype 0x{:04x}", other))),
    }

    PacketStack::new(layers).map_err(|e| parse_error(e.to_string()))
}

fn decode_arp(payload: &[u8]) -> Result<LogicalHeader> {
    let arp = ArpPacket::new(payload).ok_or_else(|| truncated("ARP"))?;
    let opcode = arp.get_operation().0;
    let operation = ArpOperation::from_opcode(opcode)
        .ok_or_else(|| parse_error(format!("unsupported ARP opcode {}", opcode)))?;

    Ok(LogicalHeader::Arp(ArpHeader {
        operation,
        sender_mac: from_pnet_mac(arp.get_sender_hw_addr()),
        sender_ip: arp.get_sender_proto_addr(),
        target_mac: from_pnet_mac(arp.get_target_hw_addr()),
        target_ip: arp.get_target_proto_addr(),
    }))
}

fn ip_protocol(value: u8) -> Result<IpProtocol> {
    IpProtocol::from_u8(value)
        .ok_or_else(|| parse_error(format!("unsupported IP protocol {}", value)))
}

fn decode_ipv4(payload: &[u8], layers: &mut Vec<LogicalHeader>) -> Result<()> {
    let ip = Ipv4Packet::new(payload).ok_or_else(|| truncated("IPv4"))?;
    if ip.get_version() != 4 {
        return Err(parse_error(format!("IPv4 version field is {}", ip.get_version())));
    }
    let protocol = ip_protocol(ip.get_next_level_protocol().0)?;

    layers.push(LogicalHeader::Ipv4(Ipv4Header {
        src: ip.get_source(),
        dst: ip.get_destination(),
        ttl: ip.get_ttl(),
        protocol,
    }));
    layers.push(decode_upper(protocol, ip.payload())?);
    Ok(())
}

fn decode_ipv6(payload: &[u8], layers: &mut Vec<LogicalHeader>) -> Result<()> {
    let ip = Ipv6Packet::new(payload).ok_or_else(|| truncated("IPv6"))?;
    if ip.get_version() != 6 {
        return Err(parse_error(format!("IPv6 version field is {}", ip.get_version())));
    }
    let next_header = ip_protocol(ip.get_next_header().0)?;

    layers.push(LogicalHeader::Ipv6(Ipv6Header {
        src: ip.get_source(),
        dst: ip.get_destination(),
        hop_limit: ip.get_hop_limit(),
        next_header,
    }));
    layers.push(decode_upper(next_header, ip.payload())?);
    Ok(())
}

fn decode_upper(protocol: IpProtocol, payload: &[u8]) -> Result<LogicalHeader> {
    match protocol {
        IpProtocol::Tcp => {
            let tcp = TcpPacket::new(payload).ok_or_else(|| truncated("TCP"))?;
            Ok(LogicalHeader::Tcp(TcpHeader {
                sport: tcp.get_source(),
                dport: tcp.get_destination(),
            }))
        }
        IpProtocol::Udp => {
            let udp = UdpPacket::new(payload).ok_or_else(|| truncated("UDP"))?;
            Ok(LogicalHeader::Udp(UdpHeader {
                sport: udp.get_source(),
                dport: udp.get_destination(),
            }))
        }
        IpProtocol::Icmp => {
            let icmp = IcmpPacket::new(payload).ok_or_else(|| truncated("ICMP"))?;
            if icmp.get_icmp_type() != IcmpTypes::EchoRequest {
                return Err(parse_error(format!(
                    "unsupported ICMP type {}",
                    icmp.get_icmp_type().0
                )));
            }
            Ok(LogicalHeader::IcmpEcho(IcmpEchoHeader))
        }
        IpProtocol::Icmpv6 => decode_ndp(payload),
    }
}

fn decode_ndp(payload: &[u8]) -> Result<LogicalHeader> {
    let icmp = Icmpv6Packet::new(payload).ok_or_else(|| truncated("ICMPv6"))?;
    let kind = icmp.get_icmpv6_type();

    if kind == Icmpv6Types::NeighborSolicit {
        let ns = NeighborSolicitPacket::new(payload)
            .ok_or_else(|| truncated("Neighbor Solicitation"))?;
        let source_lla = single_lla(&ns.get_options(), NdpOptionTypes::SourceLLAddr)?;
        Ok(LogicalHeader::NdpSolicitation(NdpSolicitation {
            target: ns.get_target_addr(),
            source_lla,
        }))
    } else if kind == Icmpv6Types::NeighborAdvert {
        let na = NeighborAdvertPacket::new(payload)
            .ok_or_else(|| truncated("Neighbor Advertisement"))?;
        let target_lla = single_lla(&na.get_options(), NdpOptionTypes::TargetLLAddr)?;
        Ok(LogicalHeader::NdpAdvertisement(NdpAdvertisement {
            target: na.get_target_addr(),
            flags: NdpFlags::from_bits(na.get_flags()),
            target_lla,
        }))
    } else {
        Err(parse_error(format!("unsupported ICMPv6 type {}", kind.0)))
    }
}

/// The one link-layer address option an NS/NA must carry
fn single_lla(options: &[NdpOption], expected: NdpOptionType) -> Result<MacAddr> {
    let option = match options {
        [option] => option,
        _ => {
            return Err(parse_error(format!(
                "expected exactly one NDP option, found {}",
                options.len()
            )))
        }
    };

    if option.option_type != expected {
        return Err(parse_error(format!(
            "expected NDP option type {}, found {}",
            expected.0, option.option_type.0
        )));
    }

    let bytes: [u8; 6] = option
        .data
        .get(..6)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| parse_error("link-layer address option shorter than a MAC"))?;
    Ok(MacAddr(bytes))
}
