//! Logical headers
//!
//! A [`LogicalHeader`] is one fully-resolved layer of a frame, described by
//! the fields a user controls. Everything else on the wire (lengths,
//! checksums, version nibbles, fixed defaults) is the codec's job.

use pktgen_core::MacAddr;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Ethernet header length (dst + src + ethertype)
pub const ETHERNET_LEN: usize = 14;
/// ARP payload length for Ethernet/IPv4
pub const ARP_LEN: usize = 28;
/// IPv4 header length without options
pub const IPV4_LEN: usize = 20;
/// IPv6 fixed header length
pub const IPV6_LEN: usize = 40;
/// TCP header length without options
pub const TCP_LEN: usize = 20;
/// UDP header length
pub const UDP_LEN: usize = 8;
/// ICMP echo header length
pub const ICMP_ECHO_LEN: usize = 8;
/// NS/NA body without options (type, code, checksum, flags/reserved, target)
pub const NDP_BASE_LEN: usize = 24;
/// One link-layer address option for Ethernet (type, length, 6-byte MAC)
pub const NDP_LLA_OPTION_LEN: usize = 8;

/// Hop limit every NDP message must be sent with (RFC 4861 section 7.1)
pub const NDP_HOP_LIMIT: u8 = 255;

/// Upper-layer protocol numbers used by the supported families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpProtocol {
    /// ICMP (1)
    Icmp,
    /// TCP (6)
    Tcp,
    /// UDP (17)
    Udp,
    /// ICMPv6 (58)
    Icmpv6,
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        match self {
            IpProtocol::Icmp => 1,
            IpProtocol::Tcp => 6,
            IpProtocol::Udp => 17,
            IpProtocol::Icmpv6 => 58,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(IpProtocol::Icmp),
            6 => Some(IpProtocol::Tcp),
            17 => Some(IpProtocol::Udp),
            58 => Some(IpProtocol::Icmpv6),
            _ => None,
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpProtocol::Icmp => write!(f, "icmp"),
            IpProtocol::Tcp => write!(f, "tcp"),
            IpProtocol::Udp => write!(f, "udp"),
            IpProtocol::Icmpv6 => write!(f, "ipv6-icmp"),
        }
    }
}

/// ARP operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    /// who-has (1)
    Request = 1,
    /// is-at (2)
    Reply = 2,
}

impl ArpOperation {
    pub fn opcode(self) -> u16 {
        self as u16
    }

    pub fn from_opcode(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            _ => None,
        }
    }
}

impl fmt::Display for ArpOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArpOperation::Request => write!(f, "who-has"),
            ArpOperation::Reply => write!(f, "is-at"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub src: MacAddr,
    pub dst: MacAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpHeader {
    pub operation: ArpOperation,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub ttl: u8,
    pub protocol: IpProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Header {
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
    pub hop_limit: u8,
    pub next_header: IpProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub sport: u16,
    pub dport: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub sport: u16,
    pub dport: u16,
}

/// ICMP echo request. Carries no user fields and no ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IcmpEchoHeader;

/// Neighbor Solicitation with its Source Link-Layer Address option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdpSolicitation {
    pub target: Ipv6Addr,
    pub source_lla: MacAddr,
}

/// Neighbor Advertisement flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdpFlags {
    pub router: bool,
    pub solicited: bool,
    pub override_: bool,
}

impl NdpFlags {
    pub const ROUTER: u8 = 0x80;
    pub const SOLICITED: u8 = 0x40;
    pub const OVERRIDE: u8 = 0x20;

    /// Flag octet as it appears after the ICMPv6 checksum
    pub fn bits(self) -> u8 {
        let mut bits = 0u8;
        if self.router {
            bits |= Self::ROUTER;
        }
        if self.solicited {
            bits |= Self::SOLICITED;
        }
        if self.override_ {
            bits |= Self::OVERRIDE;
        }
        bits
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            router: bits & Self::ROUTER != 0,
            solicited: bits & Self::SOLICITED != 0,
            override_: bits & Self::OVERRIDE != 0,
        }
    }
}

/// Router=0, Solicited=1, Override=1
impl Default for NdpFlags {
    fn default() -> Self {
        Self {
            router: false,
            solicited: true,
            override_: true,
        }
    }
}

impl fmt::Display for NdpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R={} S={} O={}",
            self.router as u8, self.solicited as u8, self.override_ as u8
        )
    }
}

/// Neighbor Advertisement with its Target Link-Layer Address option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdpAdvertisement {
    pub target: Ipv6Addr,
    pub flags: NdpFlags,
    pub target_lla: MacAddr,
}

/// One layer of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalHeader {
    Ethernet(EthernetHeader),
    Arp(ArpHeader),
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    IcmpEcho(IcmpEchoHeader),
    NdpSolicitation(NdpSolicitation),
    NdpAdvertisement(NdpAdvertisement),
}

impl LogicalHeader {
    /// Layer name used in summaries
    pub fn name(&self) -> &'static str {
        match self {
            LogicalHeader::Ethernet(_) => "Ethernet",
            LogicalHeader::Arp(_) => "ARP",
            LogicalHeader::Ipv4(_) => "IPv4",
            LogicalHeader::Ipv6(_) => "IPv6",
            LogicalHeader::Tcp(_) => "TCP",
            LogicalHeader::Udp(_) => "UDP",
            LogicalHeader::IcmpEcho(_) => "ICMP Echo Request",
            LogicalHeader::NdpSolicitation(_) => "ICMPv6 Neighbor Solicitation",
            LogicalHeader::NdpAdvertisement(_) => "ICMPv6 Neighbor Advertisement",
        }
    }

    /// Bytes this layer occupies on the wire
    pub fn wire_len(&self) -> usize {
        match self {
            LogicalHeader::Ethernet(_) => ETHERNET_LEN,
            LogicalHeader::Arp(_) => ARP_LEN,
            LogicalHeader::Ipv4(_) => IPV4_LEN,
            LogicalHeader::Ipv6(_) => IPV6_LEN,
            LogicalHeader::Tcp(_) => TCP_LEN,
            LogicalHeader::Udp(_) => UDP_LEN,
            LogicalHeader::IcmpEcho(_) => ICMP_ECHO_LEN,
            LogicalHeader::NdpSolicitation(_) | LogicalHeader::NdpAdvertisement(_) => {
                NDP_BASE_LEN + NDP_LLA_OPTION_LEN
            }
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, LogicalHeader::Ethernet(_))
    }

    /// ARP counts as the network layer: it sits directly on Ethernet.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LogicalHeader::Arp(_) | LogicalHeader::Ipv4(_) | LogicalHeader::Ipv6(_)
        )
    }

    /// Protocol number an IP header must declare to carry this layer
    pub fn carried_as(&self) -> Option<IpProtocol> {
        match self {
            LogicalHeader::Tcp(_) => Some(IpProtocol::Tcp),
            LogicalHeader::Udp(_) => Some(IpProtocol::Udp),
            LogicalHeader::IcmpEcho(_) => Some(IpProtocol::Icmp),
            LogicalHeader::NdpSolicitation(_) | LogicalHeader::NdpAdvertisement(_) => {
                Some(IpProtocol::Icmpv6)
            }
            _ => None,
        }
    }

    /// Field/value pairs for the pre-flight summary
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            LogicalHeader::Ethernet(h) => vec![("dst", h.dst.to_string()), ("src", h.src.to_string())],
            LogicalHeader::Arp(h) => vec![
                ("op", format!("{} ({})", h.operation, h.operation.opcode())),
                ("hwsrc", h.sender_mac.to_string()),
                ("psrc", h.sender_ip.to_string()),
                ("hwdst", h.target_mac.to_string()),
                ("pdst", h.target_ip.to_string()),
            ],
            LogicalHeader::Ipv4(h) => vec![
                ("ttl", h.ttl.to_string()),
                ("proto", format!("{} ({})", h.protocol, h.protocol.to_u8())),
                ("src", h.src.to_string()),
                ("dst", h.dst.to_string()),
            ],
            LogicalHeader::Ipv6(h) => vec![
                ("nh", format!("{} ({})", h.next_header, h.next_header.to_u8())),
                ("hlim", h.hop_limit.to_string()),
                ("src", h.src.to_string()),
                ("dst", h.dst.to_string()),
            ],
            LogicalHeader::Tcp(h) => {
                vec![("sport", h.sport.to_string()), ("dport", h.dport.to_string())]
            }
            LogicalHeader::Udp(h) => {
                vec![("sport", h.sport.to_string()), ("dport", h.dport.to_string())]
            }
            LogicalHeader::IcmpEcho(_) => vec![("type", "echo-request (8)".to_string())],
            LogicalHeader::NdpSolicitation(h) => vec![
                ("tgt", h.target.to_string()),
                ("src_lladdr", h.source_lla.to_string()),
            ],
            LogicalHeader::NdpAdvertisement(h) => vec![
                ("flags", h.flags.to_string()),
                ("tgt", h.target.to_string()),
                ("dst_lladdr", h.target_lla.to_string()),
            ],
        }
    }
}

impl fmt::Display for LogicalHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "###[ {} ]###", self.name())?;
        for (name, value) in self.fields() {
            writeln!(f, "  {:<10} = {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_protocol_numbers() {
        for proto in [IpProtocol::Icmp, IpProtocol::Tcp, IpProtocol::Udp, IpProtocol::Icmpv6] {
            assert_eq!(IpProtocol::from_u8(proto.to_u8()), Some(proto));
        }
        assert_eq!(IpProtocol::Icmpv6.to_u8(), 58);
        assert_eq!(IpProtocol::from_u8(47), None);
    }

    #[test]
    fn test_arp_opcodes() {
        assert_eq!(ArpOperation::Request.opcode(), 1);
        assert_eq!(ArpOperation::Reply.opcode(), 2);
        assert_eq!(ArpOperation::from_opcode(3), None);
    }

    #[test]
    fn test_ndp_flags_default_and_bits() {
        let flags = NdpFlags::default();
        assert!(!flags.router);
        assert!(flags.solicited);
        assert!(flags.override_);
        assert_eq!(flags.bits(), 0x60);
        assert_eq!(NdpFlags::from_bits(0xE0).bits(), 0xE0);
        assert_eq!(flags.to_string(), "R=0 S=1 O=1");
    }

    #[test]
    fn test_layer_classification() {
        let tcp = LogicalHeader::Tcp(TcpHeader { sport: 1, dport: 2 });
        assert_eq!(tcp.carried_as(), Some(IpProtocol::Tcp));
        assert!(!tcp.is_network());

        let eth = LogicalHeader::Ethernet(EthernetHeader {
            src: MacAddr::zero(),
            dst: MacAddr::broadcast(),
        });
        assert!(eth.is_link());
        assert_eq!(eth.carried_as(), None);
        assert_eq!(eth.wire_len(), 14);
    }

    #[test]
    fn test_display_lists_fields() {
        let eth = LogicalHeader::Ethernet(EthernetHeader {
            src: MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            dst: MacAddr::broadcast(),
        });
        let text = eth.to_string();
        assert!(text.starts_with("###[ Ethernet ]###"));
        assert!(text.contains("dst        = ff:ff:ff:ff:ff:ff"));
        assert!(text.contains("src        = aa:bb:cc:dd:ee:ff"));
    }
}
