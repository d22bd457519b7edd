//! Transport selection for the IPv4 and IPv6 families

use crate::fields::{DEFAULT_DPORT, DEFAULT_PROTO, DEFAULT_SPORT};
use pktgen_core::{Error, PacketFamily, Result};
use pktgen_packet::layer::{IcmpEchoHeader, IpProtocol, LogicalHeader, TcpHeader, UdpHeader};
use tracing::{debug, warn};

/// Header carried after an IP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp(TcpHeader),
    Udp(UdpHeader),
    /// ICMP echo request, IPv4 only
    IcmpEcho,
}

impl Transport {
    /// Protocol number the enclosing IP header must declare
    pub fn protocol(&self) -> IpProtocol {
        match self {
            Transport::Tcp(_) => IpProtocol::Tcp,
            Transport::Udp(_) => IpProtocol::Udp,
            Transport::IcmpEcho => IpProtocol::Icmp,
        }
    }

    pub fn into_header(self) -> LogicalHeader {
        match self {
            Transport::Tcp(tcp) => LogicalHeader::Tcp(tcp),
            Transport::Udp(udp) => LogicalHeader::Udp(udp),
            Transport::IcmpEcho => LogicalHeader::IcmpEcho(IcmpEchoHeader),
        }
    }
}

/// Resolve `proto` plus optional ports into a [`Transport`].
///
/// `icmp` is only accepted for IPv4. Ports given alongside `icmp` are
/// dropped with a warning.
pub(crate) fn select(
    family: PacketFamily,
    proto: Option<&str>,
    sport: Option<u16>,
    dport: Option<u16>,
) -> Result<Transport> {
    let proto = match proto {
        Some(p) => p.to_ascii_lowercase(),
        None => {
            debug!("{}: no protocol given, defaulting to {}", family, DEFAULT_PROTO);
            DEFAULT_PROTO.to_string()
        }
    };

    let ports = || {
        let sport = sport.unwrap_or_else(|| {
            debug!("{}: sport defaulted to {}", family, DEFAULT_SPORT);
            DEFAULT_SPORT
        });
        let dport = dport.unwrap_or_else(|| {
            debug!("{}: dport defaulted to {}", family, DEFAULT_DPORT);
            DEFAULT_DPORT
        });
        (sport, dport)
    };

    match proto.as_str() {
        "tcp" => {
            let (sport, dport) = ports();
            Ok(Transport::Tcp(TcpHeader { sport, dport }))
        }
        "udp" => {
            let (sport, dport) = ports();
            Ok(Transport::Udp(UdpHeader { sport, dport }))
        }
        "icmp" if family == PacketFamily::Ipv4 => {
            if sport.is_some() || dport.is_some() {
                warn!("{}: ICMP echo has no ports, ignoring sport/dport", family);
            }
            Ok(Transport::IcmpEcho)
        }
        "icmp" => Err(Error::unsupported(
            family,
            "icmp over IPv6 (use tcp or udp)",
        )),
        _ => Err(Error::invalid_field(
            family,
            "proto",
            proto.as_str(),
            "expected tcp, udp or icmp",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_tcp_with_default_ports() {
        let transport = select(PacketFamily::Ipv4, None, None, None).unwrap();
        assert_eq!(
            transport,
            Transport::Tcp(TcpHeader {
                sport: DEFAULT_SPORT,
                dport: DEFAULT_DPORT
            })
        );
        assert_eq!(transport.protocol(), IpProtocol::Tcp);
    }

    #[test]
    fn test_udp_keeps_ports() {
        let transport = select(PacketFamily::Ipv6, Some("UDP"), Some(5353), Some(53)).unwrap();
        assert_eq!(
            transport.into_header(),
            LogicalHeader::Udp(UdpHeader {
                sport: 5353,
                dport: 53
            })
        );
    }

    #[test]
    fn test_icmp_drops_ports() {
        let transport = select(PacketFamily::Ipv4, Some("icmp"), Some(1), Some(2)).unwrap();
        assert_eq!(transport, Transport::IcmpEcho);
        assert_eq!(transport.protocol(), IpProtocol::Icmp);
    }

    #[test]
    fn test_icmp_over_ipv6_is_unsupported() {
        let err = select(PacketFamily::Ipv6, Some("icmp"), None, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Unsupported {
                family: PacketFamily::Ipv6,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_protocol() {
        let err = select(PacketFamily::Ipv4, Some("sctp"), None, None).unwrap_err();
        assert_eq!(err.field(), Some("proto"));
        assert!(err.to_string().contains("sctp"));
    }
}
