//! IPv4 and IPv6 datagram families
//!
//! Both families resolve source/destination addresses, a TTL or hop limit
//! and one transport header chosen by `proto`:
//!
//! | proto | IPv4 | IPv6 |
//! |---|---|---|
//! | `tcp` (default) | TCP | TCP |
//! | `udp` | UDP | UDP |
//! | `icmp` | ICMP echo request, no ports | unsupported |

mod transport;

pub use transport::Transport;

use crate::fields::{parse_ipv4, parse_ipv6, require, DEFAULT_HOP_LIMIT, DEFAULT_TTL};
use pktgen_core::{PacketFamily, Result};
use pktgen_packet::layer::{Ipv4Header, Ipv6Header};
use tracing::debug;

/// Raw IPv4 input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv4Params {
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub ttl: Option<u8>,
    /// `tcp`, `udp` or `icmp`
    pub proto: Option<String>,
    pub sport: Option<u16>,
    pub dport: Option<u16>,
}

impl Ipv4Params {
    pub fn resolve(&self) -> Result<(Ipv4Header, Transport)> {
        const FAMILY: PacketFamily = PacketFamily::Ipv4;

        let src = parse_ipv4(FAMILY, "src-ip", require(FAMILY, "src-ip", &self.src_ip)?)?;
        let dst = parse_ipv4(FAMILY, "dst-ip", require(FAMILY, "dst-ip", &self.dst_ip)?)?;
        let ttl = self.ttl.unwrap_or_else(|| {
            debug!("ipv4: ttl defaulted to {}", DEFAULT_TTL);
            DEFAULT_TTL
        });
        let transport = transport::select(FAMILY, self.proto.as_deref(), self.sport, self.dport)?;

        let header = Ipv4Header {
            src,
            dst,
            ttl,
            protocol: transport.protocol(),
        };
        Ok((header, transport))
    }
}

/// Raw IPv6 input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv6Params {
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub hlim: Option<u8>,
    /// `tcp` or `udp`
    pub proto: Option<String>,
    pub sport: Option<u16>,
    pub dport: Option<u16>,
}

impl Ipv6Params {
    pub fn resolve(&self) -> Result<(Ipv6Header, Transport)> {
        const FAMILY: PacketFamily = PacketFamily::Ipv6;

        let src = parse_ipv6(FAMILY, "src-ip", require(FAMILY, "src-ip", &self.src_ip)?)?;
        let dst = parse_ipv6(FAMILY, "dst-ip", require(FAMILY, "dst-ip", &self.dst_ip)?)?;
        let hop_limit = self.hlim.unwrap_or_else(|| {
            debug!("ipv6: hop limit defaulted to {}", DEFAULT_HOP_LIMIT);
            DEFAULT_HOP_LIMIT
        });
        let transport = transport::select(FAMILY, self.proto.as_deref(), self.sport, self.dport)?;

        let header = Ipv6Header {
            src,
            dst,
            hop_limit,
            next_header: transport.protocol(),
        };
        Ok((header, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktgen_core::{Error, ErrorKind};
    use pktgen_packet::layer::{IpProtocol, TcpHeader};
    use std::net::Ipv4Addr;

    #[test]
    fn test_ipv4_tcp_with_ttl() {
        let params = Ipv4Params {
            src_ip: Some("10.128.0.1".into()),
            dst_ip: Some("192.168.1.1".into()),
            ttl: Some(32),
            proto: Some("tcp".into()),
            dport: Some(443),
            ..Default::default()
        };
        let (ip, transport) = params.resolve().unwrap();
        assert_eq!(ip.src, Ipv4Addr::new(10, 128, 0, 1));
        assert_eq!(ip.ttl, 32);
        assert_eq!(ip.protocol, IpProtocol::Tcp);
        assert_eq!(
            transport,
            Transport::Tcp(TcpHeader {
                sport: 12345,
                dport: 443
            })
        );
    }

    #[test]
    fn test_ipv4_defaults() {
        let params = Ipv4Params {
            src_ip: Some("10.0.0.1".into()),
            dst_ip: Some("10.0.0.2".into()),
            ..Default::default()
        };
        let (ip, transport) = params.resolve().unwrap();
        assert_eq!(ip.ttl, 64);
        assert_eq!(transport.protocol(), IpProtocol::Tcp);
    }

    #[test]
    fn test_ipv4_icmp_declares_protocol_1() {
        let params = Ipv4Params {
            src_ip: Some("10.0.0.1".into()),
            dst_ip: Some("10.0.0.2".into()),
            proto: Some("icmp".into()),
            sport: Some(1000),
            ..Default::default()
        };
        let (ip, transport) = params.resolve().unwrap();
        assert_eq!(ip.protocol, IpProtocol::Icmp);
        assert_eq!(transport, Transport::IcmpEcho);
    }

    #[test]
    fn test_ipv4_rejects_ipv6_source() {
        let params = Ipv4Params {
            src_ip: Some("2001:db8::1".into()),
            dst_ip: Some("10.0.0.2".into()),
            ..Default::default()
        };
        let err = params.resolve().unwrap_err();
        assert_eq!(err.field(), Some("src-ip"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_ipv6_udp() {
        let params = Ipv6Params {
            src_ip: Some("2001:db8::1".into()),
            dst_ip: Some("2001:db8::2".into()),
            hlim: Some(1),
            proto: Some("udp".into()),
            ..Default::default()
        };
        let (ip, transport) = params.resolve().unwrap();
        assert_eq!(ip.hop_limit, 1);
        assert_eq!(ip.next_header, IpProtocol::Udp);
        assert_eq!(transport.protocol(), IpProtocol::Udp);
    }

    #[test]
    fn test_ipv6_default_hop_limit() {
        let params = Ipv6Params {
            src_ip: Some("::1".into()),
            dst_ip: Some("::2".into()),
            ..Default::default()
        };
        assert_eq!(params.resolve().unwrap().0.hop_limit, 64);
    }

    #[test]
    fn test_ipv6_icmp_unsupported() {
        let params = Ipv6Params {
            src_ip: Some("::1".into()),
            dst_ip: Some("::2".into()),
            proto: Some("icmp".into()),
            ..Default::default()
        };
        assert!(matches!(
            params.resolve().unwrap_err(),
            Error::Unsupported { .. }
        ));
    }

    #[test]
    fn test_ipv6_missing_destination() {
        let params = Ipv6Params {
            src_ip: Some("::1".into()),
            ..Default::default()
        };
        let err = params.resolve().unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "dst-ip", .. }));
    }
}
