//! Packet requests and their resolved headers

use crate::arp::ArpParams;
use crate::ip::{Ipv4Params, Ipv6Params, Transport};
use crate::link::LinkParams;
use crate::ndp::{NdpMessage, NdpParams};
use pktgen_core::{PacketFamily, Result};
use pktgen_packet::layer::{ArpHeader, EthernetHeader, Ipv4Header, Ipv6Header};
use std::net::Ipv6Addr;
use tracing::debug;

/// Family-specific raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyParams {
    Arp(ArpParams),
    Ipv4(Ipv4Params),
    Ipv6(Ipv6Params),
    Ndp(NdpParams),
}

impl FamilyParams {
    pub fn family(&self) -> PacketFamily {
        match self {
            FamilyParams::Arp(_) => PacketFamily::Arp,
            FamilyParams::Ipv4(_) => PacketFamily::Ipv4,
            FamilyParams::Ipv6(_) => PacketFamily::Ipv6,
            FamilyParams::Ndp(_) => PacketFamily::Ndp,
        }
    }
}

/// Everything needed to craft one frame, still as user text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketRequest {
    pub link: LinkParams,
    pub params: FamilyParams,
}

impl PacketRequest {
    pub fn new(link: LinkParams, params: FamilyParams) -> Self {
        Self { link, params }
    }

    pub fn family(&self) -> PacketFamily {
        self.params.family()
    }

    /// Apply the family's defaulting rules and parse every field.
    ///
    /// Fails on the first invalid, missing or unsupported field; nothing is
    /// built in that case.
    pub fn resolve(&self) -> Result<ResolvedHeaders> {
        let family = self.family();
        let ethernet = self.link.resolve(family)?;
        debug!("{}: ethernet {} -> {}", family, ethernet.src, ethernet.dst);

        let resolved = match &self.params {
            FamilyParams::Arp(params) => ResolvedHeaders::Arp {
                arp: params.resolve(&ethernet)?,
                ethernet,
            },
            FamilyParams::Ipv4(params) => {
                let (ip, transport) = params.resolve()?;
                ResolvedHeaders::Ipv4 {
                    ethernet,
                    ip,
                    transport,
                }
            }
            FamilyParams::Ipv6(params) => {
                let (ip, transport) = params.resolve()?;
                ResolvedHeaders::Ipv6 {
                    ethernet,
                    ip,
                    transport,
                }
            }
            FamilyParams::Ndp(params) => {
                let (src, dst, message) = params.resolve(ethernet.src)?;
                ResolvedHeaders::Ndp {
                    ethernet,
                    src,
                    dst,
                    message,
                }
            }
        };

        Ok(resolved)
    }
}

/// Fully-populated headers for one family.
///
/// The NDP variant has no hop limit or next header: both are fixed by the
/// builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedHeaders {
    Arp {
        ethernet: EthernetHeader,
        arp: ArpHeader,
    },
    Ipv4 {
        ethernet: EthernetHeader,
        ip: Ipv4Header,
        transport: Transport,
    },
    Ipv6 {
        ethernet: EthernetHeader,
        ip: Ipv6Header,
        transport: Transport,
    },
    Ndp {
        ethernet: EthernetHeader,
        src: Ipv6Addr,
        dst: Ipv6Addr,
        message: NdpMessage,
    },
}

impl ResolvedHeaders {
    pub fn family(&self) -> PacketFamily {
        match self {
            ResolvedHeaders::Arp { .. } => PacketFamily::Arp,
            ResolvedHeaders::Ipv4 { .. } => PacketFamily::Ipv4,
            ResolvedHeaders::Ipv6 { .. } => PacketFamily::Ipv6,
            ResolvedHeaders::Ndp { .. } => PacketFamily::Ndp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktgen_core::Error;

    #[test]
    fn test_family_follows_params() {
        let request = PacketRequest::new(
            LinkParams::default(),
            FamilyParams::Ndp(NdpParams::default()),
        );
        assert_eq!(request.family(), PacketFamily::Ndp);
    }

    #[test]
    fn test_bad_link_reported_against_family() {
        let request = PacketRequest::new(
            LinkParams::new("not-a-mac", "ff:ff:ff:ff:ff:ff"),
            FamilyParams::Ipv6(Ipv6Params::default()),
        );
        match request.resolve().unwrap_err() {
            Error::InvalidField { family, field, value, .. } => {
                assert_eq!(family, PacketFamily::Ipv6);
                assert_eq!(field, "src-mac");
                assert_eq!(value, "not-a-mac");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_arp_resolves_against_link() {
        let request = PacketRequest::new(
            LinkParams::new("02:00:00:00:00:01", "02:00:00:00:00:02"),
            FamilyParams::Arp(ArpParams {
                src_ip: Some("10.0.0.1".into()),
                dst_ip: Some("10.0.0.2".into()),
                ..Default::default()
            }),
        );
        let resolved = request.resolve().unwrap();
        assert_eq!(resolved.family(), PacketFamily::Arp);
        match resolved {
            ResolvedHeaders::Arp { ethernet, arp } => {
                assert_eq!(arp.sender_mac, ethernet.src);
                assert_eq!(arp.target_mac, ethernet.dst);
            }
            other => panic!("unexpected family {}", other.family()),
        }
    }
}
