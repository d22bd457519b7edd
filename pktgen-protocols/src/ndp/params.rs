use super::NdpMessage;
use crate::fields::{parse_ipv6, require};
use pktgen_core::{Error, MacAddr, PacketFamily, Result};
use pktgen_packet::layer::{NdpAdvertisement, NdpFlags, NdpSolicitation, NDP_HOP_LIMIT};
use std::fmt;
use std::net::Ipv6Addr;
use tracing::{debug, warn};

const FAMILY: PacketFamily = PacketFamily::Ndp;

/// NDP message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NdpOperation {
    /// Neighbor Solicitation (135)
    Solicitation,
    /// Neighbor Advertisement (136)
    Advertisement,
}

impl fmt::Display for NdpOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NdpOperation::Solicitation => write!(f, "ns"),
            NdpOperation::Advertisement => write!(f, "na"),
        }
    }
}

pub fn parse_operation(text: &str) -> Result<NdpOperation> {
    match text.to_ascii_lowercase().as_str() {
        "ns" | "solicit" | "neighbor-solicitation" => Ok(NdpOperation::Solicitation),
        "na" | "advert" | "neighbor-advertisement" => Ok(NdpOperation::Advertisement),
        _ => Err(Error::invalid_field(
            FAMILY,
            "op",
            text,
            "expected ns, solicit, neighbor-solicitation, na, advert or neighbor-advertisement",
        )),
    }
}

/// Raw NDP input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NdpParams {
    /// `ns` (default) or `na`
    pub op: Option<String>,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    /// Address being solicited or advertised
    pub target_ip: Option<String>,
    /// Accepted for symmetry with the ipv6 family; never applied
    pub hlim: Option<u8>,
    pub router: Option<bool>,
    pub solicited: Option<bool>,
    pub override_: Option<bool>,
}

impl NdpParams {
    fn has_flag_overrides(&self) -> bool {
        self.router.is_some() || self.solicited.is_some() || self.override_.is_some()
    }

    fn flags(&self) -> NdpFlags {
        let defaults = NdpFlags::default();
        NdpFlags {
            router: self.router.unwrap_or(defaults.router),
            solicited: self.solicited.unwrap_or(defaults.solicited),
            override_: self.override_.unwrap_or(defaults.override_),
        }
    }

    /// Resolve into IPv6 source, destination and the message.
    ///
    /// `lla` is the frame's source MAC, carried in the link-layer address
    /// option of either message.
    pub fn resolve(&self, lla: MacAddr) -> Result<(Ipv6Addr, Ipv6Addr, NdpMessage)> {
        let operation = match self.op.as_deref() {
            Some(op) => parse_operation(op)?,
            None => {
                debug!("ndp: no operation given, defaulting to {}", NdpOperation::Solicitation);
                NdpOperation::Solicitation
            }
        };

        let src = parse_ipv6(FAMILY, "src-ip", require(FAMILY, "src-ip", &self.src_ip)?)?;
        let dst = parse_ipv6(FAMILY, "dst-ip", require(FAMILY, "dst-ip", &self.dst_ip)?)?;
        let target = parse_ipv6(
            FAMILY,
            "target-ip",
            require(FAMILY, "target-ip", &self.target_ip)?,
        )?;

        if let Some(hlim) = self.hlim.filter(|&h| h != NDP_HOP_LIMIT) {
            warn!(
                "ndp: ignoring hop limit {}, neighbor discovery is always sent with {}",
                hlim, NDP_HOP_LIMIT
            );
        }

        let message = match operation {
            NdpOperation::Solicitation => {
                if self.has_flag_overrides() {
                    warn!("ndp: R/S/O flags only apply to advertisements, ignoring them");
                }
                NdpMessage::Solicitation(NdpSolicitation {
                    target,
                    source_lla: lla,
                })
            }
            NdpOperation::Advertisement => {
                let flags = self.flags();
                debug!("ndp: advertisement flags {}", flags);
                NdpMessage::Advertisement(NdpAdvertisement {
                    target,
                    flags,
                    target_lla: lla,
                })
            }
        };

        Ok((src, dst, message))
    }
}
