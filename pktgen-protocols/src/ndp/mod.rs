//! IPv6 Neighbor Discovery - RFC 4861
//!
//! Builds Neighbor Solicitations and Neighbor Advertisements. Every message
//! leaves with IPv6 hop limit 255; receivers drop NDP traffic with any other
//! value (section 7.1.1), so the hop limit is not a parameter here.
//!
//! ## Messages
//!
//! ```text
//! NS (135)  target + Source Link-Layer Address option (type 1)
//! NA (136)  R/S/O flags + target + Target Link-Layer Address option (type 2)
//! ```
//!
//! Both options carry the frame's source MAC. Advertisement flags default to
//! Router=0, Solicited=1, Override=1.

mod params;

pub use params::{parse_operation, NdpOperation, NdpParams};

use pktgen_packet::layer::{LogicalHeader, NdpAdvertisement, NdpSolicitation};

/// A resolved NDP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NdpMessage {
    Solicitation(NdpSolicitation),
    Advertisement(NdpAdvertisement),
}

impl NdpMessage {
    pub fn operation(&self) -> NdpOperation {
        match self {
            NdpMessage::Solicitation(_) => NdpOperation::Solicitation,
            NdpMessage::Advertisement(_) => NdpOperation::Advertisement,
        }
    }

    pub fn into_header(self) -> LogicalHeader {
        match self {
            NdpMessage::Solicitation(ns) => LogicalHeader::NdpSolicitation(ns),
            NdpMessage::Advertisement(na) => LogicalHeader::NdpAdvertisement(na),
        }
    }
}
