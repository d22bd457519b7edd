use crate::fields::{parse_ipv4, parse_mac, require};
use pktgen_core::{Error, MacAddr, PacketFamily, Result};
use pktgen_packet::layer::{ArpHeader, ArpOperation, EthernetHeader};
use tracing::debug;

const FAMILY: PacketFamily = PacketFamily::Arp;

/// Raw ARP input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArpParams {
    /// `who-has`/`request`/`1` or `is-at`/`reply`/`2`
    pub op: Option<String>,
    /// Sender protocol address
    pub src_ip: Option<String>,
    /// Target protocol address
    pub dst_ip: Option<String>,
    /// Explicit target hardware address
    pub target_mac: Option<String>,
}

/// Map an operation name or opcode onto [`ArpOperation`]
pub fn parse_operation(text: &str) -> Result<ArpOperation> {
    match text.to_ascii_lowercase().as_str() {
        "who-has" | "request" | "1" => Ok(ArpOperation::Request),
        "is-at" | "reply" | "2" => Ok(ArpOperation::Reply),
        _ => Err(Error::invalid_field(
            FAMILY,
            "op",
            text,
            "expected who-has, request, 1, is-at, reply or 2",
        )),
    }
}

impl ArpParams {
    pub fn resolve(&self, ethernet: &EthernetHeader) -> Result<ArpHeader> {
        let operation = match self.op.as_deref() {
            Some(op) => parse_operation(op)?,
            None => {
                debug!("arp: no operation given, defaulting to {}", ArpOperation::Reply);
                ArpOperation::Reply
            }
        };

        let sender_ip = parse_ipv4(FAMILY, "src-ip", require(FAMILY, "src-ip", &self.src_ip)?)?;
        let target_ip = parse_ipv4(FAMILY, "dst-ip", require(FAMILY, "dst-ip", &self.dst_ip)?)?;

        let target_mac = match self.target_mac.as_deref() {
            Some(text) => parse_mac(FAMILY, "target-mac", text)?,
            None => {
                let mac = match operation {
                    ArpOperation::Request => MacAddr::zero(),
                    ArpOperation::Reply => ethernet.dst,
                };
                debug!("arp: target MAC defaulted to {} for {}", mac, operation);
                mac
            }
        };

        Ok(ArpHeader {
            operation,
            sender_mac: ethernet.src,
            sender_ip,
            target_mac,
            target_ip,
        })
    }
}
