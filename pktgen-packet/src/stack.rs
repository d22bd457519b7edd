//! Ordered header stacks

use crate::layer::{EthernetHeader, IpProtocol, LogicalHeader, NDP_HOP_LIMIT};
use pktgen_core::{Error, Result};
use std::fmt;

/// One complete frame as an ordered list of logical headers, outermost first.
///
/// Invariants, checked by [`PacketStack::new`]:
/// - position 0 holds the only link-layer header;
/// - position 1 holds the only network-layer header (ARP, IPv4 or IPv6);
/// - ARP is terminal;
/// - a header after IPv4/IPv6 matches the protocol the IP header declares;
/// - an NDP message rides on IPv6 with hop limit 255;
/// - nothing follows the transport/control header.
///
/// There are no mutators; a stack is built once and then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketStack {
    layers: Vec<LogicalHeader>,
}

impl PacketStack {
    pub fn new(layers: Vec<LogicalHeader>) -> Result<Self> {
        validate(&layers)?;
        Ok(Self { layers })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogicalHeader> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: a valid stack has at least two layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ethernet(&self) -> &EthernetHeader {
        match &self.layers[0] {
            LogicalHeader::Ethernet(eth) => eth,
            _ => unreachable!("validated stack starts with Ethernet"),
        }
    }

    pub fn network(&self) -> &LogicalHeader {
        &self.layers[1]
    }

    /// Transport or control header following IPv4/IPv6, if any
    pub fn transport(&self) -> Option<&LogicalHeader> {
        self.layers.get(2)
    }

    /// Total frame length in bytes
    pub fn wire_len(&self) -> usize {
        self.layers.iter().map(LogicalHeader::wire_len).sum()
    }

    /// Bytes carried after the layer at `index`
    pub fn payload_len(&self, index: usize) -> usize {
        self.layers
            .iter()
            .skip(index + 1)
            .map(LogicalHeader::wire_len)
            .sum()
    }
}

fn validate(layers: &[LogicalHeader]) -> Result<()> {
    match layers.first() {
        Some(LogicalHeader::Ethernet(_)) => {}
        Some(other) => {
            return Err(Error::malformed(format!(
                "first layer must be Ethernet, found {}",
                other.name()
            )))
        }
        None => return Err(Error::malformed("stack has no layers")),
    }

    let network = layers
        .get(1)
        .ok_or_else(|| Error::malformed("Ethernet must be followed by a network layer"))?;
    if !network.is_network() {
        return Err(Error::malformed(format!(
            "layer 1 must be ARP, IPv4 or IPv6, found {}",
            network.name()
        )));
    }

    if layers.len() > 3 {
        return Err(Error::malformed(format!(
            "unexpected {} after {}",
            layers[3].name(),
            layers[2].name()
        )));
    }

    let upper = match layers.get(2) {
        Some(upper) => upper,
        None => return Ok(()),
    };

    let declared = match network {
        LogicalHeader::Arp(_) => {
            return Err(Error::malformed(format!(
                "ARP is terminal, found {} after it",
                upper.name()
            )))
        }
        LogicalHeader::Ipv4(ip) => ip.protocol,
        LogicalHeader::Ipv6(ip) => ip.next_header,
        _ => unreachable!("checked by is_network"),
    };

    let carried = upper.carried_as().ok_or_else(|| {
        Error::malformed(format!("{} cannot follow {}", upper.name(), network.name()))
    })?;
    if carried != declared {
        return Err(Error::malformed(format!(
            "{} declares {} but carries {}",
            network.name(),
            declared,
            upper.name()
        )));
    }

    match (network, carried) {
        (LogicalHeader::Ipv4(_), IpProtocol::Icmpv6) => Err(Error::malformed(
            "NDP messages require an IPv6 network layer",
        )),
        (LogicalHeader::Ipv6(_), IpProtocol::Icmp) => Err(Error::malformed(
            "ICMP echo requires an IPv4 network layer",
        )),
        (LogicalHeader::Ipv6(ip), IpProtocol::Icmpv6) if ip.hop_limit != NDP_HOP_LIMIT => {
            Err(Error::malformed(format!(
                "NDP messages require hop limit {}, found {}",
                NDP_HOP_LIMIT, ip.hop_limit
            )))
        }
        _ => Ok(()),
    }
}

impl<'a> IntoIterator for &'a PacketStack {
    type Item = &'a LogicalHeader;
    type IntoIter = std::slice::Iter<'a, LogicalHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

/// Layer-by-layer field listing, outermost first
impl fmt::Display for PacketStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in &self.layers {
            write!(f, "{}", layer)?;
        }
        Ok(())
    }
}
