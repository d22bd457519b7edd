//! Layer stack assembly

use crate::request::{PacketRequest, ResolvedHeaders};
use pktgen_core::Result;
use pktgen_packet::layer::{IpProtocol, Ipv6Header, LogicalHeader, NDP_HOP_LIMIT};
use pktgen_packet::PacketStack;
use tracing::debug;

/// Assembles resolved headers into a [`PacketStack`], Ethernet first.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackBuilder;

impl StackBuilder {
    pub fn build(headers: ResolvedHeaders) -> Result<PacketStack> {
        let family = headers.family();
        let layers = match headers {
            ResolvedHeaders::Arp { ethernet, arp } => {
                vec![LogicalHeader::Ethernet(ethernet), LogicalHeader::Arp(arp)]
            }
            ResolvedHeaders::Ipv4 {
                ethernet,
                ip,
                transport,
            } => vec![
                LogicalHeader::Ethernet(ethernet),
                LogicalHeader::Ipv4(ip),
                transport.into_header(),
            ],
            ResolvedHeaders::Ipv6 {
                ethernet,
                ip,
                transport,
            } => vec![
                LogicalHeader::Ethernet(ethernet),
                LogicalHeader::Ipv6(ip),
                transport.into_header(),
            ],
            ResolvedHeaders::Ndp {
                ethernet,
                src,
                dst,
                message,
            } => vec![
                LogicalHeader::Ethernet(ethernet),
                LogicalHeader::Ipv6(Ipv6Header {
                    src,
                    dst,
                    hop_limit: NDP_HOP_LIMIT,
                    next_header: IpProtocol::Icmpv6,
                }),
                message.into_header(),
            ],
        };

        let stack = PacketStack::new(layers)?;
        debug!("{}: built {} layers, {} bytes", family, stack.len(), stack.wire_len());
        Ok(stack)
    }

    /// Resolve then build. Resolver errors come back untouched.
    pub fn build_request(request: &PacketRequest) -> Result<PacketStack> {
        Self::build(request.resolve()?)
    }
}
