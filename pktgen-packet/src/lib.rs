//! Header model and wire codec for pktgen
//!
//! This crate describes a frame as an ordered stack of logical headers and
//! turns that stack into bytes. It covers:
//!
//! - **Ethernet II** as the only link layer
//! - **ARP** for Ethernet/IPv4
//! - **IPv4** carrying TCP, UDP or an ICMP echo request
//! - **IPv6** carrying TCP, UDP or an NDP Neighbor Solicitation/Advertisement
//!
//! # Architecture
//!
//! - [`layer`] - Logical headers, one per protocol layer
//! - [`stack`] - [`PacketStack`], the validated ordered list of layers
//! - [`codec`] - The [`Codec`] seam and its `pnet_packet` implementation
//! - [`decode`] - Frame parsing back into a stack
//!
//! # Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use pktgen_core::MacAddr;
//! use pktgen_packet::layer::*;
//! use pktgen_packet::{Codec, PacketStack, PnetCodec};
//!
//! # fn main() -> pktgen_core::Result<()> {
//! let stack = PacketStack::new(vec![
//!     LogicalHeader::Ethernet(EthernetHeader {
//!         src: MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
//!         dst: MacAddr::broadcast(),
//!     }),
//!     LogicalHeader::Ipv4(Ipv4Header {
//!         src: Ipv4Addr::new(192, 168, 1, 1),
//!         dst: Ipv4Addr::new(192, 168, 1, 2),
//!         ttl: 64,
//!         protocol: IpProtocol::Udp,
//!     }),
//!     LogicalHeader::Udp(UdpHeader { sport: 12345, dport: 53 }),
//! ])?;
//!
//! let frame = PnetCodec.encode(&stack)?;
//! assert_eq!(frame.len(), 14 + 20 + 8);
//! assert_eq!(pktgen_packet::decode(&frame)?, stack);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod decode;
pub mod layer;
pub mod stack;

// Re-export commonly used types for convenience
pub use codec::{Codec, PnetCodec};
pub use decode::decode;
pub use layer::{IpProtocol, LogicalHeader};
pub use stack::PacketStack;
