//! Header field resolution for pktgen
//!
//! This crate turns raw, partial user input into a validated
//! [`PacketStack`](pktgen_packet::PacketStack). Each family module owns its
//! defaulting policy:
//!
//! - [`arp`] - who-has/is-at with target hardware address defaulting
//! - [`ip`] - IPv4 and IPv6 with TCP, UDP or ICMP echo
//! - [`ndp`] - Neighbor Solicitation/Advertisement, hop limit pinned to 255
//!
//! [`PacketRequest::resolve`] applies those rules and
//! [`StackBuilder`] assembles the result in wire order.
//!
//! ```rust
//! use pktgen_protocols::{FamilyParams, LinkParams, PacketRequest, StackBuilder};
//! use pktgen_protocols::arp::ArpParams;
//!
//! # fn main() -> pktgen_core::Result<()> {
//! let request = PacketRequest::new(
//!     LinkParams::default(),
//!     FamilyParams::Arp(ArpParams {
//!         op: Some("who-has".into()),
//!         src_ip: Some("10.0.0.1".into()),
//!         dst_ip: Some("10.0.0.2".into()),
//!         target_mac: None,
//!     }),
//! );
//! let stack = StackBuilder::build_request(&request)?;
//! assert_eq!(stack.wire_len(), 42);
//! # Ok(())
//! # }
//! ```

pub mod arp;
pub mod builder;
pub mod fields;
pub mod ip;
pub mod link;
pub mod ndp;
pub mod request;

// Re-export the request surface for convenience
pub use arp::ArpParams;
pub use builder::StackBuilder;
pub use ip::{Ipv4Params, Ipv6Params, Transport};
pub use link::LinkParams;
pub use ndp::{NdpMessage, NdpParams};
pub use request::{FamilyParams, PacketRequest, ResolvedHeaders};
