//! Address Resolution Protocol (ARP) - RFC 826
//!
//! Resolves raw ARP parameters into an Ethernet/IPv4 [`ArpHeader`].
//!
//! ## Target hardware address
//!
//! ```text
//! target-mac supplied   -> used verbatim
//! who-has (opcode 1)    -> 00:00:00:00:00:00
//! is-at   (opcode 2)    -> the frame's destination MAC
//! ```
//!
//! The operation defaults to `is-at`. The sender hardware address is always
//! the frame's source MAC.
//!
//! [`ArpHeader`]: pktgen_packet::layer::ArpHeader

mod resolve;

pub use resolve::{parse_operation, ArpParams};
