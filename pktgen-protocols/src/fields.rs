//! Field defaults and text parsing shared by every family

use pktgen_core::{Error, MacAddr, PacketFamily, Result};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Source MAC used when none is configured
pub const DEFAULT_SRC_MAC: &str = "aa:bb:cc:dd:ee:ff";
/// Destination MAC used when none is configured
pub const DEFAULT_DST_MAC: &str = "ff:ff:ff:ff:ff:ff";
pub const DEFAULT_TTL: u8 = 64;
pub const DEFAULT_HOP_LIMIT: u8 = 64;
pub const DEFAULT_PROTO: &str = "tcp";
pub const DEFAULT_SPORT: u16 = 12345;
pub const DEFAULT_DPORT: u16 = 80;

/// Unwrap a field the family cannot do without
pub fn require<'a>(
    family: PacketFamily,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::missing_field(family, field))
}

pub fn parse_mac(family: PacketFamily, field: &'static str, text: &str) -> Result<MacAddr> {
    text.parse::<MacAddr>()
        .map_err(|e| Error::invalid_field(family, field, text, e.to_string()))
}

pub fn parse_ipv4(family: PacketFamily, field: &'static str, text: &str) -> Result<Ipv4Addr> {
    text.parse::<Ipv4Addr>().map_err(|_| {
        let reason = if text.parse::<Ipv6Addr>().is_ok() {
            "expected IPv4 address, got IPv6"
        } else {
            "not a valid IPv4 address"
        };
        Error::invalid_field(family, field, text, reason)
    })
}

pub fn parse_ipv6(family: PacketFamily, field: &'static str, text: &str) -> Result<Ipv6Addr> {
    text.parse::<Ipv6Addr>().map_err(|_| {
        let reason = if text.parse::<Ipv4Addr>().is_ok() {
            "expected IPv6 address, got IPv4"
        } else {
            "not a valid IPv6 address"
        };
        Error::invalid_field(family, field, text, reason)
    })
}
