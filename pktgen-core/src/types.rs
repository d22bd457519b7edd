//! Common types used throughout pktgen

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Broadcast MAC address (ff:ff:ff:ff:ff:ff)
    pub const fn broadcast() -> Self {
        Self([0xff, 0xff, 0xff, 0xff, 0xff, 0xff])
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Why a MAC address string was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacParseError(&'static str);

impl fmt::Display for MacParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for MacParseError {}

impl FromStr for MacAddr {
    type Err = MacParseError;

    /// Parse `aa:bb:cc:dd:ee:ff`. Every octet must be written with two hex
    /// digits; shortened forms are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(MacParseError("expected six colon-separated octets"));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(MacParseError("each octet must be two hex digits"));
            }
            // from_str_radix tolerates a leading sign
            if !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(MacParseError("invalid hex digit in octet"));
            }
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| MacParseError("invalid hex digit in octet"))?;
        }

        Ok(MacAddr(bytes))
    }
}

/// Packet family selecting which resolver rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketFamily {
    /// Ethernet / ARP
    Arp,
    /// Ethernet / IPv4 / {TCP, UDP, ICMP}
    Ipv4,
    /// Ethernet / IPv6 / {TCP, UDP}
    Ipv6,
    /// Ethernet / IPv6 / ICMPv6 neighbor discovery
    Ndp,
}

impl PacketFamily {
    pub fn name(self) -> &'static str {
        match self {
            PacketFamily::Arp => "arp",
            PacketFamily::Ipv4 => "ipv4",
            PacketFamily::Ipv6 => "ipv6",
            PacketFamily::Ndp => "ndp",
        }
    }
}

impl fmt::Display for PacketFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ethertype constants
pub mod ethertypes {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const IPV6: u16 = 0x86DD;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_parse_and_display() {
        let mac: MacAddr = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.0, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");

        let upper: MacAddr = "11:22:33:44:55:6A".parse().unwrap();
        assert_eq!(upper.0[5], 0x6a);
    }

    #[test]
    fn test_mac_rejects_short_forms() {
        assert!("aa:bb:cc:dd:ee".parse::<MacAddr>().is_err());
        assert!("aa:bb:cc:dd:ee:ff:00".parse::<MacAddr>().is_err());
        assert!("a:b:c:d:e:f".parse::<MacAddr>().is_err());
        assert!("aabb.ccdd.eeff".parse::<MacAddr>().is_err());
        assert!("aa:bb:cc:dd:ee:gg".parse::<MacAddr>().is_err());
        assert!("".parse::<MacAddr>().is_err());
        assert!("+a:bb:cc:dd:ee:ff".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_constants() {
        assert_eq!(MacAddr::zero().octets(), [0u8; 6]);
        assert_eq!(MacAddr::broadcast().to_string(), "ff:ff:ff:ff:ff:ff");
    }

    #[test]
    fn test_family_names() {
        let families = [
            PacketFamily::Arp,
            PacketFamily::Ipv4,
            PacketFamily::Ipv6,
            PacketFamily::Ndp,
        ];
        let names: Vec<String> = families.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["arp", "ipv4", "ipv6", "ndp"]);
    }
}
