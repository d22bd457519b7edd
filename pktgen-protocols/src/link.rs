//! Link-layer (Ethernet) parameters

use crate::fields::{parse_mac, DEFAULT_DST_MAC, DEFAULT_SRC_MAC};
use pktgen_core::{PacketFamily, Result};
use pktgen_packet::layer::EthernetHeader;

/// Raw Ethernet addressing shared by every family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParams {
    pub src_mac: String,
    pub dst_mac: String,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            src_mac: DEFAULT_SRC_MAC.to_string(),
            dst_mac: DEFAULT_DST_MAC.to_string(),
        }
    }
}

impl LinkParams {
    pub fn new<S: Into<String>, D: Into<String>>(src_mac: S, dst_mac: D) -> Self {
        Self {
            src_mac: src_mac.into(),
            dst_mac: dst_mac.into(),
        }
    }

    /// Parse both MACs; errors are reported against `family`
    pub fn resolve(&self, family: PacketFamily) -> Result<EthernetHeader> {
        Ok(EthernetHeader {
            src: parse_mac(family, "src-mac", &self.src_mac)?,
            dst: parse_mac(family, "dst-mac", &self.dst_mac)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktgen_core::MacAddr;

    #[test]
    fn test_default_link() {
        let eth = LinkParams::default().resolve(PacketFamily::Ipv4).unwrap();
        assert_eq!(eth.src.to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(eth.dst, MacAddr::broadcast());
    }

    #[test]
    fn test_bad_dst_mac_names_field() {
        let err = LinkParams::new("aa:bb:cc:dd:ee:ff", "11:22:33")
            .resolve(PacketFamily::Arp)
            .unwrap_err();
        assert_eq!(err.field(), Some("dst-mac"));
        assert!(err.to_string().contains("11:22:33"));
    }
}
