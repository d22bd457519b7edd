//! Network interfaces and the transmit boundary

use crate::{Error, MacAddr, Result};
use ipnetwork::IpNetwork;
use pnet_datalink::{self, Channel, NetworkInterface};
use std::fmt;
use std::io;
use tracing::debug;

/// Emits an encoded frame on a named interface.
pub trait Transmitter {
    fn transmit(&self, iface: &str, frame: &[u8]) -> Result<()>;
}

/// Transmitter backed by a raw `pnet_datalink` Ethernet channel.
///
/// The channel is opened for a single send and dropped before `transmit`
/// returns, on the error path as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatalinkTransmitter;

impl Transmitter for DatalinkTransmitter {
    fn transmit(&self, iface: &str, frame: &[u8]) -> Result<()> {
        send_raw(&Interface::find(iface)?, frame)
    }
}

/// Network interface
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name (e.g., "eth0", "veth1")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// MAC address, if the interface has one
    pub mac_address: Option<MacAddr>,
    /// Is interface up?
    pub is_up: bool,
    /// Assigned addresses
    pub addresses: Vec<IpNetwork>,
}

impl Interface {
    fn from_pnet(iface: &NetworkInterface) -> Self {
        Self {
            name: iface.name.clone(),
            index: iface.index,
            mac_address: iface
                .mac
                .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5])),
            is_up: iface.is_up(),
            addresses: iface.ips.clone(),
        }
    }

    fn find(name: &str) -> Result<NetworkInterface> {
        pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
    }

    /// List all available interfaces
    pub fn list_all() -> Vec<Self> {
        pnet_datalink::interfaces()
            .iter()
            .map(Self::from_pnet)
            .collect()
    }
}

/// Send a raw frame, Ethernet header included, on an already resolved interface
fn send_raw(interface: &NetworkInterface, frame: &[u8]) -> Result<()> {
    let name = interface.name.as_str();
    let mut tx = match pnet_datalink::channel(interface, Default::default()) {
        Ok(Channel::Ethernet(tx, _rx)) => tx,
        Ok(_) => return Err(Error::transmission(name, "unsupported datalink channel type")),
        Err(e) => return Err(channel_error(name, e)),
    };
    debug!("Opened datalink channel on {}", name);

    tx.send_to(frame, None)
        .ok_or_else(|| Error::transmission(name, "datalink sender refused the frame"))?
        .map_err(|e| Error::transmission(name, format!("send failed: {}", e)))?;

    debug!("Wrote {} bytes on {}", frame.len(), name);
    Ok(())
}

fn channel_error(iface: &str, err: io::Error) -> Error {
    let reason = match err.kind() {
        io::ErrorKind::PermissionDenied => {
            format!("permission denied opening raw socket ({})", err)
        }
        _ => format!("failed to open datalink channel: {}", err),
    };
    Error::transmission(iface, reason)
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (index {})", self.name, self.index)?;
        match self.mac_address {
            Some(mac) => write!(f, " {}", mac)?,
            None => write!(f, " no-mac")?,
        }
        write!(f, " {}", if self.is_up { "UP" } else { "DOWN" })?;
        for addr in &self.addresses {
            write!(f, " {}", addr)?;
        }
        Ok(())
    }
}
