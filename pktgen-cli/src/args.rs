//! CLI argument parsing
//!
//! One subcommand per packet family plus `interfaces`. The link-layer and
//! output flags are global and may appear before or after the subcommand.

use clap::{Args, Parser, Subcommand};
use pktgen_protocols::fields::{DEFAULT_DST_MAC, DEFAULT_SRC_MAC};
use pktgen_protocols::{
    ArpParams, FamilyParams, Ipv4Params, Ipv6Params, LinkParams, NdpParams, PacketRequest,
};

#[derive(Parser, Debug)]
#[command(name = "pktgen")]
#[command(version, about = "Craft and inject ARP, IPv4, IPv6 and NDP frames", long_about = None)]
pub struct Cli {
    /// Network interface to send on
    #[arg(short = 'I', long, global = true, env = "PKTGEN_IFACE", value_name = "IF")]
    pub iface: Option<String>,

    /// Ethernet source MAC
    #[arg(long, global = true, env = "PKTGEN_SRC_MAC", value_name = "MAC", default_value = DEFAULT_SRC_MAC)]
    pub src_mac: String,

    /// Ethernet destination MAC
    #[arg(long, global = true, env = "PKTGEN_DST_MAC", value_name = "MAC", default_value = DEFAULT_DST_MAC)]
    pub dst_mac: String,

    /// Print the frame and a hex dump instead of sending it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ethernet / ARP
    Arp(ArpArgs),

    /// Ethernet / IPv4 / {TCP, UDP, ICMP echo}
    Ipv4(Ipv4Args),

    /// Ethernet / IPv6 / {TCP, UDP}
    Ipv6(Ipv6Args),

    /// Ethernet / IPv6 / ICMPv6 Neighbor Solicitation or Advertisement
    Ndp(NdpArgs),

    /// List available network interfaces
    Interfaces,
}

#[derive(Args, Debug)]
pub struct ArpArgs {
    /// who-has (request) or is-at (reply, default)
    #[arg(long, value_name = "OP")]
    pub op: Option<String>,

    /// Sender IPv4 address
    #[arg(long, value_name = "ADDR")]
    pub src_ip: Option<String>,

    /// Target IPv4 address
    #[arg(long, value_name = "ADDR")]
    pub dst_ip: Option<String>,

    /// Target hardware address (default: zero for who-has, --dst-mac for is-at)
    #[arg(long, value_name = "MAC")]
    pub target_mac: Option<String>,
}

#[derive(Args, Debug)]
pub struct Ipv4Args {
    #[arg(long, value_name = "ADDR")]
    pub src_ip: Option<String>,

    #[arg(long, value_name = "ADDR")]
    pub dst_ip: Option<String>,

    /// Time to live [default: 64]
    #[arg(long)]
    pub ttl: Option<u8>,

    /// tcp, udp or icmp [default: tcp]
    #[arg(long, value_name = "PROTO")]
    pub proto: Option<String>,

    /// Source port [default: 12345]
    #[arg(long)]
    pub sport: Option<u16>,

    /// Destination port [default: 80]
    #[arg(long)]
    pub dport: Option<u16>,
}

#[derive(Args, Debug)]
pub struct Ipv6Args {
    #[arg(long, value_name = "ADDR")]
    pub src_ip: Option<String>,

    #[arg(long, value_name = "ADDR")]
    pub dst_ip: Option<String>,

    /// Hop limit [default: 64]
    #[arg(long)]
    pub hlim: Option<u8>,

    /// tcp or udp [default: tcp]
    #[arg(long, value_name = "PROTO")]
    pub proto: Option<String>,

    /// Source port [default: 12345]
    #[arg(long)]
    pub sport: Option<u16>,

    /// Destination port [default: 80]
    #[arg(long)]
    pub dport: Option<u16>,
}

#[derive(Args, Debug)]
pub struct NdpArgs {
    /// ns (default) or na
    #[arg(long, value_name = "OP")]
    pub op: Option<String>,

    #[arg(long, value_name = "ADDR")]
    pub src_ip: Option<String>,

    #[arg(long, value_name = "ADDR")]
    pub dst_ip: Option<String>,

    /// Address being solicited or advertised
    #[arg(long, value_name = "ADDR")]
    pub target_ip: Option<String>,

    /// Ignored: neighbor discovery always uses hop limit 255
    #[arg(long)]
    pub hlim: Option<u8>,

    /// Set the Router flag (na only)
    #[arg(long)]
    pub router: bool,

    /// Clear the Solicited flag (na only)
    #[arg(long)]
    pub no_solicited: bool,

    /// Clear the Override flag (na only)
    #[arg(long)]
    pub no_override: bool,
}

impl From<&ArpArgs> for ArpParams {
    fn from(args: &ArpArgs) -> Self {
        Self {
            op: args.op.clone(),
            src_ip: args.src_ip.clone(),
            dst_ip: args.dst_ip.clone(),
            target_mac: args.target_mac.clone(),
        }
    }
}

impl From<&Ipv4Args> for Ipv4Params {
    fn from(args: &Ipv4Args) -> Self {
        Self {
            src_ip: args.src_ip.clone(),
            dst_ip: args.dst_ip.clone(),
            ttl: args.ttl,
            proto: args.proto.clone(),
            sport: args.sport,
            dport: args.dport,
        }
    }
}

impl From<&Ipv6Args> for Ipv6Params {
    fn from(args: &Ipv6Args) -> Self {
        Self {
            src_ip: args.src_ip.clone(),
            dst_ip: args.dst_ip.clone(),
            hlim: args.hlim,
            proto: args.proto.clone(),
            sport: args.sport,
            dport: args.dport,
        }
    }
}

impl From<&NdpArgs> for NdpParams {
    fn from(args: &NdpArgs) -> Self {
        Self {
            op: args.op.clone(),
            src_ip: args.src_ip.clone(),
            dst_ip: args.dst_ip.clone(),
            target_ip: args.target_ip.clone(),
            hlim: args.hlim,
            router: args.router.then_some(true),
            solicited: args.no_solicited.then_some(false),
            override_: args.no_override.then_some(false),
        }
    }
}

impl Commands {
    /// Family parameters, or `None` for commands that build no packet
    pub fn family_params(&self) -> Option<FamilyParams> {
        match self {
            Commands::Arp(args) => Some(FamilyParams::Arp(args.into())),
            Commands::Ipv4(args) => Some(FamilyParams::Ipv4(args.into())),
            Commands::Ipv6(args) => Some(FamilyParams::Ipv6(args.into())),
            Commands::Ndp(args) => Some(FamilyParams::Ndp(args.into())),
            Commands::Interfaces => None,
        }
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn link(&self) -> LinkParams {
        LinkParams::new(self.src_mac.clone(), self.dst_mac.clone())
    }

    /// The packet this invocation asks for, if any
    pub fn request(&self) -> Option<PacketRequest> {
        self.command
            .family_params()
            .map(|params| PacketRequest::new(self.link(), params))
    }
}
