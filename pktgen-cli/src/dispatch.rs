//! Command dispatch
//!
//! A [`Dispatcher`] runs one linear pipeline per invocation:
//!
//! ```text
//! resolve -> build -> encode -> summary -> transmit (unless dry-run) -> confirm
//! ```
//!
//! A dry run replaces the send with a hex dump of the encoded frame.
//!
//! The summary always reaches the output before the transmitter is called.

use crate::args::Cli;
use pktgen_core::{DatalinkTransmitter, Error, Interface, Transmitter};
use pktgen_packet::{Codec, PnetCodec};
use pktgen_protocols::{PacketRequest, StackBuilder};
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;
use tracing::info;

/// Pipeline step a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Build,
    Encode,
    Transmit,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::Build => "build",
            Stage::Encode => "encode",
            Stage::Transmit => "transmit",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct DispatchError {
    pub stage: Stage,
    pub source: Error,
}

impl DispatchError {
    fn at(stage: Stage) -> impl FnOnce(Error) -> Self {
        move |source| Self { stage, source }
    }

    fn report(err: io::Error) -> Self {
        Self {
            stage: Stage::Report,
            source: Error::Io(err),
        }
    }
}

/// Where and whether to send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    pub iface: Option<String>,
    pub dry_run: bool,
}

pub struct Dispatcher<C, T> {
    codec: C,
    transmitter: T,
}

impl<C: Codec, T: Transmitter> Dispatcher<C, T> {
    pub fn new(codec: C, transmitter: T) -> Self {
        Self { codec, transmitter }
    }

    pub fn dispatch<W: Write>(
        &self,
        request: &PacketRequest,
        options: &DispatchOptions,
        out: &mut W,
    ) -> Result<(), DispatchError> {
        let resolved = request.resolve().map_err(DispatchError::at(Stage::Resolve))?;

        // fail before building anything if there is nowhere to send
        let target = match (&options.iface, options.dry_run) {
            (_, true) => None,
            (Some(iface), false) => Some(iface.as_str()),
            (None, false) => {
                return Err(DispatchError {
                    stage: Stage::Resolve,
                    source: Error::NoInterface,
                })
            }
        };

        let stack = StackBuilder::build(resolved).map_err(DispatchError::at(Stage::Build))?;
        let frame = self
            .codec
            .encode(&stack)
            .map_err(DispatchError::at(Stage::Encode))?;

        if let Some(iface) = target {
            let family = request.family().name().to_uppercase();
            writeln!(out, "[*] Sending {} packet on {}...", family, iface)
                .map_err(DispatchError::report)?;
        }
        write!(out, "{}", stack).map_err(DispatchError::report)?;
        writeln!(out, "[*] Frame length: {} bytes", frame.len()).map_err(DispatchError::report)?;

        match target {
            Some(iface) => {
                out.flush().map_err(DispatchError::report)?;
                self.transmitter
                    .transmit(iface, &frame)
                    .map_err(DispatchError::at(Stage::Transmit))?;
                info!("Sent {} byte {} frame on {}", frame.len(), request.family(), iface);
                writeln!(out, "[+] Packet sent.").map_err(DispatchError::report)?;
            }
            None => {
                write_hex_dump(out, &frame).map_err(DispatchError::report)?;
                writeln!(out, "[*] Raw hex: {}", hex::encode(&frame))
                    .map_err(DispatchError::report)?;
                writeln!(out, "[*] Dry run, nothing sent.").map_err(DispatchError::report)?;
            }
        }

        Ok(())
    }
}

/// 16 bytes per row: offset, hex octets, printable ASCII
pub fn write_hex_dump<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    for (row, chunk) in data.chunks(16).enumerate() {
        let encoded = hex::encode(chunk);
        let octets: Vec<&str> = (0..encoded.len())
            .step_by(2)
            .map(|i| &encoded[i..i + 2])
            .collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        writeln!(out, "{:04x}  {:<48} {}", row * 16, octets.join(" "), ascii)?;
    }
    Ok(())
}

fn list_interfaces<W: Write>(out: &mut W) -> Result<(), DispatchError> {
    let interfaces = Interface::list_all();
    if interfaces.is_empty() {
        writeln!(out, "[-] No interfaces found").map_err(DispatchError::report)?;
    }
    for iface in interfaces {
        writeln!(out, "{}", iface).map_err(DispatchError::report)?;
    }
    Ok(())
}

/// Run the parsed command line against the real codec and datalink.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), DispatchError> {
    match cli.request() {
        Some(request) => {
            let options = DispatchOptions {
                iface: cli.iface.clone(),
                dry_run: cli.dry_run,
            };
            Dispatcher::new(PnetCodec, DatalinkTransmitter).dispatch(&request, &options, out)
        }
        None => list_interfaces(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use clap::Parser;
    use pktgen_core::{ErrorKind, Result};
    use pktgen_packet::PacketStack;
    use pktgen_protocols::fields::{DEFAULT_DST_MAC, DEFAULT_SRC_MAC};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingTransmitter {
        sent: RefCell<Vec<(String, Vec<u8>)>>,
    }

    impl Transmitter for RecordingTransmitter {
        fn transmit(&self, iface: &str, frame: &[u8]) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((iface.to_string(), frame.to_vec()));
            Ok(())
        }
    }

    struct FailingTransmitter;

    impl Transmitter for FailingTransmitter {
        fn transmit(&self, iface: &str, _frame: &[u8]) -> Result<()> {
            Err(Error::transmission(iface, "permission denied opening raw socket"))
        }
    }

    struct FailingCodec;

    impl Codec for FailingCodec {
        fn encode(&self, _stack: &PacketStack) -> Result<Bytes> {
            Err(Error::encoding("buffer too short for IPv4 header"))
        }
    }

    // Link addresses are passed explicitly so PKTGEN_* variables in the
    // environment cannot leak into the frames under test.
    fn cli(args: &[&str]) -> (PacketRequest, DispatchOptions) {
        let mut args = args.to_vec();
        args.extend(["--src-mac", DEFAULT_SRC_MAC, "--dst-mac", DEFAULT_DST_MAC]);
        let cli = Cli::try_parse_from(args).unwrap();
        let options = DispatchOptions {
            iface: cli.iface.clone(),
            dry_run: cli.dry_run,
        };
        (cli.request().unwrap(), options)
    }

    fn dispatch<T: Transmitter>(
        transmitter: T,
        args: &[&str],
    ) -> (std::result::Result<(), DispatchError>, String, T) {
        let (request, options) = cli(args);
        let dispatcher = Dispatcher::new(PnetCodec, transmitter);
        let mut out = Vec::new();
        let result = dispatcher.dispatch(&request, &options, &mut out);
        (
            result,
            String::from_utf8(out).unwrap(),
            dispatcher.transmitter,
        )
    }

    #[test]
    fn test_ipv4_tcp_is_sent() {
        let (result, out, tx) = dispatch(
            RecordingTransmitter::default(),
            &[
                "pktgen", "--iface", "veth1", "ipv4", "--src-ip", "10.128.0.1", "--dst-ip",
                "192.168.1.1", "--ttl", "32", "--proto", "tcp", "--dport", "443",
            ],
        );
        result.unwrap();

        assert!(out.starts_with("[*] Sending IPV4 packet on veth1...\n"));
        assert!(out.contains("###[ IPv4 ]###"));
        assert!(out.contains("ttl        = 32"));
        assert!(out.contains("[*] Frame length: 54 bytes"));
        assert!(out.ends_with("[+] Packet sent.\n"));

        let sent = tx.sent.borrow();
        assert_eq!(sent.len(), 1);
        let (iface, frame) = &sent[0];
        assert_eq!(iface, "veth1");
        assert_eq!(frame.len(), 54);
        assert_eq!(frame[22], 32);
        assert_eq!(u16::from_be_bytes([frame[36], frame[37]]), 443);
    }

    #[test]
    fn test_arp_who_has_frame() {
        let (result, _, tx) = dispatch(
            RecordingTransmitter::default(),
            &[
                "pktgen", "arp", "--op", "who-has", "--src-ip", "10.0.0.1", "--dst-ip",
                "10.0.0.2", "-I", "veth1",
            ],
        );
        result.unwrap();

        let sent = tx.sent.borrow();
        let frame = &sent[0].1;
        assert_eq!(u16::from_be_bytes([frame[20], frame[21]]), 1);
        assert_eq!(&frame[32..38], &[0u8; 6]);
    }

    #[test]
    fn test_ndp_hlim_flag_has_no_effect() {
        let (result, out, tx) = dispatch(
            RecordingTransmitter::default(),
            &[
                "pktgen", "ndp", "--op", "na", "--src-ip", "fe80::1", "--dst-ip", "fe80::2",
                "--target-ip", "fe80::1", "--hlim", "7", "--iface", "veth1",
            ],
        );
        result.unwrap();
        assert!(out.contains("R=0 S=1 O=1"));

        let sent = tx.sent.borrow();
        let frame = &sent[0].1;
        assert_eq!(frame[21], 255);
        // Target Link-Layer Address option holds the default source MAC
        assert_eq!(frame[78], 2);
        assert_eq!(&frame[80..86], &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn test_dry_run_never_transmits() {
        let (result, out, tx) = dispatch(
            RecordingTransmitter::default(),
            &[
                "pktgen", "--dry-run", "ipv6", "--src-ip", "2001:db8::1", "--dst-ip",
                "2001:db8::2", "--proto", "udp",
            ],
        );
        result.unwrap();

        assert!(tx.sent.borrow().is_empty());
        assert!(out.contains("###[ UDP ]###"));
        assert!(out.contains("0000  ff ff ff ff ff ff aa bb cc dd ee ff 86 dd"));
        assert!(out.contains("[*] Raw hex: ffffffffffffaabbccddeeff86dd6"));
        assert!(!out.contains("[*] Sending"));
        assert!(!out.contains("[+] Packet sent."));
    }

    #[test]
    fn test_transmit_failure_reports_stage_after_summary() {
        let (result, out, _) = dispatch(
            FailingTransmitter,
            &[
                "pktgen", "arp", "--src-ip", "10.0.0.1", "--dst-ip", "10.0.0.2", "--iface",
                "veth1",
            ],
        );
        let err = result.unwrap_err();

        assert_eq!(err.stage, Stage::Transmit);
        assert_eq!(err.source.kind(), ErrorKind::Transmission);
        assert!(err.to_string().starts_with("transmit failed:"));
        assert!(out.contains("###[ ARP ]###"));
        assert!(!out.contains("[+] Packet sent."));
    }

    #[test]
    fn test_malformed_ip_fails_before_anything_is_sent() {
        let (result, out, tx) = dispatch(
            RecordingTransmitter::default(),
            &[
                "pktgen", "ipv4", "--src-ip", "10.0.0", "--dst-ip", "10.0.0.2", "--iface",
                "veth1",
            ],
        );
        let err = result.unwrap_err();

        assert_eq!(err.stage, Stage::Resolve);
        assert_eq!(err.source.field(), Some("src-ip"));
        assert!(err.to_string().contains("10.0.0"));
        assert!(out.is_empty());
        assert!(tx.sent.borrow().is_empty());
    }

    #[test]
    fn test_icmp_over_ipv6_is_a_validation_error() {
        let (result, _, _) = dispatch(
            RecordingTransmitter::default(),
            &[
                "pktgen", "-n", "ipv6", "--src-ip", "::1", "--dst-ip", "::2", "--proto", "icmp",
            ],
        );
        let err = result.unwrap_err();
        assert_eq!(err.stage, Stage::Resolve);
        assert_eq!(err.source.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_missing_iface_without_dry_run() {
        let (request, _) = cli(&["pktgen", "arp", "--src-ip", "10.0.0.1", "--dst-ip", "10.0.0.2"]);
        let options = DispatchOptions {
            iface: None,
            dry_run: false,
        };
        let dispatcher = Dispatcher::new(PnetCodec, RecordingTransmitter::default());
        let mut out = Vec::new();

        let err = dispatcher.dispatch(&request, &options, &mut out).unwrap_err();
        assert_eq!(err.stage, Stage::Resolve);
        assert!(matches!(err.source, Error::NoInterface));
        assert_eq!(err.source.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("--dry-run"));
        assert!(out.is_empty());
        assert!(dispatcher.transmitter.sent.borrow().is_empty());
    }

    #[test]
    fn test_encoding_failure_reports_stage_before_summary() {
        let (request, options) = cli(&[
            "pktgen", "ipv4", "--src-ip", "10.0.0.1", "--dst-ip", "10.0.0.2", "--iface",
            "veth1",
        ]);
        let dispatcher = Dispatcher::new(FailingCodec, RecordingTransmitter::default());
        let mut out = Vec::new();

        let err = dispatcher.dispatch(&request, &options, &mut out).unwrap_err();
        assert_eq!(err.stage, Stage::Encode);
        assert_eq!(err.source.kind(), ErrorKind::Encoding);
        assert_eq!(
            err.to_string(),
            "encode failed: Packet encoding error: buffer too short for IPv4 header"
        );
        assert!(out.is_empty());
        assert!(dispatcher.transmitter.sent.borrow().is_empty());
    }

    #[test]
    fn test_hex_dump_layout() {
        let mut out = Vec::new();
        write_hex_dump(&mut out, b"ABCDEFGHIJKLMNOPQ").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000  41 42 43"));
        assert!(lines[0].ends_with(" ABCDEFGHIJKLMNOP"));
        assert_eq!(lines[0].len(), 6 + 48 + 1 + 16);
        assert!(lines[1].starts_with("0010  51 "));
        assert!(lines[1].ends_with(" Q"));
        assert_eq!(lines[1].len(), lines[0].len() - 15);
    }
}
