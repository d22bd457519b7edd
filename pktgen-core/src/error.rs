//! Error types for pktgen
//!
//! Every failure belongs to one of three classes (see [`ErrorKind`]):
//! validation of user input, encoding of a header stack, and transmission
//! on an interface. None of them is retried.

use crate::PacketFamily;
use thiserror::Error;

/// Result type alias for pktgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pktgen
#[derive(Error, Debug)]
pub enum Error {
    /// A supplied field did not parse or has the wrong shape
    #[error("Invalid {family} field '{field}' = '{value}': {reason}")]
    InvalidField {
        family: PacketFamily,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A field the family requires was not supplied
    #[error("Missing required {family} field '{field}'")]
    MissingField {
        family: PacketFamily,
        field: &'static str,
    },

    /// The family has no rule for the requested combination
    #[error("Unsupported {family} combination: {detail}")]
    Unsupported {
        family: PacketFamily,
        detail: String,
    },

    /// A send was requested without naming an interface
    #[error("No --iface given (use --dry-run to skip sending)")]
    NoInterface,

    /// A header stack broke one of its layering invariants
    #[error("Malformed packet stack: {0}")]
    MalformedStack(String),

    /// The codec could not serialize the stack
    #[error("Packet encoding error: {0}")]
    Encoding(String),

    /// A frame could not be decoded back into headers
    #[error("Packet parsing error: {0}")]
    PacketParsing(String),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// The datalink layer refused or failed the send
    #[error("Transmission error on '{iface}': {reason}")]
    Transmission { iface: String, reason: String },

    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input; no packet was built
    Validation,
    /// The stack could not be serialized
    Encoding,
    /// The frame could not be put on the wire
    Transmission,
}

impl Error {
    /// Create an invalid field error
    pub fn invalid_field<V: Into<String>, R: Into<String>>(
        family: PacketFamily,
        field: &'static str,
        value: V,
        reason: R,
    ) -> Self {
        Error::InvalidField {
            family,
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(family: PacketFamily, field: &'static str) -> Self {
        Error::MissingField { family, field }
    }

    /// Create an unsupported combination error
    pub fn unsupported<S: Into<String>>(family: PacketFamily, detail: S) -> Self {
        Error::Unsupported {
            family,
            detail: detail.into(),
        }
    }

    /// Create a malformed stack error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedStack(msg.into())
    }

    /// Create an encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Error::Encoding(msg.into())
    }

    /// Create a transmission error
    pub fn transmission<I: Into<String>, R: Into<String>>(iface: I, reason: R) -> Self {
        Error::Transmission {
            iface: iface.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidField { .. }
            | Error::MissingField { .. }
            | Error::Unsupported { .. }
            | Error::NoInterface => ErrorKind::Validation,
            Error::MalformedStack(_) | Error::Encoding(_) | Error::PacketParsing(_) => {
                ErrorKind::Encoding
            }
            Error::InterfaceNotFound(_) | Error::Transmission { .. } | Error::Io(_) => {
                ErrorKind::Transmission
            }
        }
    }

    /// Name of the offending field, for validation errors that have one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::InvalidField { field, .. } | Error::MissingField { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_message_names_everything() {
        let err = Error::invalid_field(PacketFamily::Ipv4, "src-ip", "10.0.0", "not an address");
        let msg = err.to_string();
        assert!(msg.contains("ipv4"));
        assert!(msg.contains("src-ip"));
        assert!(msg.contains("10.0.0"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("src-ip"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::missing_field(PacketFamily::Ndp, "target-ip").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::unsupported(PacketFamily::Ipv6, "icmp").kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::NoInterface.kind(), ErrorKind::Validation);
        assert_eq!(Error::malformed("empty").kind(), ErrorKind::Encoding);
        assert_eq!(Error::encoding("short buffer").kind(), ErrorKind::Encoding);
        assert_eq!(
            Error::InterfaceNotFound("veth9".into()).kind(),
            ErrorKind::Transmission
        );
        assert_eq!(
            Error::transmission("veth1", "link down").kind(),
            ErrorKind::Transmission
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from(io).kind(), ErrorKind::Transmission);
    }

    #[test]
    fn test_field_absent_for_other_errors() {
        assert_eq!(Error::encoding("x").field(), None);
        assert_eq!(Error::unsupported(PacketFamily::Ipv6, "icmp").field(), None);
        assert_eq!(Error::NoInterface.field(), None);
    }
}
