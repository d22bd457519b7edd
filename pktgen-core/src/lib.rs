//! pktgen Core Library
//!
//! This crate provides the fundamental types, error handling and the
//! transmit boundary shared by the pktgen crates.

pub mod error;
pub mod interface;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use interface::{DatalinkTransmitter, Interface, Transmitter};
pub use types::*;
