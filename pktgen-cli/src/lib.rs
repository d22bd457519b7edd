//! CLI interface for pktgen
//!
//! This crate provides the `pktgen` command line: argument parsing, logging
//! setup and the dispatcher that resolves, builds, encodes and sends one
//! frame per invocation.

pub mod args;
pub mod dispatch;
pub mod logging;

pub use args::{Cli, Commands};
pub use dispatch::{run, DispatchError, DispatchOptions, Dispatcher, Stage};
