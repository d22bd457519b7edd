//! Logging setup
//!
//! Diagnostics go to stderr through `tracing-subscriber`; stdout is kept for
//! the packet summary. `RUST_LOG` replaces the `-v` derived filter entirely.

use tracing_subscriber::EnvFilter;

const CRATES: [&str; 5] = [
    "pktgen",
    "pktgen_cli",
    "pktgen_core",
    "pktgen_packet",
    "pktgen_protocols",
];

/// Filter directives for a `-v` count. Other crates stay at `warn`.
pub fn directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push_str(&format!(",{}={}", name, level));
    }
    directives
}

pub fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbosity)))
}

/// Install the global subscriber. Call once, before any work.
pub fn init(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert!(directives(0).contains("pktgen_protocols=warn"));
        assert!(directives(1).contains("pktgen_core=info"));
        assert!(directives(2).contains("pktgen_packet=debug"));
        assert!(directives(3).contains("pktgen=trace"));
        assert!(directives(9).contains("pktgen_cli=trace"));
    }

    #[test]
    fn test_third_party_default_stays_warn() {
        assert!(directives(3).starts_with("warn,"));
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in 0..4 {
            assert!(EnvFilter::try_new(directives(verbosity)).is_ok());
        }
    }
}
