//! Tracing subscriber setup for hosts of the compiler.
//!
//! The library crates only emit events. A host calls [`init_tracing`] once to
//! see them:
//!
//! ```bash
//! ADL_LOG=debug my-host                      # flat text on stderr
//! ADL_LOG=adl_checker=trace ADL_LOG_FORMAT=json my-host
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Read `ADL_LOG_FORMAT`. Anything other than `json` means text.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("ADL_LOG_FORMAT").unwrap_or_default())
    }
}

/// `ADL_LOG` takes precedence over `RUST_LOG`. Both use `RUST_LOG` syntax.
fn build_filter() -> EnvFilter {
    match std::env::var("ADL_LOG") {
        Ok(value) => EnvFilter::builder().parse_lossy(value),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install a global subscriber writing to stderr.
///
/// Does nothing unless `ADL_LOG` or `RUST_LOG` is set. Returns `false` when
/// no subscriber was installed, including when another one already is.
pub fn init_tracing() -> bool {
    if std::env::var_os("ADL_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
