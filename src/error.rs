use std::time::Duration;

use thiserror::Error;

/// Errors raised by a single reachability check.
///
/// Either variant stops the probe loop for that host, as does a negative
/// answer. Timeouts are not errors; they are ordinary failed attempts.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The address could not be parsed or resolved to an IP.
    #[error("failed to resolve {address}: {reason}")]
    Resolution { address: String, reason: String },

    /// The connection attempt failed for a reason other than a negative answer.
    #[error("connection error for {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    pub fn resolution(address: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolution {
            address: address.into(),
            reason: reason.to_string(),
        }
    }
}

/// Invalid probe settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("per-attempt timeout must be greater than zero")]
    ZeroTimeout,
}

/// Errors surfaced by a fleet probe.
///
/// Per-host failures never show up here, they are folded into that host's stats.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FleetError {
    #[error("fleet probe cancelled")]
    Cancelled,
}

/// Errors while fetching the host catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors while loading the application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid DNS host {host:?}: {source}")]
    DnsHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("polling interval must be greater than zero, got {0:?}")]
    ZeroInterval(Duration),

    #[error("no targets configured and no catalog url set")]
    NoTargets,
}

/// Render an error and its chain of sources on one line each.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    use std::fmt::Write;

    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}
