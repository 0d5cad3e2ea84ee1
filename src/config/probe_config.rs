use std::time::Duration;

use serde::Deserialize;

use crate::catalog::HostItem;
use crate::error::ConfigError;
use crate::probe::check::DEFAULT_PORT;
use crate::probe::probe::{DEFAULT_ATTEMPTS, DEFAULT_TIMEOUT, ProbeSettings};

/// The probe configuration file.
/// Describes how many attempts to make per host, how long each may take and
/// which hosts to probe.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Attempts per host. Defaults to 5.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Bound on a single attempt, e.g. `500ms` or `1s`. Defaults to 1s.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// TCP port used for addresses without one. Defaults to 80.
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Whether a refused TCP connection counts as the host answering.
    #[serde(default = "default_refused_is_reachable")]
    pub refused_is_reachable: bool,

    /// Time between fleet probes. The fleet is probed once when absent.
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,

    /// Name servers to resolve hostnames with. The system configuration is
    /// used when empty.
    #[serde(default)]
    pub dns_hosts: Vec<String>,

    /// Base url of a host catalog serving `sk_hosts`.
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Statically configured hosts, probed after the catalog hosts.
    #[serde(default)]
    pub targets: Vec<HostItem>,
}

fn default_attempts() -> u32 {
    DEFAULT_ATTEMPTS
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_refused_is_reachable() -> bool {
    true
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings()?;
        if let Some(interval) = self.interval.filter(Duration::is_zero) {
            return Err(ConfigError::ZeroInterval(interval));
        }
        if self.targets.is_empty() && self.catalog_url.is_none() {
            return Err(ConfigError::NoTargets);
        }
        Ok(())
    }

    pub fn settings(&self) -> Result<ProbeSettings, ConfigError> {
        Ok(ProbeSettings::new(self.attempts, self.timeout)?)
    }
}
