use std::env;
use std::{net::IpAddr, time::Duration};

use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
};

use super::probe_config::ProbeConfig;
use crate::error::ConfigError;

pub struct AppConfig {
    pub config: ProbeConfig,
    pub config_file: String,
}

/// Load the application configuration from a YAML file and environment variables.
/// The file is taken from `CONFIG_FILE` (default `config.yml`); `DNS_HOSTS`
/// and `CATALOG_URL` override the matching file values when set.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let config_file = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yml".to_string());
    let config_str = std::fs::read_to_string(&config_file).map_err(|source| ConfigError::Read {
        path: config_file.clone(),
        source,
    })?;

    let mut config: ProbeConfig = serde_yaml::from_str(&config_str)?;
    apply_env_overrides(
        &mut config,
        env::var("DNS_HOSTS").ok(),
        env::var("CATALOG_URL").ok(),
    );
    config.validate()?;

    tracing::info!(
        config_file = %config_file,
        attempts = config.attempts,
        timeout = ?config.timeout,
        dns_hosts = ?config.dns_hosts,
        "loaded configuration"
    );

    Ok(AppConfig {
        config,
        config_file,
    })
}

fn apply_env_overrides(
    config: &mut ProbeConfig,
    dns_hosts: Option<String>,
    catalog_url: Option<String>,
) {
    if let Some(hosts) = dns_hosts {
        config.dns_hosts = hosts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(url) = catalog_url.filter(|u| !u.trim().is_empty()) {
        config.catalog_url = Some(url);
    }
}

/// Setup a DNS resolver using the provided DNS hosts.
/// Uses 2 attempts, a 100ms timeout and a 1024 entry cache for quick lookups.
/// Falls back to the system resolver configuration when no hosts are given.
pub fn setup_resolver(dns_hosts: &[String]) -> Result<TokioAsyncResolver, ConfigError> {
    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = Duration::from_millis(100);
    opts.cache_size = 1024;

    if dns_hosts.is_empty() {
        return match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => Ok(resolver),
            Err(e) => {
                tracing::warn!(error = %e, "no system resolver configuration, using defaults");
                Ok(TokioAsyncResolver::tokio(ResolverConfig::default(), opts))
            }
        };
    }

    let mut name_servers = NameServerConfigGroup::new();
    for host in dns_hosts {
        let ip: IpAddr = host.parse().map_err(|source| ConfigError::DnsHost {
            host: host.clone(),
            source,
        })?;
        name_servers.push(NameServerConfig {
            socket_addr: (ip, 53).into(),
            protocol: Protocol::Tcp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}
