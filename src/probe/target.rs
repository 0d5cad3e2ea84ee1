use std::net::{IpAddr, SocketAddr};

use url::Url;

use crate::error::CheckError;

/// A host and optional port extracted from a probe address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: Option<u16>,
}

impl Target {
    /// Parse a bare host, `host:port`, `[v6]:port`, an IP literal or a full URL.
    pub fn parse(address: &str) -> Result<Self, CheckError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CheckError::resolution(address, "empty address"));
        }

        if address.contains("://") {
            let url = Url::parse(address).map_err(|e| CheckError::resolution(address, e))?;
            let host = match url.host_str() {
                Some(host) => host.trim_start_matches('[').trim_end_matches(']'),
                None => return Err(CheckError::resolution(address, "url has no host")),
            };
            return Ok(Self {
                host: host.to_string(),
                port: url.port_or_known_default(),
            });
        }

        if let Ok(socket) = address.parse::<SocketAddr>() {
            return Ok(Self {
                host: socket.ip().to_string(),
                port: Some(socket.port()),
            });
        }

        if let Ok(ip) = address.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(Self {
                host: ip.to_string(),
                port: None,
            });
        }

        // host:port, strip a trailing path from authority-style input
        let authority = address.split('/').next().unwrap_or(address);
        match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| CheckError::resolution(address, format!("invalid port: {e}")))?;
                Ok(Self {
                    host: host.to_string(),
                    port: Some(port),
                })
            }
            None => Ok(Self {
                host: authority.to_string(),
                port: None,
            }),
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }

    pub fn port_or(&self, default_port: u16) -> u16 {
        self.port.unwrap_or(default_port)
    }
}
