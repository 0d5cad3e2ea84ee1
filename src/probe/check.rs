use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tokio::net::TcpStream;
use trust_dns_resolver::TokioAsyncResolver;

use super::target::Target;
use crate::error::CheckError;

/// Default TCP port probed when the address carries none.
pub const DEFAULT_PORT: u16 = 80;

/// Answer of a completed reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// A single reachability test against an address.
///
/// Implementations do not need to bound their own latency, the prober wraps
/// every call in its per-attempt timeout.
#[async_trait]
pub trait ReachabilityCheck: Send + Sync + 'static {
    async fn check(&self, address: &str) -> Result<Reachability, CheckError>;
}

/// Reachability over a TCP connect.
///
/// Hostnames are resolved through the given resolver; IP literals skip DNS.
/// A refused connection proves the host answered, so it counts as reachable
/// unless `refused_is_reachable` is turned off.
#[derive(Clone)]
pub struct TcpCheck {
    resolver: TokioAsyncResolver,
    default_port: u16,
    refused_is_reachable: bool,
}

impl TcpCheck {
    pub fn new(resolver: TokioAsyncResolver) -> Self {
        Self {
            resolver,
            default_port: DEFAULT_PORT,
            refused_is_reachable: true,
        }
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    pub fn with_refused_is_reachable(mut self, refused_is_reachable: bool) -> Self {
        self.refused_is_reachable = refused_is_reachable;
        self
    }

    async fn resolve(&self, address: &str, target: &Target) -> Result<IpAddr, CheckError> {
        if let Some(ip) = target.ip() {
            return Ok(ip);
        }

        let lookup = self
            .resolver
            .lookup_ip(target.host.as_str())
            .await
            .map_err(|e| CheckError::resolution(address, e))?;

        lookup
            .iter()
            .next()
            .ok_or_else(|| CheckError::resolution(address, "no addresses returned"))
    }

    fn classify(&self, address: &str, err: std::io::Error) -> Result<Reachability, CheckError> {
        match err.kind() {
            ErrorKind::ConnectionRefused if self.refused_is_reachable => {
                Ok(Reachability::Reachable)
            }
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
            | ErrorKind::TimedOut => Ok(Reachability::Unreachable),
            _ => Err(CheckError::Connection {
                address: address.to_string(),
                source: err,
            }),
        }
    }
}

impl std::fmt::Debug for TcpCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpCheck")
            .field("default_port", &self.default_port)
            .field("refused_is_reachable", &self.refused_is_reachable)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReachabilityCheck for TcpCheck {
    async fn check(&self, address: &str) -> Result<Reachability, CheckError> {
        let target = Target::parse(address)?;
        let ip = self.resolve(address, &target).await?;
        let socket_addr = SocketAddr::new(ip, target.port_or(self.default_port));

        match TcpStream::connect(socket_addr).await {
            Ok(_stream) => Ok(Reachability::Reachable),
            Err(e) => self.classify(address, e),
        }
    }
}
