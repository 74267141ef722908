use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use super::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server bind address: an IP literal or a resolvable hostname
    pub host: String,

    /// Server port
    pub port: u16,

    /// Request timeout in seconds; 0 disables the timeout
    pub timeout_secs: u64,

    /// Allow cross-origin requests from any origin
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            timeout_secs: 0,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Resolves the socket address to bind to, taking the first result for
    /// a hostname.
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let invalid = |reason: String| {
            let addr = format!("{}:{}", self.host, self.port);
            ServerError::Config(format!("Invalid address '{}': {}", addr, reason))
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses found".to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert!(cfg.enable_cors);
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_hostname_is_resolved() {
        let cfg = ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        let addr = cfg.socket_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_invalid_host() {
        let cfg = ServerConfig {
            host: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(cfg.socket_addr(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_timeout() {
        let cfg = ServerConfig {
            timeout_secs: 30,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(30)));
    }
}
