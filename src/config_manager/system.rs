use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// System configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    #[serde(rename = "conf_version")]
    pub conf_version: String,

    pub host: String,
    pub port: u16,

    /// Origins allowed by CORS. `"*"` keeps the layer fully permissive.
    #[serde(rename = "cors_allow_origins")]
    pub cors_allow_origins: Vec<String>,
}

impl SystemConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }

    pub fn cors_is_permissive(&self) -> bool {
        self.cors_allow_origins.is_empty() || self.cors_allow_origins.iter().any(|o| o == "*")
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            conf_version: "v1.0.0".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allow_origins: vec!["*".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_all_interfaces() {
        let config = SystemConfig::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(addr.ip().is_unspecified());
        assert!(config.cors_is_permissive());
    }

    #[test]
    fn explicit_origins_are_not_permissive() {
        let config = SystemConfig {
            cors_allow_origins: vec!["http://localhost:5173".to_string()],
            ..SystemConfig::default()
        };
        assert!(!config.cors_is_permissive());
    }

    #[test]
    fn hostname_is_rejected_as_socket_addr() {
        let config = SystemConfig {
            host: "localhost".to_string(),
            ..SystemConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
