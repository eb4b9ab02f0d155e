//! Server configuration: a small TOML file with CLI overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 65535;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_everywhere() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:65535");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ServerConfig = toml::from_str("port = 4444").unwrap();
        assert_eq!(config.port, 4444);
        assert_eq!(config.bind_addr, "0.0.0.0");
    }
}
