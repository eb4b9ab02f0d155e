//! Client configuration: a small TOML file with CLI overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default server port.
pub const DEFAULT_PORT: u16 = 65535;

/// Default RSA modulus size in bits.
pub const DEFAULT_MODULUS_BITS: u64 = 2048;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host to connect to.
    pub host: String,
    pub port: u16,
    /// Size of the RSA modulus generated at startup.
    pub modulus_bits: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: DEFAULT_PORT,
            modulus_bits: DEFAULT_MODULUS_BITS,
        }
    }
}

impl ClientConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
