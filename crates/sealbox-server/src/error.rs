//! Error handling for the Sealbox server.

use thiserror::Error;

/// Server-side error type. Connectivity failures are fatal to the affected
/// session only; the dispatcher logs them and keeps accepting.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("sealbox core error: {0}")]
    Core(#[from] sealbox_core::SealboxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
