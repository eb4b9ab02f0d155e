//! Error handling for the Sealbox client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("sealbox core error: {0}")]
    Core(#[from] sealbox_core::SealboxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    /// The server stream ended in the middle of a multi-line exchange.
    #[error("server closed the connection mid-exchange")]
    UnexpectedEof,
}

pub type Result<T> = std::result::Result<T, ClientError>;
