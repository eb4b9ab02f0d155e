//! Sealbox Client
//!
//! The user-facing half of the Sealbox protocol: generates the local RSA key
//! pair, then reacts to the server's control tokens — forwarding human
//! input, encrypting outgoing messages against the recipient's key, and
//! decrypting incoming ones with the local private key.

pub mod config;
pub mod console;
pub mod error;
pub mod reactor;

pub use config::ClientConfig;
pub use console::{Console, TerminalConsole};
pub use error::{ClientError, Result};
pub use reactor::Reactor;
