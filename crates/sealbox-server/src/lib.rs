//! Sealbox Server
//!
//! The routing half of the Sealbox encrypted mailbox service: a mailbox
//! registry shared by all sessions, a per-connection session state machine,
//! and a dispatcher that accepts TCP connections and spawns one session task
//! per client. The server only ever sees ciphertext; plaintext stays on the
//! clients.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod session;

pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use error::{Result, ServerError};
pub use registry::MailboxRegistry;
pub use session::Session;
