//! Sealbox Core
//!
//! Shared vocabulary of the Sealbox encrypted mailbox protocol: the
//! from-scratch RSA engine, the key-string codec, the control tokens and
//! command grammar of the line protocol, and the message wire format.
//!
//! The cryptography here is deliberately textbook: unpadded RSA over a
//! base64-of-decimal key encoding, with a Fermat base-2 primality walk. It
//! is not a hardened cryptosystem; hardening it (OAEP padding, Miller-Rabin)
//! would change the observable capacity and ciphertext semantics.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod error;
pub mod keys;
pub mod message;
pub mod protocol;
pub mod rsa;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use error::{Result, SealboxError};
pub use keys::KeyPair;
pub use message::Message;
pub use protocol::{Command, CommandError, ControlToken};
