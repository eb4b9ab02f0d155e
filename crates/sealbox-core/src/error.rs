//! Error types for the Sealbox core protocol.

/// Core error type shared by the RSA engine and the key/wire codecs.
#[derive(Debug, thiserror::Error)]
pub enum SealboxError {
    /// The OS random source could not produce bytes. Fatal to the party
    /// generating keys.
    #[error("random number generation failed: {0}")]
    RandomUnavailable(#[from] rand::Error),

    /// The plaintext, read as a big-endian integer, is `>= modulus - 1`.
    /// Callers are expected to pre-check against [`crate::rsa::max_plaintext_chars`].
    #[error("message too long for the key modulus")]
    MessageTooLong,

    /// A key string did not decode as `base64(exponent)-base64(modulus)`.
    #[error("malformed key string: {0}")]
    InvalidKey(String),

    /// A ciphertext did not decode as base64 over a decimal integer.
    #[error("malformed ciphertext: {0}")]
    InvalidCiphertext(String),

    /// The public exponent has no inverse modulo the totient. The Fermat
    /// walk makes this vanishingly rare; a caller may simply regenerate.
    #[error("public exponent is not invertible modulo the totient")]
    ExponentNotInvertible,

    /// Decryption produced bytes that are not valid UTF-8, which means the
    /// ciphertext was not produced for this key.
    #[error("decrypted bytes are not valid UTF-8")]
    InvalidPlaintext(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, SealboxError>;
