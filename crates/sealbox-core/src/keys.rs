//! RSA key strings and the key-string codec.
//!
//! A key is two unsigned integers encoded independently and joined by `-`:
//!
//! ```text
//!    key = base64(decimal exponent) + "-" + base64(decimal modulus)
//! ```
//!
//! The public key carries `(e, n)`, the private key `(d, n)`. Both sides of
//! the protocol move keys around as opaque strings; only the RSA engine
//! looks inside.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::BigUint;

use crate::error::{Result, SealboxError};

// ----------------------------------------------------------------------------
// Key Pair
// ----------------------------------------------------------------------------

/// A generated RSA key pair. Immutable; the private key never leaves the
/// party that generated it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl KeyPair {
    /// Generate a fresh pair with an `modulus_bits`-bit modulus.
    ///
    /// Convenience front for [`crate::rsa::generate_key_pair`].
    pub fn generate(modulus_bits: u64) -> Result<Self> {
        crate::rsa::generate_key_pair(modulus_bits)
    }
}

// ----------------------------------------------------------------------------
// Key-String Codec
// ----------------------------------------------------------------------------

/// Compose a key string from an exponent and a modulus.
pub fn encode_key(exponent: &BigUint, modulus: &BigUint) -> String {
    format!(
        "{}-{}",
        BASE64.encode(exponent.to_string().as_bytes()),
        BASE64.encode(modulus.to_string().as_bytes())
    )
}

/// Split a key string into `(exponent, modulus)`.
pub fn decode_key(key: &str) -> Result<(BigUint, BigUint)> {
    let (exponent, modulus) = key
        .split_once('-')
        .ok_or_else(|| SealboxError::InvalidKey("missing `-` separator".into()))?;
    Ok((decode_component(exponent)?, decode_component(modulus)?))
}

/// Decode the modulus component only, for capacity checks.
pub fn decode_modulus(key: &str) -> Result<BigUint> {
    let (_, modulus) = decode_key(key)?;
    Ok(modulus)
}

fn decode_component(component: &str) -> Result<BigUint> {
    let decimal = BASE64
        .decode(component)
        .map_err(|e| SealboxError::InvalidKey(format!("bad base64: {e}")))?;
    let decimal = String::from_utf8(decimal)
        .map_err(|_| SealboxError::InvalidKey("component is not UTF-8".into()))?;
    decimal
        .parse::<BigUint>()
        .map_err(|_| SealboxError::InvalidKey(format!("not a decimal integer: {decimal}")))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_codec_round_trip() {
        let e = BigUint::from(65_537u32);
        let n = BigUint::from(999_999_999_999_989u64);
        let key = encode_key(&e, &n);
        let (e2, n2) = decode_key(&key).unwrap();
        assert_eq!(e, e2);
        assert_eq!(n, n2);
    }

    #[test]
    fn decode_rejects_missing_separator() {
        assert!(matches!(
            decode_key("bm90YWtleQ=="),
            Err(SealboxError::InvalidKey(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(decode_key("!!!-???").is_err());
    }

    #[test]
    fn decode_rejects_non_decimal_component() {
        let not_a_number = BASE64.encode(b"forty-two");
        let key = format!("{not_a_number}-{not_a_number}");
        assert!(decode_key(&key).is_err());
    }
}
