//! From-scratch textbook RSA.
//!
//! Key generation draws candidate primes uniformly from `[2^(k-1), 2^k)`
//! using OS entropy and walks them forward to the first integer passing a
//! Fermat base-2 check (`2^n mod n == 2`). Encryption is plain modular
//! exponentiation over the UTF-8 bytes of the message read as one big-endian
//! integer; there is no padding. Ciphertext travels as base64 over the
//! decimal string of the cipher integer.
//!
//! A message whose integer form is `>= n - 1` cannot be encrypted; callers
//! pre-check byte length against [`max_plaintext_chars`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Result, SealboxError};
use crate::keys::{decode_key, decode_modulus, encode_key, KeyPair};

// ----------------------------------------------------------------------------
// Key Generation
// ----------------------------------------------------------------------------

/// Generate an RSA key pair with an `modulus_bits`-bit modulus.
///
/// `modulus_bits` is split in half to size the two primes, so it should be
/// even and at least 16. Fails only if the OS random source is unavailable
/// or the drawn public exponent is not invertible modulo the totient.
pub fn generate_key_pair(modulus_bits: u64) -> Result<KeyPair> {
    let prime_bits = modulus_bits / 2;

    let p = next_fermat_prime(random_biguint(prime_bits)?);
    let q = next_fermat_prime(random_biguint(prime_bits)?);
    // Public exponent: the nearest Fermat-prime above a fresh random number,
    // smaller than n and almost surely coprime with z.
    let e = next_fermat_prime(random_biguint(prime_bits)?);

    let n = &p * &q;
    let z = (&p - BigUint::one()) * (&q - BigUint::one());
    let d = e.modinv(&z).ok_or(SealboxError::ExponentNotInvertible)?;

    Ok(KeyPair {
        public_key: encode_key(&e, &n),
        private_key: encode_key(&d, &n),
    })
}

/// Draw a uniform random integer from `[2^(bits-1), 2^bits)`.
fn random_biguint(bits: u64) -> Result<BigUint> {
    let low_bits = bits - 1;
    let num_bytes = low_bits.div_ceil(8) as usize;
    let mut buf = vec![0u8; num_bytes];
    if num_bytes > 0 {
        OsRng.try_fill_bytes(&mut buf)?;
        // Mask off the bits above `low_bits` in the most significant byte.
        let excess = 8 * num_bytes as u64 - low_bits;
        buf[0] &= ((1u32 << (8 - excess)) - 1) as u8;
    }
    Ok(BigUint::from_bytes_be(&buf) + (BigUint::one() << low_bits))
}

/// Walk `n` forward to the first integer passing the Fermat base-2 check.
///
/// Known-weak heuristic (base-2 pseudoprimes pass); part of the observable
/// key-generation contract.
fn next_fermat_prime(mut n: BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    if (&n % &two).is_zero() {
        n += BigUint::one();
    }
    while two.modpow(&n, &n) != two {
        n += &two;
    }
    n
}

// ----------------------------------------------------------------------------
// Capacity
// ----------------------------------------------------------------------------

/// Hard ceiling on the plaintext byte length encryptable with `key`:
/// `floor(bit_length(n) / 8) - 1`. One byte of margin keeps the integer
/// form of the message strictly below the modulus.
pub fn max_plaintext_chars(key: &str) -> Result<usize> {
    let modulus = decode_modulus(key)?;
    Ok((modulus.bits() / 8).saturating_sub(1) as usize)
}

// ----------------------------------------------------------------------------
// Encrypt / Decrypt
// ----------------------------------------------------------------------------

/// Encrypt `message` with `key`, returning base64 ciphertext.
///
/// Errors with [`SealboxError::MessageTooLong`] iff the big-endian integer
/// form of the message is `>= modulus - 1`. The exact boundary is part of
/// the observable contract.
pub fn encrypt(message: &str, key: &str) -> Result<String> {
    let (exponent, modulus) = decode_key(key)?;
    let message_int = BigUint::from_bytes_be(message.as_bytes());
    if message_int >= &modulus - BigUint::one() {
        return Err(SealboxError::MessageTooLong);
    }
    let cipher_int = message_int.modpow(&exponent, &modulus);
    Ok(BASE64.encode(cipher_int.to_string().as_bytes()))
}

/// Decrypt base64 ciphertext with `key`, returning the original message.
pub fn decrypt(ciphertext_b64: &str, key: &str) -> Result<String> {
    let (exponent, modulus) = decode_key(key)?;
    let decimal = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| SealboxError::InvalidCiphertext(format!("bad base64: {e}")))?;
    let decimal = String::from_utf8(decimal)
        .map_err(|_| SealboxError::InvalidCiphertext("ciphertext is not UTF-8".into()))?;
    let cipher_int = decimal
        .parse::<BigUint>()
        .map_err(|_| SealboxError::InvalidCiphertext(format!("not a decimal integer: {decimal}")))?;

    let message_int = cipher_int.modpow(&exponent, &modulus);
    Ok(String::from_utf8(to_minimal_bytes(&message_int))?)
}

/// Minimal big-endian byte form; an empty message decrypts back to no bytes.
fn to_minimal_bytes(n: &BigUint) -> Vec<u8> {
    if n.is_zero() {
        Vec::new()
    } else {
        n.to_bytes_be()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
