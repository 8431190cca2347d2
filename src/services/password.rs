// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PBKDF2 password hashing.
//!
//! Parameters match the records already in the database: HMAC-SHA1,
//! 10000 iterations, 64-byte output, 16-byte random salt. Salt and hash are
//! stored base64-encoded; the hash is derived from the decoded salt bytes.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

pub const SALT_LEN: usize = 16;
pub const HASH_LEN: usize = 64;

const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(10_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Generate a fresh random salt, base64-encoded.
pub fn generate_salt() -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failed to produce salt")))?;
    Ok(BASE64.encode(salt))
}

fn decode_salt(salt_b64: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(salt_b64)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored salt is not valid base64: {}", e)))
}

/// Hash `password` with the given base64 salt. Deterministic for a fixed salt.
pub fn hash_password(password: &str, salt_b64: &str) -> Result<String> {
    let salt = decode_salt(salt_b64)?;
    let mut out = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA1,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut out,
    );
    Ok(BASE64.encode(out))
}

/// Compare `password` against a stored hash in constant time.
///
/// Corrupt stored values never match.
pub fn verify_password(password: &str, salt_b64: &str, hash_b64: &str) -> bool {
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt_b64), BASE64.decode(hash_b64)) else {
        tracing::warn!("Stored password hash or salt is not valid base64");
        return false;
    };
    if expected.is_empty() {
        return false;
    }

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA1,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &expected,
    )
    .is_ok()
}
