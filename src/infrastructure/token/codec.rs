//! Token codec
//!
//! Pure encoding and generation primitives for the identifiers the system
//! hands out: base36 account ids in reset links, 40-hex verification keys,
//! and 25-char URL-safe invite codes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a verification key in lowercase hex characters
pub const VERIFICATION_KEY_LEN: usize = 40;

/// Length of an invite code
pub const INVITE_CODE_LEN: usize = 25;

const KEY_SALT_LEN: usize = 5;
const INVITE_CODE_RANDOM_BYTES: usize = 20;

static VERIFICATION_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9]{40}$").expect("verification key pattern is valid"));

/// Convert an integer to a base36 string over `0-9A-Z`, with a leading `-`
/// for negative values.
pub fn encode_base36(n: i64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let negative = n < 0;
    let mut n = n.unsigned_abs();
    let mut digits = Vec::new();

    while n != 0 {
        digits.push(BASE36_ALPHABET[(n % 36) as usize]);
        n /= 36;
    }

    let body: String = digits.iter().rev().map(|&b| b as char).collect();

    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Parse a base36 string back to an integer. Case-insensitive.
pub fn decode_base36(s: &str) -> Result<i64, DomainError> {
    i64::from_str_radix(s, 36)
        .map_err(|_| DomainError::validation(format!("'{s}' is not a valid base36 number")))
}

/// Derive a fresh verification key for an account handle.
///
/// Digests 5 random alphanumeric chars followed by the handle and keeps the
/// first 160 bits as lowercase hex. Uniqueness is still enforced at insert;
/// callers regenerate on the rare collision.
pub fn derive_verification_key(handle: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_SALT_LEN)
        .map(char::from)
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(handle.as_bytes());
    let digest = hasher.finalize();

    hex::encode(&digest[..VERIFICATION_KEY_LEN / 2])
}

/// Whether a string has the shape of an unconsumed verification key.
///
/// The consumed sentinel can never match this pattern, so checking it before
/// any lookup doubles as the replay gate.
pub fn is_well_formed_key(key: &str) -> bool {
    VERIFICATION_KEY_RE.is_match(key)
}

/// Generate a team invite code: fresh random bytes through URL-safe base64,
/// truncated to 25 chars. Not predictable from creation order.
pub fn generate_invite_code() -> String {
    let mut bytes = [0u8; INVITE_CODE_RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let encoded = URL_SAFE_NO_PAD.encode(bytes);
    encoded[..INVITE_CODE_LEN].to_string()
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;

    for i in 0..a.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}
