//! Stateless reset token generation and checking
//!
//! A token is `<base36 day stamp>-<hex signature>` where the signature is an
//! HMAC-SHA256 over the account's mutable state and the day stamp. Nothing is
//! stored server-side: changing the password (or flipping the active flag)
//! changes the signed message and kills every outstanding token at once.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::Debug;

use crate::domain::account::Account;
use crate::domain::DomainError;
use crate::infrastructure::token::{constant_time_compare, decode_base36, encode_base36};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LEN: usize = 32;
const SECONDS_PER_DAY: i64 = 86_400;

/// Generator bound to the server secret and a validity window in days
#[derive(Clone)]
pub struct ResetTokenGenerator {
    secret: String,
    validity_days: u32,
}

impl Debug for ResetTokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenGenerator")
            .field("validity_days", &self.validity_days)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl ResetTokenGenerator {
    pub fn new(secret: impl Into<String>, validity_days: u32) -> Self {
        Self {
            secret: secret.into(),
            validity_days,
        }
    }

    fn day_number(at: DateTime<Utc>) -> i64 {
        at.timestamp().div_euclid(SECONDS_PER_DAY)
    }

    /// Issue a token for the account's current state
    pub fn make_token(&self, account: &Account, now: DateTime<Utc>) -> Result<String, DomainError> {
        let days = Self::day_number(now);
        let signature = self.sign(account, days)?;

        Ok(format!("{}-{}", encode_base36(days), signature))
    }

    /// Check a token against the account's current state and the window.
    ///
    /// The comparison is constant-time; any parse failure, stale day stamp
    /// or state mismatch is just `false`.
    pub fn check_token(&self, account: &Account, token: &str, now: DateTime<Utc>) -> bool {
        let Some((day_part, signature)) = token.split_once('-') else {
            return false;
        };

        let Ok(days) = decode_base36(day_part) else {
            return false;
        };

        let now_days = Self::day_number(now);
        if days > now_days {
            return false;
        }

        if days + i64::from(self.validity_days) <= now_days {
            return false;
        }

        match self.sign(account, days) {
            Ok(expected) => constant_time_compare(signature, &expected),
            Err(_) => false,
        }
    }

    fn sign(&self, account: &Account, days: i64) -> Result<String, DomainError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| DomainError::internal(format!("Failed to key reset token mac: {e}")))?;

        let last_login = account
            .last_login_at()
            .map(|at| at.timestamp().to_string())
            .unwrap_or_default();

        let state = format!(
            "{}\n{}\n{}\n{}\n{}",
            account.id(),
            account.password_hash(),
            last_login,
            account.is_active(),
            days
        );
        mac.update(state.as_bytes());

        let digest = mac.finalize().into_bytes();
        Ok(hex::encode(digest)[..SIGNATURE_LEN].to_string())
    }
}
