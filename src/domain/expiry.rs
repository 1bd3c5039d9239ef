//! Expiry rules shared by verification keys, invitations and reset tokens

use chrono::{DateTime, Duration, Utc};

/// Whether a dated artifact has expired.
///
/// The boundary is inclusive: an artifact created exactly `validity_days`
/// ago is already expired.
pub fn is_expired(created_at: DateTime<Utc>, validity_days: u32, now: DateTime<Utc>) -> bool {
    created_at + Duration::days(i64::from(validity_days)) <= now
}

/// Latest creation time that still counts as expired at `now`.
///
/// `created_at <= expiry_cutoff(now, days)` holds exactly when
/// `is_expired(created_at, days, now)` does; sweep queries filter on it.
pub fn expiry_cutoff(now: DateTime<Utc>, validity_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(validity_days))
}
