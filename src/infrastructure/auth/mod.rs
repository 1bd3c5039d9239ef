//! Bearer token issuing for logged-in accounts

pub mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
