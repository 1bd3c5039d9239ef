//! JWT bearer token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::account::Account;
use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (account id, decimal)
    pub sub: String,
    /// Login handle
    pub handle: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    /// Create new claims for an account
    pub fn new(account: &Account, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: account.id().to_string(),
            handle: account.handle().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get the account id from the claims
    pub fn account_id(&self) -> Result<i64, DomainError> {
        self.sub
            .parse()
            .map_err(|_| DomainError::validation("JWT subject is not an account id"))
    }
}

/// Configuration for the JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Trait for bearer token operations
pub trait JwtGenerator: Send + Sync + Debug {
    /// Generate a token for an account
    fn generate(&self, account: &Account) -> Result<String, DomainError>;

    /// Validate a token and return the claims
    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError>;

    /// Token lifetime in hours
    fn expiration_hours(&self) -> u64;
}

/// HS256 JWT service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }
}

impl JwtGenerator for JwtService {
    fn generate(&self, account: &Account) -> Result<String, DomainError> {
        let claims = JwtClaims::new(account, self.config.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {e}")))
    }

    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let validation = Validation::default();

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| DomainError::validation(format!("Invalid JWT: {e}")))?;

        Ok(token_data.claims)
    }

    fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountId, NewAccount};

    fn make_account() -> Account {
        Account::from_new(
            AccountId::new(42),
            NewAccount {
                handle: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hashed".to_string(),
                active: true,
                created_at: Utc::now(),
            },
        )
    }

    fn make_service() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret", 24))
    }

    #[test]
    fn test_generate_and_validate() {
        let service = make_service();
        let account = make_account();

        let token = service.generate(&account).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.handle, "alice");
        assert_eq!(claims.account_id().unwrap(), 42);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let service = make_service();

        assert!(service.validate("not-a-token").is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_signature() {
        let account = make_account();
        let issuer = JwtService::new(JwtConfig::new("secret-one", 24));
        let verifier = JwtService::new(JwtConfig::new("secret-two", 24));

        let token = issuer.generate(&account).unwrap();
        assert!(verifier.validate(&token).is_err());
    }

    #[test]
    fn test_expiration_hours() {
        let service = make_service();
        assert_eq!(service.expiration_hours(), 24);
    }
}
