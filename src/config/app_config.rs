use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the account, verification and invitation lifecycle.
///
/// Every manager receives this struct explicitly at construction; there are
/// no global settings lookups.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Days an account-activation key stays valid after registration
    pub verification_key_expiry_days: u32,
    /// Days a team invitation stays redeemable
    pub invitation_validity_days: u32,
    /// Days a password-reset token stays valid
    pub reset_token_validity_days: u32,
    /// Minimum password length accepted at registration and reset
    pub password_min_length: usize,
    /// Maximum number of email addresses per invite request
    pub max_invite_emails_per_request: usize,
    /// Secret for signing bearer tokens and reset tokens.
    /// Falls back to the JWT_SECRET env var, then to a random value.
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in hours
    pub jwt_expiration_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verification_key_expiry_days: 4,
            invitation_validity_days: 7,
            reset_token_validity_days: 4,
            password_min_length: 8,
            max_invite_emails_per_request: 5,
            jwt_secret: None,
            jwt_expiration_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
