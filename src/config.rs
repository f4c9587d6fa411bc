use serde::Deserialize;

/// Startup-only configuration failure. Any of these prevents the process
/// from binding at all.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET",
                reason: "must not be empty".into(),
            });
        }
        if self.refresh_ttl_seconds <= self.access_ttl_seconds {
            return Err(ConfigError::Invalid {
                var: "JWT_REFRESH_TTL_SECONDS",
                reason: "refresh token lifetime must exceed the access token lifetime".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: require("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "doorman".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "doorman-users".into()),
            access_ttl_seconds: parse_seconds("JWT_ACCESS_TTL_SECONDS", 900)?,
            refresh_ttl_seconds: parse_seconds("JWT_REFRESH_TTL_SECONDS", 60 * 60 * 24 * 14)?,
        };
        jwt.validate()?;
        Ok(Self { database_url, jwt })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn parse_seconds(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
            var,
            reason: format!("expected an integer number of seconds, got {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
