use std::env;
use std::time::Duration;

use auth::JwtHandler;
use auth::SigningAlgorithm;
use auth::TokenCodec;
use auth::TokenPolicy;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::session::service::SessionSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    /// Required for the redis backend
    pub url: Option<String>,
    #[serde(default)]
    pub key_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub algorithm: SigningAlgorithm,
    pub issuer: Option<String>,
    pub access: TokenConfig,
    pub refresh: TokenConfig,
}

/// Key material and lifetime for one token class.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    /// Shared secret (HS256) or PEM private key (RS256)
    pub signing_key: String,
    /// PEM public key, RS256 only
    pub verify_key: Option<String>,
    pub ttl_seconds: i64,
}

/// Upper bound on a verification code's lifetime
const MAX_VERIFICATION_TTL_SECONDS: u64 = 86_400;

#[derive(Debug, Deserialize, Clone)]
pub struct VerificationConfig {
    pub ttl_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { ttl_seconds: 120 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub refresh_requires_current_session: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_requires_current_session: true,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS__SIGNING_KEY, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: CACHE__BACKEND=memory overrides cache.backend
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Session service tunables.
    ///
    /// # Errors
    /// * `Message` - Verification TTL is zero or above one day
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        let ttl_seconds = self.verification.ttl_seconds;
        if ttl_seconds == 0 || ttl_seconds > MAX_VERIFICATION_TTL_SECONDS {
            return Err(ConfigError::Message(format!(
                "verification.ttl_seconds must be between 1 and {}, got {}",
                MAX_VERIFICATION_TTL_SECONDS, ttl_seconds
            )));
        }

        Ok(SessionSettings {
            verification_ttl: Duration::from_secs(ttl_seconds),
            key_prefix: self.cache.key_prefix.clone(),
            refresh_requires_current_session: self.session.refresh_requires_current_session,
        })
    }
}

impl JwtConfig {
    /// Build the token codec described by this section.
    ///
    /// # Errors
    /// * `Message` - Key material unreadable, a TTL out of range, or refresh TTL not
    ///   above access TTL
    pub fn codec(&self) -> Result<TokenCodec, ConfigError> {
        let access = self.policy(&self.access, "access")?;
        let refresh = self.policy(&self.refresh, "refresh")?;

        let codec = TokenCodec::new(access, refresh)
            .map_err(|e| ConfigError::Message(format!("jwt: {}", e)))?;

        Ok(match &self.issuer {
            Some(issuer) => codec.with_issuer(issuer),
            None => codec,
        })
    }

    fn policy(&self, token: &TokenConfig, name: &str) -> Result<TokenPolicy, ConfigError> {
        let handler = JwtHandler::from_config(
            self.algorithm,
            &token.signing_key,
            token.verify_key.as_deref(),
        )
        .map_err(|e| ConfigError::Message(format!("jwt.{}: {}", name, e)))?;

        let ttl = chrono::Duration::try_seconds(token.ttl_seconds).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.{}.ttl_seconds out of range: {}",
                name, token.ttl_seconds
            ))
        })?;

        Ok(TokenPolicy::new(handler, ttl))
    }
}
