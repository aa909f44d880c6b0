//! JWT token service
//!
//! Issues and verifies the signed, time-limited access tokens. A token
//! carries only the user id; role and profile are looked up on every request.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted secret length
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime
pub const DEFAULT_EXPIRATION_DAYS: i64 = 15;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime (days)
    pub expiration_days: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl JwtConfig {
    /// Config with the given secret and default lifetime / issuer / audience
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_days: DEFAULT_EXPIRATION_DAYS,
            issuer: "helpdesk-server".to_string(),
            audience: "helpdesk-clients".to_string(),
        }
    }

    /// Load from `JWT_*` environment variables
    ///
    /// Without `JWT_SECRET`, development gets a random per-process secret
    /// (tokens do not survive a restart); any other environment fails.
    pub fn from_env(development: bool) -> Result<Self, JwtError> {
        let secret = load_jwt_secret(development)?;
        let defaults = Self::with_secret(secret);

        Ok(Self {
            expiration_days: std::env::var("JWT_EXPIRATION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|days: &i64| *days > 0)
                .unwrap_or(DEFAULT_EXPIRATION_DAYS),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer.clone()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience.clone()),
            ..defaults
        })
    }
}

/// JWT claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (Subject)
    pub sub: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
///
/// Expired and invalid tokens stay distinct here for logging; the
/// authorization gate answers both the same way.
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Generate a printable 64-character secret (development only)
pub fn generate_secure_printable_jwt_secret() -> Result<String, JwtError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(bytes
        .iter()
        .map(|b| SECRET_ALPHABET[*b as usize % SECRET_ALPHABET.len()] as char)
        .collect())
}

fn load_jwt_secret(development: bool) -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < MIN_SECRET_LEN {
                return Err(JwtError::ConfigError(format!(
                    "JWT_SECRET must be at least {} characters long",
                    MIN_SECRET_LEN
                )));
            }
            Ok(secret)
        }
        Err(_) if development => {
            tracing::warn!("JWT_SECRET not set! Generating a temporary key for development.");
            generate_secure_printable_jwt_secret()
        }
        Err(_) => Err(JwtError::ConfigError(
            "JWT_SECRET environment variable must be set outside development".to_string(),
        )),
    }
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiration_days", &self.config.expiration_days)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Create a token service with the given config
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a new token for a user
    pub fn generate_token(&self, user_id: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::days(self.config.expiration_days);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Verify signature, expiry, issuer and audience; return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }
}
