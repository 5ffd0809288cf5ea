//! Authentication for the dashboard API.
//!
//! Two credential schemes are supported:
//!
//! - JWT session tokens issued at signup/login (`Authorization: Bearer ...`)
//! - opaque API keys managed through the key registry (`X-API-Key` header,
//!   `Authorization: ApiKey ...`, or the `api_key` query parameter)
//!
//! Middleware lives in [`middleware`]; this module holds token issuance and
//! verification, password hashing, and key-string generation.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod middleware;

/// Claim structure for session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the numeric user id, stringified
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity resolved from a request credential, attached to the request
/// extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: Option<String>,
    /// Set when the request authenticated with an API key
    pub api_key_id: Option<i64>,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
    pub api_key_prefix: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiration: Duration, api_key_prefix: String) -> Self {
        Self {
            jwt_secret,
            token_expiration,
            api_key_prefix,
        }
    }
}

/// Issues and validates session tokens, hashes and verifies passwords, and
/// generates opaque API key strings.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a session token for a user.
    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + chrono::Duration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::TokenCreation("invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a session token and return its claims. Expiry is checked as
    /// part of decoding.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Hash a password with argon2 and a fresh random salt. The result is a
    /// PHC string carrying the salt and parameters.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    /// Verify a password against a stored PHC hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashError(e.to_string())),
        }
    }

    /// Generate an opaque API key string: prefix + 64 hex chars from 32
    /// CSPRNG bytes. Uniqueness is enforced by the store, not assumed here.
    pub fn generate_key_string(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("{}{}", self.config.api_key_prefix, hex::encode(bytes))
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Password hash error: {0}")]
    HashError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::InvalidToken | Self::TokenExpired | Self::InvalidApiKey => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::TokenCreation(_) | Self::HashError(_) | Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
