//! Session token issuance and verification.
//!
//! Tokens are HS256-signed JWTs carrying the account id and role, valid for
//! 24 hours from issuance. Verification is stateless; tokens are never stored
//! or revoked server-side.

use crate::model::Role;
use anyhow::Context;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime in seconds (24 hours).
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, as a UUID string.
    pub sub: String,
    /// Role at issuance time. A role change requires a fresh login.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Why verification failed. Callers collapse all variants into one generic
/// unauthorized outcome; the distinction exists for tests and logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    InvalidSignature,
    Expired,
}

/// The authenticated identity a verified token resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectContext {
    pub user_id: Uuid,
    pub role: Role,
}

/// Issues and verifies session tokens against one process-wide secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Produce a signed token for `user_id` with `role`, expiring in 24h.
    pub fn issue(&self, user_id: Uuid, role: Role) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding).context("failed to sign session token")
    }

    /// Verify a token and resolve the identity it carries.
    pub fn verify(&self, token: &str) -> Result<SubjectContext, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| TokenError::Malformed)?;

        Ok(SubjectContext {
            user_id,
            role: data.claims.role,
        })
    }
}
