use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::TokenConfig;

/// The only signing algorithm issued or accepted.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a session token.
///
/// Absent claims decode to their defaults so that validation, not
/// deserialisation, reports which one is missing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id, as a string.
    #[serde(default)]
    pub sub: String,
    /// Issued at (seconds since epoch).
    #[serde(default)]
    pub iat: usize,
    /// Not valid before (seconds since epoch).
    #[serde(default)]
    pub nbf: usize,
    /// Expiration (seconds since epoch).
    #[serde(default)]
    pub exp: usize,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub aud: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, TokenError> {
        if self.sub.is_empty() {
            return Err(TokenError::MissingClaim("sub".into()));
        }
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

/// Why a token was refused. One variant per rejection reason.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("signature does not match")]
    InvalidSignature,
    #[error("unexpected signing algorithm")]
    InvalidAlgorithm,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("required claim `{0}` is missing")]
    MissingClaim(String),
    #[error("issuer mismatch")]
    InvalidIssuer,
    #[error("audience mismatch")]
    InvalidAudience,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> TokenError {
        match error.into_kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::InvalidAlgorithm
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim(claim),
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            ErrorKind::InvalidAudience => TokenError::InvalidAudience,
            _ => TokenError::Malformed,
        }
    }
}

/// Issues and validates stateless HS256 session tokens.
///
/// Validity is purely signature plus the `nbf`/`exp` window; nothing is stored
/// server-side and there is no leeway for clock skew.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: config.ttl,
        }
    }

    /// Builds the claim set for `user_id` as if issued at `now`.
    pub fn claims_for(&self, user_id: i64, now: DateTime<Utc>) -> Claims {
        let issued_at = now.timestamp().max(0) as usize;
        let ttl_secs = usize::try_from(self.ttl.as_secs()).unwrap_or(usize::MAX);
        Claims {
            sub: user_id.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            iss: self.issuer.clone(),
            aud: self.issuer.clone(),
        }
    }

    /// Issues a token for `user_id`, valid from now for the configured TTL.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.sign(&self.claims_for(user_id, Utc::now()))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let token = encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        log::debug!("token issued for user {}", claims.sub);
        Ok(token)
    }

    /// Validates signature, algorithm, time window, issuer and audience, and
    /// that the subject is a user id.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation())?;
        data.claims.user_id()?;
        Ok(data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.issuer.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation
    }
}
