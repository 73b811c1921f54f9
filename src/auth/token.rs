use std::{fmt, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Lifetime of an access token from the moment it is issued.
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Claims
///
/// The identity payload carried inside an access token. The serialized field names
/// (`id`, `username`, `is_admin`, `exp`) are the token's wire format.
///
/// Claims are never stored server-side: they are created at login, signed into the
/// token, and read back from it on every protected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Claims {
    /// Subject: the `users.id` of the token holder.
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    /// Expiration time, Unix seconds.
    pub exp: i64,
}

/// DecodedToken
///
/// Result of a successful decode. An elapsed expiry is reported through `expired`
/// rather than as an error, so callers can still see who presented the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub claims: Claims,
    pub expired: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("could not sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// TokenCodec
///
/// Signs and verifies access tokens (HS256 JWT) with the shared secret from
/// `AppConfig`. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Option<Arc<str>>,
    ttl: TimeDelta,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            // An empty secret is treated as no secret at all.
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
            ttl: TimeDelta::minutes(TOKEN_TTL_MINUTES),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn secret(&self) -> Result<&str, TokenError> {
        self.secret.as_deref().ok_or(TokenError::MissingSecret)
    }

    /// Issues a token for the given identity, expiring `TOKEN_TTL_MINUTES` from now.
    pub fn encode(&self, id: i64, username: &str, is_admin: bool) -> Result<String, TokenError> {
        self.encode_at(id, username, is_admin, Utc::now())
    }

    pub fn encode_at(
        &self,
        id: i64,
        username: &str,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let secret = self.secret()?;
        let claims = Claims {
            id,
            username: username.to_owned(),
            is_admin,
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(TokenError::Encode)
    }

    /// Verifies a token and returns its claims. See [`TokenCodec::decode_at`].
    pub fn decode(&self, token: &str) -> Result<DecodedToken, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies the signature and structure of `token`.
    ///
    /// Fails on a missing secret, a malformed token or a signature mismatch. A token
    /// whose `exp` is at or before `now` decodes successfully with `expired = true`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<DecodedToken, TokenError> {
        let secret = self.secret()?;

        // Expiry is judged below against `now`, not by the library's own clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(e),
        })?;

        let expired = data.claims.exp <= now.timestamp();
        Ok(DecodedToken {
            claims: data.claims,
            expired,
        })
    }
}
