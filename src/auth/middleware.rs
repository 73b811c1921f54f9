use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, header, request::Parts},
    response::IntoResponse,
};

use super::token::{Claims, TokenCodec, TokenError};
use crate::{
    error::ApiError,
    router::{BoxHandler, HandlerFuture},
};

/// The only accepted `Authorization` scheme.
pub const BEARER_SCHEME: &str = "Bearer";

/// require_auth
///
/// Wraps `next` so that it only runs for requests carrying a valid, unexpired bearer
/// token (and, with `require_admin`, one whose claims have the admin flag).
///
/// Every rejection is answered here and never reaches `next`:
/// 1. Missing or malformed `Authorization` header: 401 "token not provided".
/// 2. Bad signature or token structure: 401 "invalid token".
/// 3. Expired token: 401 "token expired".
/// 4. Admin required but not granted: 403 "not enough permissions".
///
/// On success the verified [`Claims`] are inserted into the request extensions.
pub fn require_auth(require_admin: bool, tokens: TokenCodec, next: BoxHandler) -> BoxHandler {
    Arc::new(move |mut request: Request| -> HandlerFuture {
        let outcome = authorize(&tokens, require_admin, request.headers());
        let next = Arc::clone(&next);
        Box::pin(async move {
            match outcome {
                Ok(claims) => {
                    request.extensions_mut().insert(claims);
                    next(request).await
                }
                Err(rejection) => rejection.into_response(),
            }
        })
    })
}

/// Runs the authorization checks against the request headers.
pub fn authorize(
    tokens: &TokenCodec,
    require_admin: bool,
    headers: &HeaderMap,
) -> Result<Claims, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::TokenNotProvided)?;

    let decoded = tokens.decode(token).map_err(|err| match err {
        TokenError::MissingSecret => ApiError::Internal(err.to_string()),
        other => {
            tracing::debug!(error = %other, "rejected access token");
            ApiError::InvalidToken
        }
    })?;

    if decoded.expired {
        tracing::warn!(
            user_id = decoded.claims.id,
            username = %decoded.claims.username,
            "expired access token presented",
        );
        return Err(ApiError::TokenExpired);
    }

    if require_admin && !decoded.claims.is_admin {
        return Err(ApiError::NotEnoughPermissions);
    }

    Ok(decoded.claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// The value must split on single spaces into exactly two parts, the first being the
/// literal `Bearer` and the second non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Claims Extractor
///
/// Gives handlers behind `require_auth` access to the caller's identity. On a route
/// without the middleware there are no claims and the request is rejected as
/// unauthenticated.
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(ApiError::TokenNotProvided)
    }
}
