use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::{error::ApiError, router::PathParams};

/// JsonBody
///
/// JSON request body extractor that answers with the service's own error messages:
/// an empty body is `empty request body`, anything serde rejects is
/// `could not decode request body`. The `Content-Type` header is not inspected.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|_| ApiError::DecodeBody)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::EmptyBody);
        }

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "request body rejected");
            ApiError::DecodeBody
        })
    }
}

/// Hands the dispatcher's path bindings to handlers. Outside the route table there
/// are none, which reads as an empty set.
impl<S> FromRequestParts<S> for PathParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<PathParams>().cloned().unwrap_or_default())
    }
}
