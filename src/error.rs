use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{auth::TokenError, models::ValidationError, repository::RepoError};

/// ErrorBody
///
/// The JSON shape of every failure response: a single `message` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// ApiError
///
/// Every way a request can fail once it reaches the application. Routing and
/// authorization failures are produced by the dispatcher and the auth middleware;
/// the rest come out of extractors, use cases and repositories.
///
/// The `Display` text of a variant is exactly the `message` sent to the client, so
/// server-side details (the `Internal` payload) never leave the process.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    // --- Authorization ---
    #[error("token not provided")]
    TokenNotProvided,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("not enough permissions")]
    NotEnoughPermissions,

    // --- Routing ---
    #[error("not found")]
    RouteNotFound,
    #[error("method not allowed")]
    MethodNotAllowed { allowed: Vec<Method> },

    // --- Request shape ---
    #[error("empty request body")]
    EmptyBody,
    #[error("could not decode request body")]
    DecodeBody,
    #[error("invalid path parameter")]
    InvalidPathParameter,
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // --- Business outcomes ---
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TokenNotProvided | ApiError::InvalidToken | ApiError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotEnoughPermissions => StatusCode::FORBIDDEN,
            ApiError::RouteNotFound | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::EmptyBody
            | ApiError::DecodeBody
            | ApiError::InvalidPathParameter
            | ApiError::Validation(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server errors carry the detail only in the log line.
        match &self {
            ApiError::Internal(detail) => {
                tracing::error!(status = status.as_u16(), error = %detail, "request failed");
            }
            _ => {
                tracing::info!(status = status.as_u16(), error = %self, "request rejected");
            }
        }

        let mut response = (
            status,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response();

        if let ApiError::MethodNotAllowed { allowed } = &self {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::FilmNotFound | RepoError::ActorNotFound => ApiError::NotFound(err.to_string()),
            RepoError::UnknownActor(_) | RepoError::UserNotFound => {
                ApiError::BadRequest(err.to_string())
            }
            RepoError::UsernameTaken => ApiError::Conflict(err.to_string()),
            RepoError::Database(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature | TokenError::Malformed(_) => ApiError::InvalidToken,
            TokenError::MissingSecret | TokenError::Encode(_) => ApiError::Internal(err.to_string()),
        }
    }
}
