use std::sync::Arc;

use axum::{Router, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod usecase;

// Route registration, segregated by access level (public, authenticated, admin).
pub mod routes;

// --- Public Re-exports ---

pub use auth::{Claims, TokenCodec};
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use router::{RouteError, RouteTable};

use usecase::{ActorUsecase, FilmUsecase, UserUsecase};

/// ApiDoc
///
/// OpenAPI document for every endpoint in the route table, served as JSON at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::ping, handlers::register, handlers::login, handlers::me,
        handlers::list_films, handlers::get_film, handlers::create_film, handlers::update_film,
        handlers::replace_film, handlers::delete_film, handlers::list_actors,
        handlers::create_actor, handlers::update_actor, handlers::replace_actor,
        handlers::delete_actor
    ),
    components(
        schemas(
            models::User, models::Film, models::Actor, models::FilmWithActors,
            models::ActorWithFilms, models::UserRegisterBody, models::UserLoginBody,
            models::LoginResponse, models::FilmCreateBody, models::FilmUpdateBody,
            models::FilmReplaceBody, models::ActorCreateBody, models::ActorUpdateBody,
            models::ActorReplaceBody, auth::Claims, error::ErrorBody,
        )
    ),
    tags(
        (name = "film-library", description = "Film Library API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared by every handler through the route table. Cloning is cheap: the repository
/// is behind an `Arc` and the token codec shares its secret.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub tokens: TokenCodec,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let tokens = TokenCodec::new(config.jwt_secret.clone());
        Self {
            repo,
            tokens,
            config,
        }
    }

    pub fn users(&self) -> UserUsecase {
        UserUsecase::new(self.repo.clone(), self.tokens.clone())
    }

    pub fn films(&self) -> FilmUsecase {
        FilmUsecase::new(self.repo.clone())
    }

    pub fn actors(&self) -> ActorUsecase {
        ActorUsecase::new(self.repo.clone())
    }
}

/// create_router
///
/// Builds the route table and wraps it in the HTTP stack. Every request not claimed
/// by the API docs goes to the route table's dispatcher.
///
/// Fails when the route table contains invalid or ambiguous templates.
pub fn create_router(state: AppState) -> Result<Router, RouteError> {
    let table = Arc::new(routes::route_table(&state)?);
    tracing::debug!(templates = table.len(), "route table built");

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(router::dispatch)
        .with_state(table);

    Ok(base_router
        .layer(
            ServiceBuilder::new()
                // Generates an x-request-id for every request lacking one.
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(TimeoutLayer::new(state.config.request_timeout)),
        )
        .layer(cors))
}

/// trace_span_logger
///
/// Span for one request, tagged with its `x-request-id` so all log lines of the
/// request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
