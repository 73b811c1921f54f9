use crate::{
    AppState, handlers,
    router::{RouteTableBuilder, with_state},
};

/// Public Routes
///
/// Endpoints reachable without a token: health check, the account gateway, and
/// read-only access to the film catalogue.
pub fn public_routes(builder: RouteTableBuilder, state: &AppState) -> RouteTableBuilder {
    builder
        // GET /ping
        // Liveness probe; answers "pong".
        .get("/ping", with_state(handlers::ping, state.clone()))
        // POST /api/auth/register
        .post(
            "/api/auth/register",
            with_state(handlers::register, state.clone()),
        )
        // POST /api/auth/login
        // Issues the bearer token used by every protected route.
        .post("/api/auth/login", with_state(handlers::login, state.clone()))
        // GET /api/films?sort_by=...&order=...&title=...&actor_name=...
        .get("/api/films", with_state(handlers::list_films, state.clone()))
        // GET /api/films/{id}
        .get(
            "/api/films/{id}",
            with_state(handlers::get_film, state.clone()),
        )
}
