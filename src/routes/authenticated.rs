use crate::{
    AppState,
    auth::require_auth,
    handlers,
    router::{BoxHandler, RouteTableBuilder, with_state},
};

/// Authenticated Routes
///
/// Endpoints for any caller holding a valid, unexpired token. The handlers can read
/// the caller's identity through the `Claims` extractor.
pub fn authenticated_routes(builder: RouteTableBuilder, state: &AppState) -> RouteTableBuilder {
    let guarded = |handler: BoxHandler| require_auth(false, state.tokens.clone(), handler);

    builder
        // GET /api/auth/me
        // Returns the claims of the presented token.
        .get(
            "/api/auth/me",
            guarded(with_state(handlers::me, state.clone())),
        )
        // GET /api/actors
        // Lists every actor with their films.
        .get(
            "/api/actors",
            guarded(with_state(handlers::list_actors, state.clone())),
        )
}
