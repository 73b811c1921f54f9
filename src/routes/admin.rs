use crate::{
    AppState,
    auth::require_auth,
    handlers,
    router::{BoxHandler, RouteTableBuilder, with_state},
};

/// Admin Routes
///
/// Every catalogue mutation. Each handler is wrapped with the admin guard, which
/// answers 403 for valid tokens without the admin flag.
///
/// Templates shared with the public module (`/api/films`, `/api/films/{id}`) add
/// methods to the existing entries, so e.g. `GET /api/films/7` stays public while
/// `DELETE /api/films/7` needs an admin token.
pub fn admin_routes(builder: RouteTableBuilder, state: &AppState) -> RouteTableBuilder {
    let admin = |handler: BoxHandler| require_auth(true, state.tokens.clone(), handler);

    builder
        // --- Films ---
        .post(
            "/api/films",
            admin(with_state(handlers::create_film, state.clone())),
        )
        // PATCH merges the given fields; PUT replaces the film and its cast.
        .patch(
            "/api/films/{id}",
            admin(with_state(handlers::update_film, state.clone())),
        )
        .put(
            "/api/films/{id}",
            admin(with_state(handlers::replace_film, state.clone())),
        )
        .delete(
            "/api/films/{id}",
            admin(with_state(handlers::delete_film, state.clone())),
        )
        // --- Actors ---
        .post(
            "/api/actors",
            admin(with_state(handlers::create_actor, state.clone())),
        )
        .patch(
            "/api/actors/{id}",
            admin(with_state(handlers::update_actor, state.clone())),
        )
        .put(
            "/api/actors/{id}",
            admin(with_state(handlers::replace_actor, state.clone())),
        )
        // Removes the actor together with their film links.
        .delete(
            "/api/actors/{id}",
            admin(with_state(handlers::delete_actor, state.clone())),
        )
}
