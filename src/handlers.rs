use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::Claims,
    error::{ApiError, ErrorBody},
    extract::JsonBody,
    models::{
        Actor, ActorCreateBody, ActorReplaceBody, ActorUpdateBody, ActorWithFilms, Film,
        FilmCreateBody, FilmListQuery, FilmReplaceBody, FilmUpdateBody, FilmWithActors,
        LoginResponse, User, UserLoginBody, UserRegisterBody,
    },
    router::PathParams,
};

// --- Service ---

/// ping
///
/// Liveness probe for monitoring and load balancers.
#[utoipa::path(
    get,
    path = "/ping",
    responses((status = 200, description = "Alive", body = String))
)]
pub async fn ping() -> &'static str {
    "pong"
}

// --- Auth ---

/// register
///
/// [Public Route] Creates an account for the given username. New accounts never have
/// admin rights.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = UserRegisterBody,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 409, description = "Username taken", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserRegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users().register(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// login
///
/// [Public Route] Exchanges a registered username for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = UserLoginBody,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid body or unknown user", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserLoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(state.users().login(body).await?))
}

/// me
///
/// [Authenticated Route] Echoes the verified claims of the caller's token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Token claims", body = Claims),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    )
)]
pub async fn me(claims: Claims) -> Json<Claims> {
    Json(claims)
}

// --- Films ---

/// list_films
///
/// [Public Route] Lists films with their actors, sorted and optionally filtered by
/// title and actor name.
#[utoipa::path(
    get,
    path = "/api/films",
    params(FilmListQuery),
    responses(
        (status = 200, description = "Films", body = [FilmWithActors]),
        (status = 400, description = "Invalid sort parameters", body = ErrorBody)
    )
)]
pub async fn list_films(
    State(state): State<AppState>,
    query: Result<Query<FilmListQuery>, QueryRejection>,
) -> Result<Json<Vec<FilmWithActors>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.films().list(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/films/{id}",
    params(("id" = i64, Path, description = "Film ID")),
    responses(
        (status = 200, description = "Found", body = FilmWithActors),
        (status = 404, description = "No such film", body = ErrorBody)
    )
)]
pub async fn get_film(
    State(state): State<AppState>,
    params: PathParams,
) -> Result<Json<FilmWithActors>, ApiError> {
    let id = params.parse::<i64>("id")?;
    Ok(Json(state.films().get(id).await?))
}

/// create_film
///
/// [Admin Route] Creates a film, linking it to `actors_ids` when given.
#[utoipa::path(
    post,
    path = "/api/films",
    request_body = FilmCreateBody,
    responses(
        (status = 201, description = "Created", body = Film),
        (status = 400, description = "Invalid body or unknown actor", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody)
    )
)]
pub async fn create_film(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<FilmCreateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let film = state.films().create(body).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

/// update_film
///
/// [Admin Route] Partial update of a film.
#[utoipa::path(
    patch,
    path = "/api/films/{id}",
    params(("id" = i64, Path, description = "Film ID")),
    request_body = FilmUpdateBody,
    responses(
        (status = 200, description = "Updated", body = Film),
        (status = 404, description = "No such film", body = ErrorBody)
    )
)]
pub async fn update_film(
    State(state): State<AppState>,
    params: PathParams,
    JsonBody(body): JsonBody<FilmUpdateBody>,
) -> Result<Json<Film>, ApiError> {
    let id = params.parse::<i64>("id")?;
    Ok(Json(state.films().update(id, body).await?))
}

/// replace_film
///
/// [Admin Route] Overwrites every field of a film and resets its actor links.
#[utoipa::path(
    put,
    path = "/api/films/{id}",
    params(("id" = i64, Path, description = "Film ID")),
    request_body = FilmReplaceBody,
    responses(
        (status = 200, description = "Replaced", body = Film),
        (status = 404, description = "No such film", body = ErrorBody)
    )
)]
pub async fn replace_film(
    State(state): State<AppState>,
    params: PathParams,
    JsonBody(body): JsonBody<FilmReplaceBody>,
) -> Result<Json<Film>, ApiError> {
    let id = params.parse::<i64>("id")?;
    Ok(Json(state.films().replace(id, body).await?))
}

#[utoipa::path(
    delete,
    path = "/api/films/{id}",
    params(("id" = i64, Path, description = "Film ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such film", body = ErrorBody)
    )
)]
pub async fn delete_film(
    State(state): State<AppState>,
    params: PathParams,
) -> Result<StatusCode, ApiError> {
    let id = params.parse::<i64>("id")?;
    state.films().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Actors ---

/// list_actors
///
/// [Authenticated Route] Lists actors with the films they appear in.
#[utoipa::path(
    get,
    path = "/api/actors",
    responses(
        (status = 200, description = "Actors", body = [ActorWithFilms]),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    )
)]
pub async fn list_actors(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActorWithFilms>>, ApiError> {
    Ok(Json(state.actors().list().await?))
}

#[utoipa::path(
    post,
    path = "/api/actors",
    request_body = ActorCreateBody,
    responses(
        (status = 201, description = "Created", body = Actor),
        (status = 400, description = "Invalid body", body = ErrorBody)
    )
)]
pub async fn create_actor(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ActorCreateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = state.actors().create(body).await?;
    Ok((StatusCode::CREATED, Json(actor)))
}

#[utoipa::path(
    patch,
    path = "/api/actors/{id}",
    params(("id" = i64, Path, description = "Actor ID")),
    request_body = ActorUpdateBody,
    responses(
        (status = 200, description = "Updated", body = Actor),
        (status = 404, description = "No such actor", body = ErrorBody)
    )
)]
pub async fn update_actor(
    State(state): State<AppState>,
    params: PathParams,
    JsonBody(body): JsonBody<ActorUpdateBody>,
) -> Result<Json<Actor>, ApiError> {
    let id = params.parse::<i64>("id")?;
    Ok(Json(state.actors().update(id, body).await?))
}

#[utoipa::path(
    put,
    path = "/api/actors/{id}",
    params(("id" = i64, Path, description = "Actor ID")),
    request_body = ActorReplaceBody,
    responses(
        (status = 200, description = "Replaced", body = Actor),
        (status = 404, description = "No such actor", body = ErrorBody)
    )
)]
pub async fn replace_actor(
    State(state): State<AppState>,
    params: PathParams,
    JsonBody(body): JsonBody<ActorReplaceBody>,
) -> Result<Json<Actor>, ApiError> {
    let id = params.parse::<i64>("id")?;
    Ok(Json(state.actors().replace(id, body).await?))
}

/// delete_actor
///
/// [Admin Route] Removes an actor; their film links are removed with them.
#[utoipa::path(
    delete,
    path = "/api/actors/{id}",
    params(("id" = i64, Path, description = "Actor ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such actor", body = ErrorBody)
    )
)]
pub async fn delete_actor(
    State(state): State<AppState>,
    params: PathParams,
) -> Result<StatusCode, ApiError> {
    let id = params.parse::<i64>("id")?;
    state.actors().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
