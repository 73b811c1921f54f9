pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    Actor, ActorChanges, ActorWithFilms, Film, FilmChanges, FilmFilter, FilmWithActors, NewActor,
    NewFilm, User,
};

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Persistence outcomes the use cases react to. The `Display` text of the domain
/// variants is what the client ends up seeing.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("film with provided id was not found")]
    FilmNotFound,
    #[error("actor with provided id was not found")]
    ActorNotFound,
    /// An `actors_ids` entry that does not name an existing actor.
    #[error("actor with id {0} was not found")]
    UnknownActor(i64),
    #[error("user with provided username was not found")]
    UserNotFound,
    #[error("user with provided username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// The persistence contract used by the use cases. Implemented by
/// [`PostgresRepository`] for the running service and by [`InMemoryRepository`]
/// for tests; both must behave identically.
///
/// Writes that touch several tables (a film plus its actor links) are atomic: on any
/// error nothing is stored.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn insert_user(&self, username: &str) -> Result<User, RepoError>;
    async fn find_user_by_username(&self, username: &str) -> Result<User, RepoError>;

    // --- Films ---
    async fn insert_film(&self, film: NewFilm, actor_ids: &[i64]) -> Result<Film, RepoError>;
    /// Applies `changes`; when `actor_ids` is given the film's links are replaced by it.
    async fn update_film(
        &self,
        id: i64,
        changes: FilmChanges,
        actor_ids: Option<&[i64]>,
    ) -> Result<Film, RepoError>;
    async fn delete_film(&self, id: i64) -> Result<(), RepoError>;
    async fn get_film(&self, id: i64) -> Result<FilmWithActors, RepoError>;
    async fn list_films(&self, filter: &FilmFilter) -> Result<Vec<FilmWithActors>, RepoError>;

    // --- Actors ---
    async fn insert_actor(&self, actor: NewActor) -> Result<Actor, RepoError>;
    async fn update_actor(&self, id: i64, changes: ActorChanges) -> Result<Actor, RepoError>;
    async fn delete_actor(&self, id: i64) -> Result<(), RepoError>;
    async fn list_actors(&self) -> Result<Vec<ActorWithFilms>, RepoError>;
}

/// RepositoryState
///
/// How the persistence layer is shared across the application state.
pub type RepositoryState = Arc<dyn Repository>;
