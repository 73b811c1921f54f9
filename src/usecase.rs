use crate::{
    auth::TokenCodec,
    error::ApiError,
    models::{
        Actor, ActorCreateBody, ActorReplaceBody, ActorUpdateBody, ActorWithFilms, Film,
        FilmCreateBody, FilmFilter, FilmListQuery, FilmReplaceBody, FilmUpdateBody,
        FilmWithActors, LoginResponse, User, UserLoginBody, UserRegisterBody,
    },
    repository::RepositoryState,
};

/// UserUsecase
///
/// Username-only account flows: registration and token issuance.
#[derive(Clone)]
pub struct UserUsecase {
    repo: RepositoryState,
    tokens: TokenCodec,
}

impl UserUsecase {
    pub fn new(repo: RepositoryState, tokens: TokenCodec) -> Self {
        Self { repo, tokens }
    }

    pub async fn register(&self, body: UserRegisterBody) -> Result<User, ApiError> {
        let username = body.validate()?;
        let user = self.repo.insert_user(&username).await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Issues an access token carrying the stored admin flag of the user.
    pub async fn login(&self, body: UserLoginBody) -> Result<LoginResponse, ApiError> {
        let username = body.validate()?;
        let user = self.repo.find_user_by_username(&username).await?;
        let access_token = self.tokens.encode(user.id, &user.username, user.is_admin)?;
        tracing::info!(user_id = user.id, is_admin = user.is_admin, "access token issued");
        Ok(LoginResponse { access_token })
    }
}

/// FilmUsecase
#[derive(Clone)]
pub struct FilmUsecase {
    repo: RepositoryState,
}

impl FilmUsecase {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn create(&self, body: FilmCreateBody) -> Result<Film, ApiError> {
        let (film, actor_ids) = body.validate()?;
        Ok(self.repo.insert_film(film, &actor_ids).await?)
    }

    /// Partial update. Only the fields present in the body change; a present
    /// `actors_ids` replaces the film's cast.
    pub async fn update(&self, id: i64, body: FilmUpdateBody) -> Result<Film, ApiError> {
        let (changes, actor_ids) = body.validate()?;
        Ok(self
            .repo
            .update_film(id, changes, actor_ids.as_deref())
            .await?)
    }

    /// Full replacement. The cast is reset to exactly the given ids.
    pub async fn replace(&self, id: i64, body: FilmReplaceBody) -> Result<Film, ApiError> {
        let (changes, actor_ids) = body.validate()?;
        Ok(self.repo.update_film(id, changes, Some(actor_ids.as_slice())).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        Ok(self.repo.delete_film(id).await?)
    }

    pub async fn get(&self, id: i64) -> Result<FilmWithActors, ApiError> {
        Ok(self.repo.get_film(id).await?)
    }

    pub async fn list(&self, query: FilmListQuery) -> Result<Vec<FilmWithActors>, ApiError> {
        let filter = FilmFilter::try_from(query)?;
        Ok(self.repo.list_films(&filter).await?)
    }
}

/// ActorUsecase
#[derive(Clone)]
pub struct ActorUsecase {
    repo: RepositoryState,
}

impl ActorUsecase {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn create(&self, body: ActorCreateBody) -> Result<Actor, ApiError> {
        let actor = body.validate()?;
        Ok(self.repo.insert_actor(actor).await?)
    }

    pub async fn update(&self, id: i64, body: ActorUpdateBody) -> Result<Actor, ApiError> {
        let changes = body.validate()?;
        Ok(self.repo.update_actor(id, changes).await?)
    }

    pub async fn replace(&self, id: i64, body: ActorReplaceBody) -> Result<Actor, ApiError> {
        let changes = body.validate()?;
        Ok(self.repo.update_actor(id, changes).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        Ok(self.repo.delete_actor(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<ActorWithFilms>, ApiError> {
        Ok(self.repo.list_actors().await?)
    }
}
