use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction, query_builder::QueryBuilder};

use super::{RepoError, Repository};
use crate::models::{
    Actor, ActorChanges, ActorWithFilms, Film, FilmChanges, FilmFilter, FilmWithActors, NewActor,
    NewFilm, User,
};

const FILM_COLUMNS: &str = "id, title, description, release_date, rating";
const ACTOR_COLUMNS: &str = "id, name, gender, birth_date";

/// A linked actor together with the film it was fetched for.
#[derive(FromRow)]
struct FilmActorRow {
    film_id: i64,
    #[sqlx(flatten)]
    actor: Actor,
}

/// A linked film together with the actor it was fetched for.
#[derive(FromRow)]
struct ActorFilmRow {
    actor_id: i64,
    #[sqlx(flatten)]
    film: Film,
}

/// PostgresRepository
///
/// The [`Repository`] backed by PostgreSQL. All queries are runtime-checked and fully
/// parameterized; the only spliced SQL fragments (sort column, direction) come from
/// closed enums.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Actors of each of the given films, keyed by film id.
    async fn actors_by_film(&self, film_ids: &[i64]) -> Result<HashMap<i64, Vec<Actor>>, RepoError> {
        let rows = sqlx::query_as::<_, FilmActorRow>(
            r#"
            SELECT fa.film_id, a.id, a.name, a.gender, a.birth_date
            FROM films_actors fa
            JOIN actor a ON a.id = fa.actor_id
            WHERE fa.film_id = ANY($1)
            ORDER BY a.id
            "#,
        )
        .bind(film_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Actor>> = HashMap::new();
        for row in rows {
            grouped.entry(row.film_id).or_default().push(row.actor);
        }
        Ok(grouped)
    }

    /// Films of each of the given actors, keyed by actor id.
    async fn films_by_actor(&self, actor_ids: &[i64]) -> Result<HashMap<i64, Vec<Film>>, RepoError> {
        let rows = sqlx::query_as::<_, ActorFilmRow>(
            r#"
            SELECT fa.actor_id, f.id, f.title, f.description, f.release_date, f.rating
            FROM films_actors fa
            JOIN film f ON f.id = fa.film_id
            WHERE fa.actor_id = ANY($1)
            ORDER BY f.id
            "#,
        )
        .bind(actor_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Film>> = HashMap::new();
        for row in rows {
            grouped.entry(row.actor_id).or_default().push(row.film);
        }
        Ok(grouped)
    }
}

/// Inserts one `films_actors` row per id inside the caller's transaction.
async fn link_actors(
    tx: &mut Transaction<'_, Postgres>,
    film_id: i64,
    actor_ids: &[i64],
) -> Result<(), RepoError> {
    for &actor_id in actor_ids {
        sqlx::query("INSERT INTO films_actors (film_id, actor_id) VALUES ($1, $2)")
            .bind(film_id)
            .bind(actor_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return RepoError::UnknownActor(actor_id);
                    }
                }
                RepoError::Database(e)
            })?;
    }
    Ok(())
}

/// Escapes LIKE wildcards so user input is matched as a plain substring.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert_user(&self, username: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username) VALUES ($1) RETURNING id, username, is_admin",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepoError::UsernameTaken;
                }
            }
            RepoError::Database(e)
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>("SELECT id, username, is_admin FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::UserNotFound)
    }

    /// insert_film
    ///
    /// Inserts the film and its actor links in one transaction. A dangling actor id
    /// aborts the whole insert with `UnknownActor`.
    async fn insert_film(&self, film: NewFilm, actor_ids: &[i64]) -> Result<Film, RepoError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Film>(&format!(
            "INSERT INTO film (title, description, release_date, rating) \
             VALUES ($1, $2, $3, $4) RETURNING {FILM_COLUMNS}"
        ))
        .bind(film.title)
        .bind(film.description)
        .bind(film.release_date)
        .bind(film.rating)
        .fetch_one(&mut *tx)
        .await?;

        link_actors(&mut tx, created.id, actor_ids).await?;
        tx.commit().await?;

        tracing::debug!(film_id = created.id, actors = actor_ids.len(), "film inserted");
        Ok(created)
    }

    /// update_film
    ///
    /// `COALESCE` keeps the stored value for every column whose change is `None`.
    async fn update_film(
        &self,
        id: i64,
        changes: FilmChanges,
        actor_ids: Option<&[i64]>,
    ) -> Result<Film, RepoError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Film>(&format!(
            r#"
            UPDATE film
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                release_date = COALESCE($4, release_date),
                rating = COALESCE($5, rating)
            WHERE id = $1
            RETURNING {FILM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.release_date)
        .bind(changes.rating)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepoError::FilmNotFound)?;

        if let Some(actor_ids) = actor_ids {
            sqlx::query("DELETE FROM films_actors WHERE film_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_actors(&mut tx, id, actor_ids).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_film(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM film WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::FilmNotFound);
        }
        Ok(())
    }

    async fn get_film(&self, id: i64) -> Result<FilmWithActors, RepoError> {
        let film = sqlx::query_as::<_, Film>(&format!("SELECT {FILM_COLUMNS} FROM film WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::FilmNotFound)?;

        let actors = self
            .actors_by_film(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(FilmWithActors { film, actors })
    }

    /// list_films
    ///
    /// Builds the listing query with `QueryBuilder`: filter values are bound, the sort
    /// column and direction come from `FilmFilter`'s enums. Ties are broken by id.
    async fn list_films(&self, filter: &FilmFilter) -> Result<Vec<FilmWithActors>, RepoError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {FILM_COLUMNS} FROM film WHERE TRUE"));

        if let Some(title) = &filter.title {
            builder.push(" AND title ILIKE ");
            builder.push_bind(like_pattern(title));
        }

        if let Some(actor_name) = &filter.actor_name {
            builder.push(
                " AND EXISTS (SELECT 1 FROM films_actors fa JOIN actor a ON a.id = fa.actor_id \
                 WHERE fa.film_id = film.id AND a.name ILIKE ",
            );
            builder.push_bind(like_pattern(actor_name));
            builder.push(")");
        }

        builder.push(format!(
            " ORDER BY {} {}, id ASC",
            filter.sort.column(),
            filter.order.keyword()
        ));

        let films = builder.build_query_as::<Film>().fetch_all(&self.pool).await?;

        let ids: Vec<i64> = films.iter().map(|f| f.id).collect();
        let mut actors = self.actors_by_film(&ids).await?;

        Ok(films
            .into_iter()
            .map(|film| FilmWithActors {
                actors: actors.remove(&film.id).unwrap_or_default(),
                film,
            })
            .collect())
    }

    async fn insert_actor(&self, actor: NewActor) -> Result<Actor, RepoError> {
        let created = sqlx::query_as::<_, Actor>(&format!(
            "INSERT INTO actor (name, gender, birth_date) VALUES ($1, $2, $3) RETURNING {ACTOR_COLUMNS}"
        ))
        .bind(actor.name)
        .bind(actor.gender)
        .bind(actor.birth_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_actor(&self, id: i64, changes: ActorChanges) -> Result<Actor, RepoError> {
        sqlx::query_as::<_, Actor>(&format!(
            r#"
            UPDATE actor
            SET name = COALESCE($2, name),
                gender = COALESCE($3, gender),
                birth_date = COALESCE($4, birth_date)
            WHERE id = $1
            RETURNING {ACTOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.gender)
        .bind(changes.birth_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::ActorNotFound)
    }

    /// Links to the actor's films go with it (`ON DELETE CASCADE`).
    async fn delete_actor(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM actor WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::ActorNotFound);
        }
        Ok(())
    }

    async fn list_actors(&self) -> Result<Vec<ActorWithFilms>, RepoError> {
        let actors =
            sqlx::query_as::<_, Actor>(&format!("SELECT {ACTOR_COLUMNS} FROM actor ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        let ids: Vec<i64> = actors.iter().map(|a| a.id).collect();
        let mut films = self.films_by_actor(&ids).await?;

        Ok(actors
            .into_iter()
            .map(|actor| ActorWithFilms {
                films: films.remove(&actor.id).unwrap_or_default(),
                actor,
            })
            .collect())
    }
}
