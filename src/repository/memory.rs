use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RepoError, Repository};
use crate::models::{
    Actor, ActorChanges, ActorWithFilms, Film, FilmChanges, FilmFilter, FilmSortField,
    FilmWithActors, NewActor, NewFilm, SortOrder, User,
};

#[derive(Default)]
struct Store {
    users: BTreeMap<i64, User>,
    films: BTreeMap<i64, Film>,
    actors: BTreeMap<i64, Actor>,
    /// (film_id, actor_id)
    links: BTreeSet<(i64, i64)>,
    next_user_id: i64,
    next_film_id: i64,
    next_actor_id: i64,
}

impl Store {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    /// Fails on the first id without a stored actor.
    fn check_actors(&self, actor_ids: &[i64]) -> Result<(), RepoError> {
        match actor_ids.iter().find(|id| !self.actors.contains_key(id)) {
            Some(&missing) => Err(RepoError::UnknownActor(missing)),
            None => Ok(()),
        }
    }

    fn actors_of(&self, film_id: i64) -> Vec<Actor> {
        self.links
            .range((film_id, i64::MIN)..=(film_id, i64::MAX))
            .filter_map(|(_, actor_id)| self.actors.get(actor_id).cloned())
            .collect()
    }

    fn films_of(&self, actor_id: i64) -> Vec<Film> {
        self.links
            .iter()
            .filter(|(_, a)| *a == actor_id)
            .filter_map(|(film_id, _)| self.films.get(film_id).cloned())
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// InMemoryRepository
///
/// A [`Repository`] kept entirely in process memory. It mirrors the constraints of the
/// SQL schema (unique usernames, actor links to existing actors, cascading deletes)
/// so the full HTTP stack can be exercised without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user directly, bypassing registration. Admin rights can only be
    /// granted this way, as in the database.
    pub async fn seed_user(&self, username: &str, is_admin: bool) -> User {
        let mut store = self.store.write().await;
        let id = Store::next_id(&mut store.next_user_id);
        let user = User {
            id,
            username: username.to_owned(),
            is_admin,
        };
        store.users.insert(id, user.clone());
        user
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_user(&self, username: &str) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.users.values().any(|u| u.username == username) {
            return Err(RepoError::UsernameTaken);
        }
        let id = Store::next_id(&mut store.next_user_id);
        let user = User {
            id,
            username: username.to_owned(),
            is_admin: false,
        };
        store.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<User, RepoError> {
        let store = self.store.read().await;
        store
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(RepoError::UserNotFound)
    }

    async fn insert_film(&self, film: NewFilm, actor_ids: &[i64]) -> Result<Film, RepoError> {
        let mut store = self.store.write().await;
        store.check_actors(actor_ids)?;

        let id = Store::next_id(&mut store.next_film_id);
        let created = Film {
            id,
            title: film.title,
            description: film.description,
            release_date: film.release_date,
            rating: film.rating,
        };
        store.films.insert(id, created.clone());
        for &actor_id in actor_ids {
            store.links.insert((id, actor_id));
        }
        Ok(created)
    }

    async fn update_film(
        &self,
        id: i64,
        changes: FilmChanges,
        actor_ids: Option<&[i64]>,
    ) -> Result<Film, RepoError> {
        let mut store = self.store.write().await;
        if !store.films.contains_key(&id) {
            return Err(RepoError::FilmNotFound);
        }
        if let Some(actor_ids) = actor_ids {
            store.check_actors(actor_ids)?;
        }

        let updated = {
            let film = store.films.get_mut(&id).ok_or(RepoError::FilmNotFound)?;
            if let Some(title) = changes.title {
                film.title = title;
            }
            if let Some(description) = changes.description {
                film.description = description;
            }
            if let Some(release_date) = changes.release_date {
                film.release_date = release_date;
            }
            if let Some(rating) = changes.rating {
                film.rating = rating;
            }
            film.clone()
        };

        if let Some(actor_ids) = actor_ids {
            store.links.retain(|(film_id, _)| *film_id != id);
            for &actor_id in actor_ids {
                store.links.insert((id, actor_id));
            }
        }
        Ok(updated)
    }

    async fn delete_film(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.films.remove(&id).ok_or(RepoError::FilmNotFound)?;
        store.links.retain(|(film_id, _)| *film_id != id);
        Ok(())
    }

    async fn get_film(&self, id: i64) -> Result<FilmWithActors, RepoError> {
        let store = self.store.read().await;
        let film = store.films.get(&id).cloned().ok_or(RepoError::FilmNotFound)?;
        Ok(FilmWithActors {
            actors: store.actors_of(id),
            film,
        })
    }

    async fn list_films(&self, filter: &FilmFilter) -> Result<Vec<FilmWithActors>, RepoError> {
        let store = self.store.read().await;

        let mut films: Vec<FilmWithActors> = store
            .films
            .values()
            .filter(|film| {
                filter
                    .title
                    .as_deref()
                    .is_none_or(|needle| contains_ignore_case(&film.title, needle))
            })
            .map(|film| FilmWithActors {
                film: film.clone(),
                actors: store.actors_of(film.id),
            })
            .filter(|entry| {
                filter.actor_name.as_deref().is_none_or(|needle| {
                    entry
                        .actors
                        .iter()
                        .any(|actor| contains_ignore_case(&actor.name, needle))
                })
            })
            .collect();

        films.sort_by(|a, b| {
            let ordering = match filter.sort {
                FilmSortField::Title => a.film.title.cmp(&b.film.title),
                FilmSortField::Rating => a.film.rating.cmp(&b.film.rating),
                FilmSortField::ReleaseDate => a.film.release_date.cmp(&b.film.release_date),
            };
            let ordering = match filter.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then(a.film.id.cmp(&b.film.id))
        });

        Ok(films)
    }

    async fn insert_actor(&self, actor: NewActor) -> Result<Actor, RepoError> {
        let mut store = self.store.write().await;
        let id = Store::next_id(&mut store.next_actor_id);
        let created = Actor {
            id,
            name: actor.name,
            gender: actor.gender,
            birth_date: actor.birth_date,
        };
        store.actors.insert(id, created.clone());
        Ok(created)
    }

    async fn update_actor(&self, id: i64, changes: ActorChanges) -> Result<Actor, RepoError> {
        let mut store = self.store.write().await;
        let actor = store.actors.get_mut(&id).ok_or(RepoError::ActorNotFound)?;
        if let Some(name) = changes.name {
            actor.name = name;
        }
        if let Some(gender) = changes.gender {
            actor.gender = gender;
        }
        if let Some(birth_date) = changes.birth_date {
            actor.birth_date = birth_date;
        }
        Ok(actor.clone())
    }

    async fn delete_actor(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.actors.remove(&id).ok_or(RepoError::ActorNotFound)?;
        store.links.retain(|(_, actor_id)| *actor_id != id);
        Ok(())
    }

    async fn list_actors(&self) -> Result<Vec<ActorWithFilms>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .actors
            .values()
            .map(|actor| ActorWithFilms {
                actor: actor.clone(),
                films: store.films_of(actor.id),
            })
            .collect())
    }
}
