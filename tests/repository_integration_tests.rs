use chrono::{NaiveDate, Utc};
use film_library::{
    models::{ActorChanges, FilmChanges, FilmFilter, FilmSortField, NewActor, NewFilm, SortOrder},
    repository::{PostgresRepository, RepoError, Repository},
};
use sqlx::PgPool;

// --- Test Context and Setup ---

/// Holds the pool of the database the migrations were applied to.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Suffix that keeps rows of concurrent or repeated runs apart.
fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

fn date(d: u32, m: u32, y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_film(title: &str, rating: i32) -> NewFilm {
    NewFilm {
        title: title.to_owned(),
        description: "integration".to_owned(),
        release_date: date(1, 1, 2000),
        rating,
    }
}

fn new_actor(name: &str) -> NewActor {
    NewActor {
        name: name.to_owned(),
        gender: false,
        birth_date: date(1, 1, 1970),
    }
}

// --- Users ---

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_insert_and_duplicate() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = unique("user");

    let user = repo.insert_user(&username).await.unwrap();
    assert!(!user.is_admin);

    let duplicate = repo.insert_user(&username).await;
    assert!(matches!(duplicate, Err(RepoError::UsernameTaken)));

    let found = repo.find_user_by_username(&username).await.unwrap();
    assert_eq!(found.id, user.id);

    let missing = repo.find_user_by_username(&unique("ghost")).await;
    assert!(matches!(missing, Err(RepoError::UserNotFound)));
}

// --- Films ---

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_film_with_actors_round_trip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let actor = repo.insert_actor(new_actor(&unique("actor"))).await.unwrap();
    let title = unique("film");
    let film = repo
        .insert_film(new_film(&title, 7), &[actor.id])
        .await
        .unwrap();

    let fetched = repo.get_film(film.id).await.unwrap();
    assert_eq!(fetched.film.title, title);
    assert_eq!(fetched.actors.len(), 1);
    assert_eq!(fetched.actors[0].id, actor.id);

    let actors = repo.list_actors().await.unwrap();
    let listed = actors.iter().find(|a| a.actor.id == actor.id).unwrap();
    assert_eq!(listed.films[0].id, film.id);

    repo.delete_film(film.id).await.unwrap();
    assert!(matches!(
        repo.get_film(film.id).await,
        Err(RepoError::FilmNotFound)
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_actor_rolls_back_film_insert() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let title = unique("orphan");

    let result = repo.insert_film(new_film(&title, 5), &[i64::MAX]).await;
    assert!(matches!(result, Err(RepoError::UnknownActor(id)) if id == i64::MAX));

    let filter = FilmFilter {
        title: Some(title),
        ..Default::default()
    };
    assert!(repo.list_films(&filter).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_partial_update_and_link_replacement() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let first = repo.insert_actor(new_actor(&unique("first"))).await.unwrap();
    let second = repo.insert_actor(new_actor(&unique("second"))).await.unwrap();
    let film = repo
        .insert_film(new_film(&unique("update"), 3), &[first.id])
        .await
        .unwrap();

    let changes = FilmChanges {
        rating: Some(6),
        ..Default::default()
    };
    let updated = repo
        .update_film(film.id, changes, Some(&[second.id][..]))
        .await
        .unwrap();
    assert_eq!(updated.rating, 6);
    assert_eq!(updated.title, film.title);

    let fetched = repo.get_film(film.id).await.unwrap();
    assert_eq!(fetched.actors.len(), 1);
    assert_eq!(fetched.actors[0].id, second.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_listing_filters_by_actor_and_sorts() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let name = unique("Star");
    let actor = repo.insert_actor(new_actor(&name)).await.unwrap();
    for (title, rating) in [("b-low", 2), ("a-high", 9)] {
        repo.insert_film(new_film(&unique(title), rating), &[actor.id])
            .await
            .unwrap();
    }

    let filter = FilmFilter {
        actor_name: Some(name.to_lowercase()),
        ..Default::default()
    };
    let ratings: Vec<i32> = repo
        .list_films(&filter)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.film.rating)
        .collect();
    assert_eq!(ratings, vec![9, 2]);

    let filter = FilmFilter {
        actor_name: Some(name),
        sort: FilmSortField::Title,
        order: SortOrder::Asc,
        ..Default::default()
    };
    let films = repo.list_films(&filter).await.unwrap();
    assert!(films[0].film.title.starts_with("a-high"));
}

// --- Actors ---

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_actor_update_and_delete() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let actor = repo.insert_actor(new_actor(&unique("actor"))).await.unwrap();
    let changes = ActorChanges {
        gender: Some(true),
        ..Default::default()
    };
    let updated = repo.update_actor(actor.id, changes).await.unwrap();
    assert!(updated.gender);
    assert_eq!(updated.name, actor.name);

    repo.delete_actor(actor.id).await.unwrap();
    assert!(matches!(
        repo.delete_actor(actor.id).await,
        Err(RepoError::ActorNotFound)
    ));
    assert!(matches!(
        repo.update_actor(actor.id, ActorChanges::default()).await,
        Err(RepoError::ActorNotFound)
    ));
}
