use chrono::NaiveDate;
use film_library::{
    models::{ActorChanges, FilmChanges, FilmFilter, FilmSortField, NewActor, NewFilm, SortOrder},
    repository::{InMemoryRepository, RepoError, Repository},
};

fn date(d: u32, m: u32, y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_film(title: &str, rating: i32, released: NaiveDate) -> NewFilm {
    NewFilm {
        title: title.into(),
        description: String::new(),
        release_date: released,
        rating,
    }
}

fn new_actor(name: &str) -> NewActor {
    NewActor {
        name: name.into(),
        gender: true,
        birth_date: date(1, 1, 1970),
    }
}

#[tokio::test]
async fn usernames_are_unique() {
    let repo = InMemoryRepository::new();
    let user = repo.insert_user("neo").await.unwrap();
    assert!(!user.is_admin);

    assert!(matches!(
        repo.insert_user("neo").await,
        Err(RepoError::UsernameTaken)
    ));
    assert_eq!(repo.find_user_by_username("neo").await.unwrap().id, user.id);
    assert!(matches!(
        repo.find_user_by_username("smith").await,
        Err(RepoError::UserNotFound)
    ));
}

#[tokio::test]
async fn film_insert_with_unknown_actor_stores_nothing() {
    let repo = InMemoryRepository::new();
    let actor = repo.insert_actor(new_actor("Keanu Reeves")).await.unwrap();

    let result = repo
        .insert_film(new_film("The Matrix", 9, date(31, 3, 1999)), &[actor.id, 99])
        .await;
    assert!(matches!(result, Err(RepoError::UnknownActor(99))));

    let all = repo.list_films(&FilmFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn film_links_show_up_on_both_sides() {
    let repo = InMemoryRepository::new();
    let keanu = repo.insert_actor(new_actor("Keanu Reeves")).await.unwrap();
    let carrie = repo.insert_actor(new_actor("Carrie-Anne Moss")).await.unwrap();

    let film = repo
        .insert_film(
            new_film("The Matrix", 9, date(31, 3, 1999)),
            &[keanu.id, carrie.id],
        )
        .await
        .unwrap();

    let fetched = repo.get_film(film.id).await.unwrap();
    let names: Vec<&str> = fetched.actors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Keanu Reeves", "Carrie-Anne Moss"]);

    let actors = repo.list_actors().await.unwrap();
    assert_eq!(actors.len(), 2);
    assert!(actors.iter().all(|a| a.films.len() == 1));
}

#[tokio::test]
async fn partial_update_keeps_unset_fields_and_replaces_links() {
    let repo = InMemoryRepository::new();
    let keanu = repo.insert_actor(new_actor("Keanu Reeves")).await.unwrap();
    let hugo = repo.insert_actor(new_actor("Hugo Weaving")).await.unwrap();
    let film = repo
        .insert_film(new_film("The Matrix", 9, date(31, 3, 1999)), &[keanu.id])
        .await
        .unwrap();

    let changes = FilmChanges {
        rating: Some(10),
        ..Default::default()
    };
    let updated = repo
        .update_film(film.id, changes, Some(&[hugo.id][..]))
        .await
        .unwrap();
    assert_eq!(updated.rating, 10);
    assert_eq!(updated.title, "The Matrix");

    let fetched = repo.get_film(film.id).await.unwrap();
    assert_eq!(fetched.actors.len(), 1);
    assert_eq!(fetched.actors[0].id, hugo.id);

    // Without actor ids the links stay as they are.
    repo.update_film(film.id, FilmChanges::default(), None)
        .await
        .unwrap();
    assert_eq!(repo.get_film(film.id).await.unwrap().actors.len(), 1);
}

#[tokio::test]
async fn failed_link_replacement_leaves_film_untouched() {
    let repo = InMemoryRepository::new();
    let film = repo
        .insert_film(new_film("Heat", 8, date(15, 12, 1995)), &[])
        .await
        .unwrap();

    let changes = FilmChanges {
        title: Some("Cold".into()),
        ..Default::default()
    };
    let result = repo.update_film(film.id, changes, Some(&[404][..])).await;
    assert!(matches!(result, Err(RepoError::UnknownActor(404))));
    assert_eq!(repo.get_film(film.id).await.unwrap().film.title, "Heat");
}

#[tokio::test]
async fn missing_rows_are_reported() {
    let repo = InMemoryRepository::new();
    assert!(matches!(repo.get_film(1).await, Err(RepoError::FilmNotFound)));
    assert!(matches!(repo.delete_film(1).await, Err(RepoError::FilmNotFound)));
    assert!(matches!(
        repo.update_film(1, FilmChanges::default(), None).await,
        Err(RepoError::FilmNotFound)
    ));
    assert!(matches!(
        repo.update_actor(1, ActorChanges::default()).await,
        Err(RepoError::ActorNotFound)
    ));
    assert!(matches!(repo.delete_actor(1).await, Err(RepoError::ActorNotFound)));
}

#[tokio::test]
async fn deleting_actor_drops_their_links() {
    let repo = InMemoryRepository::new();
    let keanu = repo.insert_actor(new_actor("Keanu Reeves")).await.unwrap();
    let film = repo
        .insert_film(new_film("Speed", 7, date(10, 6, 1994)), &[keanu.id])
        .await
        .unwrap();

    repo.delete_actor(keanu.id).await.unwrap();
    assert!(repo.get_film(film.id).await.unwrap().actors.is_empty());
}

#[tokio::test]
async fn listing_sorts_and_filters() {
    let repo = InMemoryRepository::new();
    let keanu = repo.insert_actor(new_actor("Keanu Reeves")).await.unwrap();
    repo.insert_film(new_film("Speed", 7, date(10, 6, 1994)), &[keanu.id])
        .await
        .unwrap();
    repo.insert_film(new_film("The Matrix", 9, date(31, 3, 1999)), &[keanu.id])
        .await
        .unwrap();
    repo.insert_film(new_film("Alien", 8, date(25, 5, 1979)), &[])
        .await
        .unwrap();

    let titles = |films: Vec<film_library::models::FilmWithActors>| -> Vec<String> {
        films.into_iter().map(|f| f.film.title).collect()
    };

    let by_rating = repo.list_films(&FilmFilter::default()).await.unwrap();
    assert_eq!(titles(by_rating), vec!["The Matrix", "Alien", "Speed"]);

    let by_date = FilmFilter {
        sort: FilmSortField::ReleaseDate,
        order: SortOrder::Asc,
        ..Default::default()
    };
    assert_eq!(
        titles(repo.list_films(&by_date).await.unwrap()),
        vec!["Alien", "Speed", "The Matrix"]
    );

    let by_title = FilmFilter {
        title: Some("MATRIX".into()),
        ..Default::default()
    };
    assert_eq!(titles(repo.list_films(&by_title).await.unwrap()), vec!["The Matrix"]);

    let by_actor = FilmFilter {
        sort: FilmSortField::Title,
        order: SortOrder::Asc,
        actor_name: Some("reeves".into()),
        ..Default::default()
    };
    assert_eq!(
        titles(repo.list_films(&by_actor).await.unwrap()),
        vec!["Speed", "The Matrix"]
    );
}

#[tokio::test]
async fn seeded_admin_is_found_by_username() {
    let repo = InMemoryRepository::new();
    let admin = repo.seed_user("root", true).await;
    let found = repo.find_user_by_username("root").await.unwrap();
    assert_eq!(found, admin);
    assert!(found.is_admin);
}
