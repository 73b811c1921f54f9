use chrono::NaiveDate;
use film_library::models::{
    ActorCreateBody, ActorReplaceBody, ActorUpdateBody, Film, FilmCreateBody, FilmFilter,
    FilmListQuery, FilmReplaceBody, FilmSortField, FilmUpdateBody, FilmWithActors, SortOrder,
    UserRegisterBody, ValidationError,
};
use serde_json::json;

fn film_body() -> FilmCreateBody {
    FilmCreateBody {
        title: "The Matrix".into(),
        description: "A hacker learns the truth.".into(),
        release_date: "31.03.1999".into(),
        rating: 9,
        actors_ids: None,
    }
}

// --- Users ---

#[test]
fn username_length_is_bounded() {
    let ok = UserRegisterBody {
        username: "neo".into(),
    };
    assert_eq!(ok.validate().unwrap(), "neo");

    let empty = UserRegisterBody {
        username: String::new(),
    };
    assert_eq!(empty.validate(), Err(ValidationError::UsernameLength));

    let long = UserRegisterBody {
        username: "x".repeat(101),
    };
    assert_eq!(long.validate(), Err(ValidationError::UsernameLength));

    let max = UserRegisterBody {
        username: "x".repeat(100),
    };
    assert!(max.validate().is_ok());
}

// --- Films ---

#[test]
fn film_create_parses_day_first_dates() {
    let (film, actors) = film_body().validate().unwrap();
    assert_eq!(film.release_date, NaiveDate::from_ymd_opt(1999, 3, 31).unwrap());
    assert!(actors.is_empty());
}

#[test]
fn film_create_rejects_each_bad_field() {
    let mut body = film_body();
    body.title = String::new();
    assert_eq!(body.validate().unwrap_err(), ValidationError::FilmTitleLength);

    let mut body = film_body();
    body.title = "t".repeat(151);
    assert_eq!(body.validate().unwrap_err(), ValidationError::FilmTitleLength);

    let mut body = film_body();
    body.description = "d".repeat(1001);
    assert_eq!(
        body.validate().unwrap_err(),
        ValidationError::FilmDescriptionLength
    );

    let mut body = film_body();
    body.release_date = "1999-03-31".into();
    assert_eq!(body.validate().unwrap_err(), ValidationError::FilmReleaseDate);

    let mut body = film_body();
    body.rating = 11;
    assert_eq!(body.validate().unwrap_err(), ValidationError::FilmRating);

    let mut body = film_body();
    body.rating = -1;
    assert_eq!(body.validate().unwrap_err(), ValidationError::FilmRating);

    let mut body = film_body();
    body.actors_ids = Some(vec![]);
    assert_eq!(body.validate().unwrap_err(), ValidationError::EmptyActorsIds);
}

#[test]
fn film_create_deduplicates_actor_ids() {
    let mut body = film_body();
    body.actors_ids = Some(vec![3, 1, 3, 2, 1]);
    let (_, actors) = body.validate().unwrap();
    assert_eq!(actors, vec![3, 1, 2]);
}

#[test]
fn film_update_checks_only_present_fields() {
    let (changes, actors) = FilmUpdateBody::default().validate().unwrap();
    assert!(changes.title.is_none() && changes.rating.is_none());
    assert!(actors.is_none());

    let body = FilmUpdateBody {
        rating: Some(0),
        release_date: Some("01.01.2000".into()),
        ..Default::default()
    };
    let (changes, _) = body.validate().unwrap();
    assert_eq!(changes.rating, Some(0));
    assert_eq!(changes.release_date, NaiveDate::from_ymd_opt(2000, 1, 1));

    let body = FilmUpdateBody {
        actors_ids: Some(vec![]),
        ..Default::default()
    };
    assert_eq!(body.validate().unwrap_err(), ValidationError::EmptyActorsIds);
}

#[test]
fn film_replace_without_actors_clears_links() {
    let body = FilmReplaceBody {
        title: "Alien".into(),
        description: String::new(),
        release_date: "25.05.1979".into(),
        rating: 8,
        actors_ids: None,
    };
    let (changes, actors) = body.validate().unwrap();
    assert_eq!(changes.title.as_deref(), Some("Alien"));
    assert_eq!(changes.description.as_deref(), Some(""));
    assert!(actors.is_empty());
}

#[test]
fn film_serializes_dates_in_wire_format() {
    let entry = FilmWithActors {
        film: Film {
            id: 1,
            title: "Heat".into(),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(1995, 12, 15).unwrap(),
            rating: 8,
        },
        actors: vec![],
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 1,
            "title": "Heat",
            "description": "",
            "release_date": "15.12.1995",
            "rating": 8,
            "actors": []
        })
    );
}

// --- Actors ---

#[test]
fn actor_create_requires_gender_and_valid_date() {
    let body: ActorCreateBody =
        serde_json::from_value(json!({"name": "Keanu Reeves", "birth_date": "02.09.1964"}))
            .unwrap();
    assert_eq!(body.validate(), Err(ValidationError::ActorGenderMissing));

    let body = ActorCreateBody {
        name: "Keanu Reeves".into(),
        gender: Some(true),
        birth_date: "31.02.1964".into(),
    };
    assert_eq!(body.validate(), Err(ValidationError::ActorBirthDate));

    let body = ActorCreateBody {
        name: String::new(),
        gender: Some(true),
        birth_date: "02.09.1964".into(),
    };
    assert_eq!(body.validate(), Err(ValidationError::ActorNameLength));
}

#[test]
fn actor_update_and_replace() {
    let changes = ActorUpdateBody {
        gender: Some(false),
        ..Default::default()
    }
    .validate()
    .unwrap();
    assert_eq!(changes.gender, Some(false));
    assert!(changes.name.is_none() && changes.birth_date.is_none());

    let replace = ActorReplaceBody {
        name: "Carrie-Anne Moss".into(),
        gender: None,
        birth_date: "21.08.1967".into(),
    };
    assert_eq!(replace.validate(), Err(ValidationError::ActorGenderMissing));
}

// --- Listing parameters ---

#[test]
fn list_query_defaults_to_rating_desc() {
    let filter = FilmFilter::try_from(FilmListQuery::default()).unwrap();
    assert_eq!(filter.sort, FilmSortField::Rating);
    assert_eq!(filter.order, SortOrder::Desc);
    assert_eq!(filter.title, None);
}

#[test]
fn list_query_rejects_unknown_sort_or_order() {
    let query = FilmListQuery {
        sort_by: Some("budget".into()),
        ..Default::default()
    };
    assert_eq!(FilmFilter::try_from(query), Err(ValidationError::SortBy));

    let query = FilmListQuery {
        order: Some("up".into()),
        ..Default::default()
    };
    assert_eq!(FilmFilter::try_from(query), Err(ValidationError::Order));
}

#[test]
fn list_query_treats_empty_values_as_absent() {
    let query = FilmListQuery {
        sort_by: Some(String::new()),
        order: Some("asc".into()),
        title: Some(String::new()),
        actor_name: Some("reeves".into()),
    };
    let filter = FilmFilter::try_from(query).unwrap();
    assert_eq!(filter.sort, FilmSortField::Rating);
    assert_eq!(filter.order, SortOrder::Asc);
    assert_eq!(filter.title, None);
    assert_eq!(filter.actor_name.as_deref(), Some("reeves"));
}

#[test]
fn validation_messages_are_client_facing() {
    assert_eq!(
        ValidationError::EmptyActorsIds.to_string(),
        "empty actors_ids array provided"
    );
    assert_eq!(
        ValidationError::SortBy.to_string(),
        "invalid sort_by query parameter, should be one of: title, rating, release_date"
    );
}
