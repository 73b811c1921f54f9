use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Validation Limits ---

pub const USERNAME_MAX_LEN: usize = 100;
pub const ACTOR_NAME_MAX_LEN: usize = 100;
pub const FILM_TITLE_MAX_LEN: usize = 150;
pub const FILM_DESCRIPTION_MAX_LEN: usize = 1000;
pub const FILM_RATING_MAX: i32 = 10;

/// ValidationError
///
/// Field-level rejections of request bodies and query strings. The messages are
/// part of the public API: clients receive them verbatim in the `message` field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid length of username field, must be of length 1 to 100")]
    UsernameLength,

    #[error("invalid length of name field, must be of length 1 to 100")]
    ActorNameLength,
    #[error("invalid format of birth_date field, must be in format DD.MM.YYYY")]
    ActorBirthDate,
    #[error("missing gender field, must be boolean value")]
    ActorGenderMissing,

    #[error("invalid length of title field, must be of length 1 to 150")]
    FilmTitleLength,
    #[error("invalid length of description field, must be of length 0 to 1000")]
    FilmDescriptionLength,
    #[error("invalid format of release_date field, must be in format DD.MM.YYYY")]
    FilmReleaseDate,
    #[error("invalid value of rating field, must be in range 0 to 10")]
    FilmRating,
    #[error("empty actors_ids array provided")]
    EmptyActorsIds,

    #[error("invalid sort_by query parameter, should be one of: title, rating, release_date")]
    SortBy,
    #[error("invalid order query parameter, should be one of: asc, desc")]
    Order,
}

/// date_format
///
/// Wire format for calendar dates (`DD.MM.YYYY`). Used through `#[serde(with)]` on
/// entity fields; request bodies carry raw strings and go through [`date_format::parse`]
/// so that a bad date yields a field-specific validation message.
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d.%m.%Y";

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date `{raw}`")))
    }
}

// --- Entities (Mapped to Database) ---

/// User
///
/// A registered account from the `users` table. There is no password: the username
/// alone identifies the account. `is_admin` is only ever changed directly in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// Film
///
/// A row of the `film` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(with = "date_format")]
    #[ts(type = "string")]
    #[schema(value_type = String, example = "24.12.1999")]
    pub release_date: NaiveDate,
    pub rating: i32,
}

/// Actor
///
/// A row of the `actor` table. `gender` is stored as a plain boolean flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub gender: bool,
    #[serde(with = "date_format")]
    #[ts(type = "string")]
    #[schema(value_type = String, example = "01.07.1964")]
    pub birth_date: NaiveDate,
}

/// FilmWithActors
///
/// A film together with every actor linked to it through `films_actors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FilmWithActors {
    #[serde(flatten)]
    pub film: Film,
    pub actors: Vec<Actor>,
}

/// ActorWithFilms
///
/// An actor together with every film they are linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActorWithFilms {
    #[serde(flatten)]
    pub actor: Actor,
    pub films: Vec<Film>,
}

// --- Validated Inputs (Handed to the Repository) ---

#[derive(Debug, Clone, PartialEq)]
pub struct NewFilm {
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub rating: i32,
}

/// Column updates for a film. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilmChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActor {
    pub name: String,
    pub gender: bool,
    pub birth_date: NaiveDate,
}

/// Column updates for an actor. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActorChanges {
    pub name: Option<String>,
    pub gender: Option<bool>,
    pub birth_date: Option<NaiveDate>,
}

// --- Request Payloads ---

/// UserRegisterBody
///
/// Registration payload (POST /api/auth/register). Username only, no password.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserRegisterBody {
    pub username: String,
}

/// UserLoginBody
///
/// Login payload (POST /api/auth/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserLoginBody {
    pub username: String,
}

/// LoginResponse
///
/// The signed bearer token issued on a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
}

/// FilmCreateBody
///
/// Payload for POST /api/films. `actors_ids`, when given, links the new film to
/// existing actors in the same transaction as the insert.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FilmCreateBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[schema(example = "24.12.1999")]
    pub release_date: String,
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors_ids: Option<Vec<i64>>,
}

/// FilmUpdateBody
///
/// Partial update payload for PATCH /api/films/{id}. Absent fields are left as they are;
/// a present `actors_ids` replaces the film's actor links.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FilmUpdateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors_ids: Option<Vec<i64>>,
}

/// FilmReplaceBody
///
/// Full replacement payload for PUT /api/films/{id}. The film's actor links are reset
/// to exactly `actors_ids` (no links when absent).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FilmReplaceBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub release_date: String,
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors_ids: Option<Vec<i64>>,
}

/// ActorCreateBody
///
/// Payload for POST /api/actors.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActorCreateBody {
    pub name: String,
    #[serde(default)]
    pub gender: Option<bool>,
    #[schema(example = "01.07.1964")]
    pub birth_date: String,
}

/// ActorUpdateBody
///
/// Partial update payload for PATCH /api/actors/{id}.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActorUpdateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// ActorReplaceBody
///
/// Full replacement payload for PUT /api/actors/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActorReplaceBody {
    pub name: String,
    #[serde(default)]
    pub gender: Option<bool>,
    pub birth_date: String,
}

// --- Field Rules ---

fn check_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len == 0 || len > USERNAME_MAX_LEN {
        return Err(ValidationError::UsernameLength);
    }
    Ok(())
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 || len > FILM_TITLE_MAX_LEN {
        return Err(ValidationError::FilmTitleLength);
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > FILM_DESCRIPTION_MAX_LEN {
        return Err(ValidationError::FilmDescriptionLength);
    }
    Ok(())
}

fn check_rating(rating: i32) -> Result<(), ValidationError> {
    if !(0..=FILM_RATING_MAX).contains(&rating) {
        return Err(ValidationError::FilmRating);
    }
    Ok(())
}

fn check_actor_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 || len > ACTOR_NAME_MAX_LEN {
        return Err(ValidationError::ActorNameLength);
    }
    Ok(())
}

fn parse_release_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    date_format::parse(raw).ok_or(ValidationError::FilmReleaseDate)
}

fn parse_birth_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    date_format::parse(raw).ok_or(ValidationError::ActorBirthDate)
}

/// Rejects an explicitly empty list and drops repeated ids, keeping first occurrence order.
fn check_actor_ids(ids: Vec<i64>) -> Result<Vec<i64>, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptyActorsIds);
    }
    Ok(unique_ids(ids))
}

fn unique_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

impl UserRegisterBody {
    pub fn validate(self) -> Result<String, ValidationError> {
        check_username(&self.username)?;
        Ok(self.username)
    }
}

impl UserLoginBody {
    pub fn validate(self) -> Result<String, ValidationError> {
        check_username(&self.username)?;
        Ok(self.username)
    }
}

impl FilmCreateBody {
    pub fn validate(self) -> Result<(NewFilm, Vec<i64>), ValidationError> {
        check_title(&self.title)?;
        check_description(&self.description)?;
        let release_date = parse_release_date(&self.release_date)?;
        check_rating(self.rating)?;
        let actor_ids = match self.actors_ids {
            Some(ids) => check_actor_ids(ids)?,
            None => Vec::new(),
        };

        let film = NewFilm {
            title: self.title,
            description: self.description,
            release_date,
            rating: self.rating,
        };
        Ok((film, actor_ids))
    }
}

impl FilmUpdateBody {
    pub fn validate(self) -> Result<(FilmChanges, Option<Vec<i64>>), ValidationError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        let release_date = self.release_date.as_deref().map(parse_release_date).transpose()?;
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        let actor_ids = self.actors_ids.map(check_actor_ids).transpose()?;

        let changes = FilmChanges {
            title: self.title,
            description: self.description,
            release_date,
            rating: self.rating,
        };
        Ok((changes, actor_ids))
    }
}

impl FilmReplaceBody {
    pub fn validate(self) -> Result<(FilmChanges, Vec<i64>), ValidationError> {
        check_title(&self.title)?;
        check_description(&self.description)?;
        let release_date = parse_release_date(&self.release_date)?;
        check_rating(self.rating)?;

        let changes = FilmChanges {
            title: Some(self.title),
            description: Some(self.description),
            release_date: Some(release_date),
            rating: Some(self.rating),
        };
        Ok((changes, unique_ids(self.actors_ids.unwrap_or_default())))
    }
}

impl ActorCreateBody {
    pub fn validate(self) -> Result<NewActor, ValidationError> {
        check_actor_name(&self.name)?;
        let gender = self.gender.ok_or(ValidationError::ActorGenderMissing)?;
        let birth_date = parse_birth_date(&self.birth_date)?;
        Ok(NewActor {
            name: self.name,
            gender,
            birth_date,
        })
    }
}

impl ActorUpdateBody {
    pub fn validate(self) -> Result<ActorChanges, ValidationError> {
        if let Some(name) = &self.name {
            check_actor_name(name)?;
        }
        let birth_date = self.birth_date.as_deref().map(parse_birth_date).transpose()?;
        Ok(ActorChanges {
            name: self.name,
            gender: self.gender,
            birth_date,
        })
    }
}

impl ActorReplaceBody {
    pub fn validate(self) -> Result<ActorChanges, ValidationError> {
        check_actor_name(&self.name)?;
        let gender = self.gender.ok_or(ValidationError::ActorGenderMissing)?;
        let birth_date = parse_birth_date(&self.birth_date)?;
        Ok(ActorChanges {
            name: Some(self.name),
            gender: Some(gender),
            birth_date: Some(birth_date),
        })
    }
}

// --- Film Listing Parameters ---

/// FilmListQuery
///
/// Raw query string of GET /api/films. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilmListQuery {
    /// One of `title`, `rating`, `release_date`. Defaults to `rating`.
    pub sort_by: Option<String>,
    /// One of `asc`, `desc`. Defaults to `desc`.
    pub order: Option<String>,
    /// Case-insensitive substring of the film title.
    pub title: Option<String>,
    /// Case-insensitive substring of the name of any actor in the film.
    pub actor_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilmSortField {
    Title,
    #[default]
    Rating,
    ReleaseDate,
}

impl FilmSortField {
    /// Column name; safe to splice into SQL since it comes from this closed set.
    pub fn column(self) -> &'static str {
        match self {
            FilmSortField::Title => "title",
            FilmSortField::Rating => "rating",
            FilmSortField::ReleaseDate => "release_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// FilmFilter
///
/// Validated form of [`FilmListQuery`] consumed by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilmFilter {
    pub sort: FilmSortField,
    pub order: SortOrder,
    pub title: Option<String>,
    pub actor_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<FilmListQuery> for FilmFilter {
    type Error = ValidationError;

    fn try_from(query: FilmListQuery) -> Result<Self, Self::Error> {
        let sort = match non_empty(query.sort_by).as_deref() {
            None => FilmSortField::default(),
            Some("title") => FilmSortField::Title,
            Some("rating") => FilmSortField::Rating,
            Some("release_date") => FilmSortField::ReleaseDate,
            Some(_) => return Err(ValidationError::SortBy),
        };
        let order = match non_empty(query.order).as_deref() {
            None => SortOrder::default(),
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(_) => return Err(ValidationError::Order),
        };

        Ok(FilmFilter {
            sort,
            order,
            title: non_empty(query.title),
            actor_name: non_empty(query.actor_name),
        })
    }
}
