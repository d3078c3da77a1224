use chrono::NaiveDate;
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = genres)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = genres)]
pub struct NewGenre {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = cinemas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Cinema {
    pub id: i32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = cinemas)]
pub struct NewCinema {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = actors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
    pub birth_date: NaiveDate,
    pub photo: Option<String>,
}

/// Scalar fields of an actor as submitted by a create or update.
///
/// On update a `None` photo keeps the stored one.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = actors)]
pub struct NewActor {
    pub name: String,
    pub biography: Option<String>,
    pub birth_date: NaiveDate,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = movies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub summary: Option<String>,
    pub trailer: Option<String>,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    pub poster: Option<String>,
}

/// Scalar fields of a movie as submitted by a create or update.
///
/// On update a `None` poster keeps the stored one.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = movies)]
pub struct NewMovie {
    pub title: String,
    pub summary: Option<String>,
    pub trailer: Option<String>,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = movies_actors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MovieActor {
    pub movie_id: i32,
    pub actor_id: i32,
    pub character_name: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = movies_genres)]
pub struct MovieGenre {
    pub movie_id: i32,
    pub genre_id: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = movies_cinemas)]
pub struct MovieCinema {
    pub movie_id: i32,
    pub cinema_id: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Rating {
    pub id: i32,
    pub user_id: Uuid,
    pub movie_id: i32,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = ratings)]
pub struct NewRating {
    pub user_id: Uuid,
    pub movie_id: i32,
    pub score: i32,
}

/// A cast entry of a movie being written. `sort_order` is assigned by
/// [`crate::movies::write_actor_order`] before the write reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CastEntry {
    pub actor_id: i32,
    pub character_name: Option<String>,
    pub sort_order: i32,
}

/// Full replacement of a movie: scalar fields plus every join row.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieWrite {
    pub movie: NewMovie,
    pub genre_ids: Vec<i32>,
    pub cinema_ids: Vec<i32>,
    pub cast: Vec<CastEntry>,
}

/// A movie with its join rows populated.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieGraph {
    pub movie: Movie,
    pub genres: Vec<Genre>,
    /// Ordered by the stored `sort_order`.
    pub cast: Vec<(MovieActor, Actor)>,
    pub cinemas: Vec<Cinema>,
}
