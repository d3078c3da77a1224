use chrono::NaiveDate;

use crate::error::Result;
use crate::filter::MovieFilter;
use crate::model::{
    Actor, Cinema, Genre, Movie, MovieGraph, MovieWrite, NewActor, NewCinema, NewGenre, NewRating,
    Rating,
};
use crate::pagination::{Page, Pagination};

/// Persistent catalog collections.
///
/// Every method is blocking; handlers call them through `web::block`.
/// Updates and deletes return `None`/`false` when the id does not exist.
pub trait CatalogStore: Send + Sync {
    fn genres(&self) -> Result<Vec<Genre>>;
    fn genre(&self, id: i32) -> Result<Option<Genre>>;
    fn insert_genre(&self, genre: NewGenre) -> Result<Genre>;
    fn update_genre(&self, id: i32, genre: NewGenre) -> Result<Option<Genre>>;
    fn delete_genre(&self, id: i32) -> Result<bool>;

    fn cinemas(&self) -> Result<Vec<Cinema>>;
    fn cinema(&self, id: i32) -> Result<Option<Cinema>>;
    fn insert_cinema(&self, cinema: NewCinema) -> Result<Cinema>;
    fn update_cinema(&self, id: i32, cinema: NewCinema) -> Result<Option<Cinema>>;
    fn delete_cinema(&self, id: i32) -> Result<bool>;

    /// Actors ordered by name.
    fn actors(&self, pagination: &Pagination) -> Result<Page<Actor>>;
    fn actor(&self, id: i32) -> Result<Option<Actor>>;
    /// Case-insensitive name search, ordered by name.
    fn actors_by_name(&self, fragment: &str, limit: i64) -> Result<Vec<Actor>>;
    fn insert_actor(&self, actor: NewActor) -> Result<Actor>;
    /// A `None` photo keeps the stored one.
    fn update_actor(&self, id: i32, actor: NewActor) -> Result<Option<Actor>>;
    /// Returns the deleted actor so its photo can be removed. The cast of
    /// every movie the actor appeared in is renumbered from 0.
    fn delete_actor(&self, id: i32) -> Result<Option<Actor>>;

    fn movie(&self, id: i32) -> Result<Option<Movie>>;
    fn movie_graph(&self, id: i32) -> Result<Option<MovieGraph>>;
    /// Movies matching `filter`, ordered by id, windowed by `pagination`.
    /// `Page::total` counts every match before the window is applied.
    fn filter_movies(&self, filter: &MovieFilter, pagination: &Pagination) -> Result<Page<Movie>>;
    /// Movies released after `today`, soonest first.
    fn upcoming_movies(&self, today: NaiveDate, limit: i64) -> Result<Vec<Movie>>;
    /// Movies in theaters by release date.
    fn movies_in_theaters(&self, limit: i64) -> Result<Vec<Movie>>;
    /// Inserts the movie and its join rows in one transaction.
    fn insert_movie(&self, movie: MovieWrite) -> Result<Movie>;
    /// Replaces scalar fields and every join row in one transaction. A `None`
    /// poster keeps the stored one.
    fn update_movie(&self, id: i32, movie: MovieWrite) -> Result<Option<Movie>>;
    /// Deletes the movie, its join rows and its ratings.
    fn delete_movie(&self, id: i32) -> Result<Option<Movie>>;

    fn movie_ratings(&self, movie_id: i32) -> Result<Vec<Rating>>;
    /// One row per (user, movie); the last submitted score wins.
    fn upsert_rating(&self, rating: NewRating) -> Result<Rating>;
}
