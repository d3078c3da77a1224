//! In-process catalog used by the handler tests. Mirrors the ordering and
//! cascade rules of the PostgreSQL store.

use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use chrono::NaiveDate;

use crate::error::Result;
use crate::filter::{contains_ignore_case, MovieFilter};
use crate::model::{
    Actor, Cinema, Genre, Movie, MovieActor, MovieCinema, MovieGenre, MovieGraph, MovieWrite,
    NewActor, NewCinema, NewGenre, NewRating, Rating,
};
use crate::pagination::{Page, Pagination};
use crate::store::CatalogStore;

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    genres: Vec<Genre>,
    cinemas: Vec<Cinema>,
    actors: Vec<Actor>,
    movies: Vec<Movie>,
    movies_actors: Vec<MovieActor>,
    movies_genres: Vec<MovieGenre>,
    movies_cinemas: Vec<MovieCinema>,
    ratings: Vec<Rating>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn genre_ids_of(&self, movie_id: i32) -> Vec<i32> {
        self.movies_genres
            .iter()
            .filter(|row| row.movie_id == movie_id)
            .map(|row| row.genre_id)
            .collect()
    }

    fn renumber_cast(&mut self, movie_id: i32) {
        let mut rows: Vec<&mut MovieActor> = self
            .movies_actors
            .iter_mut()
            .filter(|row| row.movie_id == movie_id)
            .collect();
        rows.sort_by_key(|row| row.sort_order);
        for (index, row) in rows.into_iter().enumerate() {
            row.sort_order = index as i32;
        }
    }

    fn replace_links(&mut self, movie_id: i32, write: &MovieWrite) {
        self.movies_genres.retain(|row| row.movie_id != movie_id);
        self.movies_cinemas.retain(|row| row.movie_id != movie_id);
        self.movies_actors.retain(|row| row.movie_id != movie_id);

        self.movies_genres
            .extend(write.genre_ids.iter().map(|genre_id| MovieGenre {
                movie_id,
                genre_id: *genre_id,
            }));
        self.movies_cinemas
            .extend(write.cinema_ids.iter().map(|cinema_id| MovieCinema {
                movie_id,
                cinema_id: *cinema_id,
            }));
        self.movies_actors
            .extend(write.cast.iter().map(|entry| MovieActor {
                movie_id,
                actor_id: entry.actor_id,
                character_name: entry.character_name.clone(),
                sort_order: entry.sort_order,
            }));
    }
}

#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: Mutex<Tables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("catalog lock poisoned").into())
    }

    /// Join rows of a movie, for asserting cascades.
    pub fn link_counts(&self, movie_id: i32) -> (usize, usize, usize) {
        let tables = self.tables.lock().unwrap();
        (
            tables.movies_genres.iter().filter(|r| r.movie_id == movie_id).count(),
            tables.movies_cinemas.iter().filter(|r| r.movie_id == movie_id).count(),
            tables.movies_actors.iter().filter(|r| r.movie_id == movie_id).count(),
        )
    }
}

fn by_name<T>(items: &mut [T], name: impl Fn(&T) -> (&str, i32)) {
    items.sort_by(|a, b| name(a).cmp(&name(b)));
}

impl CatalogStore for MemoryCatalogStore {
    fn genres(&self) -> Result<Vec<Genre>> {
        let mut genres = self.tables()?.genres.clone();
        by_name(&mut genres, |g| (g.name.as_str(), g.id));
        Ok(genres)
    }

    fn genre(&self, id: i32) -> Result<Option<Genre>> {
        Ok(self.tables()?.genres.iter().find(|g| g.id == id).cloned())
    }

    fn insert_genre(&self, genre: NewGenre) -> Result<Genre> {
        let mut tables = self.tables()?;
        let genre = Genre {
            id: tables.next_id(),
            name: genre.name,
        };
        tables.genres.push(genre.clone());
        Ok(genre)
    }

    fn update_genre(&self, id: i32, genre: NewGenre) -> Result<Option<Genre>> {
        let mut tables = self.tables()?;
        Ok(tables.genres.iter_mut().find(|g| g.id == id).map(|stored| {
            stored.name = genre.name;
            stored.clone()
        }))
    }

    fn delete_genre(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables()?;
        let before = tables.genres.len();
        tables.genres.retain(|g| g.id != id);
        tables.movies_genres.retain(|row| row.genre_id != id);
        Ok(tables.genres.len() < before)
    }

    fn cinemas(&self) -> Result<Vec<Cinema>> {
        let mut cinemas = self.tables()?.cinemas.clone();
        by_name(&mut cinemas, |c| (c.name.as_str(), c.id));
        Ok(cinemas)
    }

    fn cinema(&self, id: i32) -> Result<Option<Cinema>> {
        Ok(self.tables()?.cinemas.iter().find(|c| c.id == id).cloned())
    }

    fn insert_cinema(&self, cinema: NewCinema) -> Result<Cinema> {
        let mut tables = self.tables()?;
        let cinema = Cinema {
            id: tables.next_id(),
            name: cinema.name,
            latitude: cinema.latitude,
            longitude: cinema.longitude,
        };
        tables.cinemas.push(cinema.clone());
        Ok(cinema)
    }

    fn update_cinema(&self, id: i32, cinema: NewCinema) -> Result<Option<Cinema>> {
        let mut tables = self.tables()?;
        Ok(tables.cinemas.iter_mut().find(|c| c.id == id).map(|stored| {
            stored.name = cinema.name;
            stored.latitude = cinema.latitude;
            stored.longitude = cinema.longitude;
            stored.clone()
        }))
    }

    fn delete_cinema(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables()?;
        let before = tables.cinemas.len();
        tables.cinemas.retain(|c| c.id != id);
        tables.movies_cinemas.retain(|row| row.cinema_id != id);
        Ok(tables.cinemas.len() < before)
    }

    fn actors(&self, pagination: &Pagination) -> Result<Page<Actor>> {
        let mut actors = self.tables()?.actors.clone();
        by_name(&mut actors, |a| (a.name.as_str(), a.id));
        Ok(Page {
            total: actors.len() as i64,
            items: pagination.slice(actors),
        })
    }

    fn actor(&self, id: i32) -> Result<Option<Actor>> {
        Ok(self.tables()?.actors.iter().find(|a| a.id == id).cloned())
    }

    fn actors_by_name(&self, fragment: &str, limit: i64) -> Result<Vec<Actor>> {
        let mut actors: Vec<Actor> = self
            .tables()?
            .actors
            .iter()
            .filter(|a| contains_ignore_case(&a.name, fragment))
            .cloned()
            .collect();
        by_name(&mut actors, |a| (a.name.as_str(), a.id));
        actors.truncate(limit.max(0) as usize);
        Ok(actors)
    }

    fn insert_actor(&self, actor: NewActor) -> Result<Actor> {
        let mut tables = self.tables()?;
        let actor = Actor {
            id: tables.next_id(),
            name: actor.name,
            biography: actor.biography,
            birth_date: actor.birth_date,
            photo: actor.photo,
        };
        tables.actors.push(actor.clone());
        Ok(actor)
    }

    fn update_actor(&self, id: i32, actor: NewActor) -> Result<Option<Actor>> {
        let mut tables = self.tables()?;
        Ok(tables.actors.iter_mut().find(|a| a.id == id).map(|stored| {
            stored.name = actor.name;
            stored.biography = actor.biography;
            stored.birth_date = actor.birth_date;
            if actor.photo.is_some() {
                stored.photo = actor.photo;
            }
            stored.clone()
        }))
    }

    fn delete_actor(&self, id: i32) -> Result<Option<Actor>> {
        let mut tables = self.tables()?;
        let position = tables.actors.iter().position(|a| a.id == id);
        Ok(position.map(|index| {
            let movie_ids: Vec<i32> = tables
                .movies_actors
                .iter()
                .filter(|row| row.actor_id == id)
                .map(|row| row.movie_id)
                .collect();
            tables.movies_actors.retain(|row| row.actor_id != id);
            for movie_id in movie_ids {
                tables.renumber_cast(movie_id);
            }
            tables.actors.remove(index)
        }))
    }

    fn movie(&self, id: i32) -> Result<Option<Movie>> {
        Ok(self.tables()?.movies.iter().find(|m| m.id == id).cloned())
    }

    fn movie_graph(&self, id: i32) -> Result<Option<MovieGraph>> {
        let tables = self.tables()?;
        let Some(movie) = tables.movies.iter().find(|m| m.id == id).cloned() else {
            return Ok(None);
        };

        let mut genres: Vec<Genre> = tables
            .movies_genres
            .iter()
            .filter(|row| row.movie_id == id)
            .filter_map(|row| tables.genres.iter().find(|g| g.id == row.genre_id).cloned())
            .collect();
        by_name(&mut genres, |g| (g.name.as_str(), g.id));

        let mut cast: Vec<(MovieActor, Actor)> = tables
            .movies_actors
            .iter()
            .filter(|row| row.movie_id == id)
            .filter_map(|row| {
                tables
                    .actors
                    .iter()
                    .find(|a| a.id == row.actor_id)
                    .map(|actor| (row.clone(), actor.clone()))
            })
            .collect();
        cast.sort_by_key(|(row, _)| row.sort_order);

        let mut cinemas: Vec<Cinema> = tables
            .movies_cinemas
            .iter()
            .filter(|row| row.movie_id == id)
            .filter_map(|row| tables.cinemas.iter().find(|c| c.id == row.cinema_id).cloned())
            .collect();
        by_name(&mut cinemas, |c| (c.name.as_str(), c.id));

        Ok(Some(MovieGraph {
            movie,
            genres,
            cast,
            cinemas,
        }))
    }

    fn filter_movies(&self, filter: &MovieFilter, pagination: &Pagination) -> Result<Page<Movie>> {
        let tables = self.tables()?;
        let mut matching: Vec<Movie> = tables
            .movies
            .iter()
            .filter(|movie| filter.matches(movie, &tables.genre_ids_of(movie.id)))
            .cloned()
            .collect();
        matching.sort_by_key(|movie| movie.id);
        Ok(Page {
            total: matching.len() as i64,
            items: pagination.slice(matching),
        })
    }

    fn upcoming_movies(&self, today: NaiveDate, limit: i64) -> Result<Vec<Movie>> {
        let mut movies: Vec<Movie> = self
            .tables()?
            .movies
            .iter()
            .filter(|m| m.release_date > today)
            .cloned()
            .collect();
        movies.sort_by_key(|m| (m.release_date, m.id));
        movies.truncate(limit.max(0) as usize);
        Ok(movies)
    }

    fn movies_in_theaters(&self, limit: i64) -> Result<Vec<Movie>> {
        let mut movies: Vec<Movie> = self
            .tables()?
            .movies
            .iter()
            .filter(|m| m.in_theaters)
            .cloned()
            .collect();
        movies.sort_by_key(|m| (m.release_date, m.id));
        movies.truncate(limit.max(0) as usize);
        Ok(movies)
    }

    fn insert_movie(&self, write: MovieWrite) -> Result<Movie> {
        let mut tables = self.tables()?;
        let fields = write.movie.clone();
        let movie = Movie {
            id: tables.next_id(),
            title: fields.title,
            summary: fields.summary,
            trailer: fields.trailer,
            in_theaters: fields.in_theaters,
            release_date: fields.release_date,
            poster: fields.poster,
        };
        tables.movies.push(movie.clone());
        tables.replace_links(movie.id, &write);
        Ok(movie)
    }

    fn update_movie(&self, id: i32, write: MovieWrite) -> Result<Option<Movie>> {
        let mut tables = self.tables()?;
        let fields = write.movie.clone();
        let Some(stored) = tables.movies.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        stored.title = fields.title;
        stored.summary = fields.summary;
        stored.trailer = fields.trailer;
        stored.in_theaters = fields.in_theaters;
        stored.release_date = fields.release_date;
        if fields.poster.is_some() {
            stored.poster = fields.poster;
        }
        let movie = stored.clone();
        tables.replace_links(id, &write);
        Ok(Some(movie))
    }

    fn delete_movie(&self, id: i32) -> Result<Option<Movie>> {
        let mut tables = self.tables()?;
        let Some(index) = tables.movies.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        tables.movies_genres.retain(|row| row.movie_id != id);
        tables.movies_cinemas.retain(|row| row.movie_id != id);
        tables.movies_actors.retain(|row| row.movie_id != id);
        tables.ratings.retain(|row| row.movie_id != id);
        Ok(Some(tables.movies.remove(index)))
    }

    fn movie_ratings(&self, movie_id: i32) -> Result<Vec<Rating>> {
        Ok(self
            .tables()?
            .ratings
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    fn upsert_rating(&self, rating: NewRating) -> Result<Rating> {
        let mut tables = self.tables()?;
        if let Some(stored) = tables
            .ratings
            .iter_mut()
            .find(|r| r.user_id == rating.user_id && r.movie_id == rating.movie_id)
        {
            stored.score = rating.score;
            return Ok(stored.clone());
        }
        let rating = Rating {
            id: tables.next_id(),
            user_id: rating.user_id,
            movie_id: rating.movie_id,
            score: rating.score,
        };
        tables.ratings.push(rating.clone());
        Ok(rating)
    }
}
