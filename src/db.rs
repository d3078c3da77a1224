use chrono::NaiveDate;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::Result;
use crate::filter::{like_pattern, MovieFilter};
use crate::model::{
    Actor, Cinema, Genre, Movie, MovieActor, MovieCinema, MovieGenre, MovieGraph, MovieWrite,
    NewActor, NewCinema, NewGenre, NewRating, Rating,
};
use crate::pagination::{Page, Pagination};
use crate::schema::{
    actors, cinemas, genres, movies, movies_actors, movies_cinemas, movies_genres, ratings,
};
use crate::store::CatalogStore;
use crate::DbPool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    for migration in applied {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}

/// PostgreSQL catalog backed by an r2d2 pool of diesel connections.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }
}

fn filtered_movies(filter: &MovieFilter) -> movies::BoxedQuery<'static, Pg> {
    let mut query = movies::table.into_boxed();

    if let Some(title) = &filter.title {
        query = query.filter(movies::title.ilike(like_pattern(title)));
    }
    if filter.in_theaters {
        query = query.filter(movies::in_theaters.eq(true));
    }
    if filter.upcoming {
        query = query.filter(movies::release_date.gt(filter.today));
    }
    if let Some(genre_id) = filter.genre_id {
        query = query.filter(
            movies::id.eq_any(
                movies_genres::table
                    .filter(movies_genres::genre_id.eq(genre_id))
                    .select(movies_genres::movie_id),
            ),
        );
    }

    query
}

fn movie_page(filter: &MovieFilter, pagination: &Pagination) -> movies::BoxedQuery<'static, Pg> {
    filtered_movies(filter)
        .order(movies::id.asc())
        .offset(pagination.offset())
        .limit(pagination.records_per_page())
}

/// Drops every join row of the movie and writes the submitted ones.
fn replace_links(conn: &mut PgConnection, movie_id: i32, write: &MovieWrite) -> QueryResult<()> {
    diesel::delete(movies_genres::table.filter(movies_genres::movie_id.eq(movie_id)))
        .execute(conn)?;
    diesel::delete(movies_cinemas::table.filter(movies_cinemas::movie_id.eq(movie_id)))
        .execute(conn)?;
    diesel::delete(movies_actors::table.filter(movies_actors::movie_id.eq(movie_id)))
        .execute(conn)?;

    let genre_rows: Vec<MovieGenre> = write
        .genre_ids
        .iter()
        .map(|genre_id| MovieGenre {
            movie_id,
            genre_id: *genre_id,
        })
        .collect();
    if !genre_rows.is_empty() {
        diesel::insert_into(movies_genres::table)
            .values(&genre_rows)
            .execute(conn)?;
    }

    let cinema_rows: Vec<MovieCinema> = write
        .cinema_ids
        .iter()
        .map(|cinema_id| MovieCinema {
            movie_id,
            cinema_id: *cinema_id,
        })
        .collect();
    if !cinema_rows.is_empty() {
        diesel::insert_into(movies_cinemas::table)
            .values(&cinema_rows)
            .execute(conn)?;
    }

    let cast_rows: Vec<MovieActor> = write
        .cast
        .iter()
        .map(|entry| MovieActor {
            movie_id,
            actor_id: entry.actor_id,
            character_name: entry.character_name.clone(),
            sort_order: entry.sort_order,
        })
        .collect();
    if !cast_rows.is_empty() {
        diesel::insert_into(movies_actors::table)
            .values(&cast_rows)
            .execute(conn)?;
    }

    Ok(())
}

/// Rewrites the cast order of a movie as 0..n, keeping the current sequence.
fn renumber_cast(conn: &mut PgConnection, movie_id: i32) -> QueryResult<()> {
    let actor_ids = movies_actors::table
        .filter(movies_actors::movie_id.eq(movie_id))
        .order(movies_actors::sort_order.asc())
        .select(movies_actors::actor_id)
        .load::<i32>(conn)?;

    for (index, actor_id) in actor_ids.into_iter().enumerate() {
        diesel::update(
            movies_actors::table
                .filter(movies_actors::movie_id.eq(movie_id))
                .filter(movies_actors::actor_id.eq(actor_id)),
        )
        .set(movies_actors::sort_order.eq(index as i32))
        .execute(conn)?;
    }
    Ok(())
}

impl CatalogStore for PgCatalogStore {
    fn genres(&self) -> Result<Vec<Genre>> {
        let mut conn = self.conn()?;
        let genres = genres::table
            .order(genres::name.asc())
            .select(Genre::as_select())
            .load(&mut conn)?;
        Ok(genres)
    }

    fn genre(&self, id: i32) -> Result<Option<Genre>> {
        let mut conn = self.conn()?;
        let genre = genres::table
            .find(id)
            .select(Genre::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(genre)
    }

    fn insert_genre(&self, genre: NewGenre) -> Result<Genre> {
        let mut conn = self.conn()?;
        let genre = diesel::insert_into(genres::table)
            .values(&genre)
            .returning(Genre::as_returning())
            .get_result(&mut conn)?;
        Ok(genre)
    }

    fn update_genre(&self, id: i32, genre: NewGenre) -> Result<Option<Genre>> {
        let mut conn = self.conn()?;
        let genre = diesel::update(genres::table.find(id))
            .set(genres::name.eq(genre.name))
            .returning(Genre::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(genre)
    }

    fn delete_genre(&self, id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(genres::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn cinemas(&self) -> Result<Vec<Cinema>> {
        let mut conn = self.conn()?;
        let cinemas = cinemas::table
            .order(cinemas::name.asc())
            .select(Cinema::as_select())
            .load(&mut conn)?;
        Ok(cinemas)
    }

    fn cinema(&self, id: i32) -> Result<Option<Cinema>> {
        let mut conn = self.conn()?;
        let cinema = cinemas::table
            .find(id)
            .select(Cinema::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(cinema)
    }

    fn insert_cinema(&self, cinema: NewCinema) -> Result<Cinema> {
        let mut conn = self.conn()?;
        let cinema = diesel::insert_into(cinemas::table)
            .values(&cinema)
            .returning(Cinema::as_returning())
            .get_result(&mut conn)?;
        Ok(cinema)
    }

    fn update_cinema(&self, id: i32, cinema: NewCinema) -> Result<Option<Cinema>> {
        let mut conn = self.conn()?;
        let cinema = diesel::update(cinemas::table.find(id))
            .set((
                cinemas::name.eq(cinema.name),
                cinemas::latitude.eq(cinema.latitude),
                cinemas::longitude.eq(cinema.longitude),
            ))
            .returning(Cinema::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(cinema)
    }

    fn delete_cinema(&self, id: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(cinemas::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn actors(&self, pagination: &Pagination) -> Result<Page<Actor>> {
        let mut conn = self.conn()?;
        let total = actors::table.count().get_result::<i64>(&mut conn)?;
        let items = actors::table
            .order((actors::name.asc(), actors::id.asc()))
            .offset(pagination.offset())
            .limit(pagination.records_per_page())
            .select(Actor::as_select())
            .load(&mut conn)?;
        Ok(Page { total, items })
    }

    fn actor(&self, id: i32) -> Result<Option<Actor>> {
        let mut conn = self.conn()?;
        let actor = actors::table
            .find(id)
            .select(Actor::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(actor)
    }

    fn actors_by_name(&self, fragment: &str, limit: i64) -> Result<Vec<Actor>> {
        let mut conn = self.conn()?;
        let actors = actors::table
            .filter(actors::name.ilike(like_pattern(fragment)))
            .order((actors::name.asc(), actors::id.asc()))
            .limit(limit)
            .select(Actor::as_select())
            .load(&mut conn)?;
        Ok(actors)
    }

    fn insert_actor(&self, actor: NewActor) -> Result<Actor> {
        let mut conn = self.conn()?;
        let actor = diesel::insert_into(actors::table)
            .values(&actor)
            .returning(Actor::as_returning())
            .get_result(&mut conn)?;
        Ok(actor)
    }

    fn update_actor(&self, id: i32, actor: NewActor) -> Result<Option<Actor>> {
        let mut conn = self.conn()?;
        let actor = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let updated = diesel::update(actors::table.find(id))
                .set((
                    actors::name.eq(&actor.name),
                    actors::biography.eq(&actor.biography),
                    actors::birth_date.eq(actor.birth_date),
                ))
                .returning(Actor::as_returning())
                .get_result(conn)
                .optional()?;

            match (updated, &actor.photo) {
                (Some(_), Some(photo)) => diesel::update(actors::table.find(id))
                    .set(actors::photo.eq(Some(photo)))
                    .returning(Actor::as_returning())
                    .get_result(conn)
                    .map(Some),
                (updated, _) => Ok(updated),
            }
        })?;
        Ok(actor)
    }

    fn delete_actor(&self, id: i32) -> Result<Option<Actor>> {
        let mut conn = self.conn()?;
        let actor = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let movie_ids = movies_actors::table
                .filter(movies_actors::actor_id.eq(id))
                .select(movies_actors::movie_id)
                .load::<i32>(conn)?;

            let Some(actor) = diesel::delete(actors::table.find(id))
                .returning(Actor::as_returning())
                .get_result(conn)
                .optional()?
            else {
                return Ok(None);
            };

            for movie_id in movie_ids {
                renumber_cast(conn, movie_id)?;
            }
            Ok(Some(actor))
        })?;
        Ok(actor)
    }

    fn movie(&self, id: i32) -> Result<Option<Movie>> {
        let mut conn = self.conn()?;
        let movie = movies::table
            .find(id)
            .select(Movie::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(movie)
    }

    fn movie_graph(&self, id: i32) -> Result<Option<MovieGraph>> {
        let mut conn = self.conn()?;

        let Some(movie) = movies::table
            .find(id)
            .select(Movie::as_select())
            .first(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let genres = movies_genres::table
            .inner_join(genres::table)
            .filter(movies_genres::movie_id.eq(id))
            .order(genres::name.asc())
            .select(Genre::as_select())
            .load(&mut conn)?;

        let cast = movies_actors::table
            .inner_join(actors::table)
            .filter(movies_actors::movie_id.eq(id))
            .order(movies_actors::sort_order.asc())
            .select((MovieActor::as_select(), Actor::as_select()))
            .load::<(MovieActor, Actor)>(&mut conn)?;

        let cinemas = movies_cinemas::table
            .inner_join(cinemas::table)
            .filter(movies_cinemas::movie_id.eq(id))
            .order(cinemas::name.asc())
            .select(Cinema::as_select())
            .load(&mut conn)?;

        Ok(Some(MovieGraph {
            movie,
            genres,
            cast,
            cinemas,
        }))
    }

    fn filter_movies(&self, filter: &MovieFilter, pagination: &Pagination) -> Result<Page<Movie>> {
        let mut conn = self.conn()?;
        let total = filtered_movies(filter)
            .count()
            .get_result::<i64>(&mut conn)?;
        let items = movie_page(filter, pagination)
            .select(Movie::as_select())
            .load(&mut conn)?;
        Ok(Page { total, items })
    }

    fn upcoming_movies(&self, today: NaiveDate, limit: i64) -> Result<Vec<Movie>> {
        let mut conn = self.conn()?;
        let movies = movies::table
            .filter(movies::release_date.gt(today))
            .order((movies::release_date.asc(), movies::id.asc()))
            .limit(limit)
            .select(Movie::as_select())
            .load(&mut conn)?;
        Ok(movies)
    }

    fn movies_in_theaters(&self, limit: i64) -> Result<Vec<Movie>> {
        let mut conn = self.conn()?;
        let movies = movies::table
            .filter(movies::in_theaters.eq(true))
            .order((movies::release_date.asc(), movies::id.asc()))
            .limit(limit)
            .select(Movie::as_select())
            .load(&mut conn)?;
        Ok(movies)
    }

    fn insert_movie(&self, write: MovieWrite) -> Result<Movie> {
        let mut conn = self.conn()?;
        let movie = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let movie = diesel::insert_into(movies::table)
                .values(&write.movie)
                .returning(Movie::as_returning())
                .get_result(conn)?;
            replace_links(conn, movie.id, &write)?;
            Ok(movie)
        })?;
        Ok(movie)
    }

    fn update_movie(&self, id: i32, write: MovieWrite) -> Result<Option<Movie>> {
        let mut conn = self.conn()?;
        let movie = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let fields = &write.movie;
            let Some(mut movie) = diesel::update(movies::table.find(id))
                .set((
                    movies::title.eq(&fields.title),
                    movies::summary.eq(&fields.summary),
                    movies::trailer.eq(&fields.trailer),
                    movies::in_theaters.eq(fields.in_theaters),
                    movies::release_date.eq(fields.release_date),
                ))
                .returning(Movie::as_returning())
                .get_result(conn)
                .optional()?
            else {
                return Ok(None);
            };

            if let Some(poster) = &fields.poster {
                movie = diesel::update(movies::table.find(id))
                    .set(movies::poster.eq(Some(poster)))
                    .returning(Movie::as_returning())
                    .get_result(conn)?;
            }

            replace_links(conn, id, &write)?;
            Ok(Some(movie))
        })?;
        Ok(movie)
    }

    fn delete_movie(&self, id: i32) -> Result<Option<Movie>> {
        let mut conn = self.conn()?;
        let movie = diesel::delete(movies::table.find(id))
            .returning(Movie::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(movie)
    }

    fn movie_ratings(&self, movie_id: i32) -> Result<Vec<Rating>> {
        let mut conn = self.conn()?;
        let ratings = ratings::table
            .filter(ratings::movie_id.eq(movie_id))
            .select(Rating::as_select())
            .load(&mut conn)?;
        Ok(ratings)
    }

    fn upsert_rating(&self, rating: NewRating) -> Result<Rating> {
        let mut conn = self.conn()?;
        let rating = diesel::insert_into(ratings::table)
            .values(&rating)
            .on_conflict((ratings::user_id, ratings::movie_id))
            .do_update()
            .set(ratings::score.eq(rating.score))
            .returning(Rating::as_returning())
            .get_result(&mut conn)?;
        Ok(rating)
    }
}
