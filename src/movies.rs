use std::collections::HashSet;

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{Admin, OptionalViewer};
use crate::dto::{
    optional, required, CastMemberDto, CinemaSummaryDto, GenreDto, LandingPageDto,
    MovieDetailDto, MovieDto, MoviesPostGetDto, MoviesPutGetDto,
};
use crate::error::{CatalogError, Result};
use crate::files::{discard, save_with, FileStore};
use crate::filter::MovieFilterQuery;
use crate::model::{CastEntry, MovieGraph, MovieWrite, NewMovie, Rating};
use crate::multipart::FormData;
use crate::pagination::insert_total_records;
use crate::settings::UploadSettings;
use crate::store::CatalogStore;

pub const POSTER_CONTAINER: &str = "peliculas";
pub const LANDING_PAGE_SIZE: i64 = 6;

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Rewrites every cast entry's order to its position in the list.
pub fn write_actor_order(cast: &mut [CastEntry]) {
    for (index, entry) in cast.iter_mut().enumerate() {
        entry.sort_order = index as i32;
    }
}

/// Mean score of the rows, 0 when there are none.
pub fn average_rating(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(r.score)).sum();
    sum as f64 / ratings.len() as f64
}

/// The viewer's own score, 0 for anonymous viewers or when they haven't voted.
pub fn viewer_rating(ratings: &[Rating], viewer: Option<Uuid>) -> i32 {
    viewer
        .and_then(|user_id| ratings.iter().find(|r| r.user_id == user_id))
        .map(|r| r.score)
        .unwrap_or(0)
}

pub fn assemble_movie_detail(
    graph: &MovieGraph,
    ratings: &[Rating],
    viewer: Option<Uuid>,
) -> MovieDetailDto {
    let movie = &graph.movie;
    MovieDetailDto {
        id: movie.id,
        titulo: movie.title.clone(),
        resumen: movie.summary.clone(),
        trailer: movie.trailer.clone(),
        en_cines: movie.in_theaters,
        fecha_lanzamiento: movie.release_date,
        poster: movie.poster.clone(),
        generos: graph.genres.iter().map(GenreDto::from).collect(),
        actores: graph
            .cast
            .iter()
            .map(|(link, actor)| CastMemberDto::from((link, actor)))
            .collect(),
        cines: graph.cinemas.iter().map(CinemaSummaryDto::from).collect(),
        promedio_voto: average_rating(ratings),
        voto_usuario: viewer_rating(ratings, viewer),
    }
}

pub fn load_movie_detail(
    store: &dyn CatalogStore,
    id: i32,
    viewer: Option<Uuid>,
) -> Result<MovieDetailDto> {
    let graph = store.movie_graph(id)?.ok_or(CatalogError::NotFound)?;
    let ratings = store.movie_ratings(id)?;
    Ok(assemble_movie_detail(&graph, &ratings, viewer))
}

fn load_put_get(
    store: &dyn CatalogStore,
    id: i32,
    viewer: Option<Uuid>,
) -> Result<MoviesPutGetDto> {
    let movie = load_movie_detail(store, id, viewer)?;
    let genres = store.genres()?;
    let cinemas = store.cinemas()?;

    let selected_genres: HashSet<i32> = movie.generos.iter().map(|g| g.id).collect();
    let selected_cinemas: HashSet<i32> = movie.cines.iter().map(|c| c.id).collect();

    Ok(MoviesPutGetDto {
        generos_seleccionados: movie.generos.clone(),
        generos_no_seleccionados: genres
            .iter()
            .filter(|g| !selected_genres.contains(&g.id))
            .map(GenreDto::from)
            .collect(),
        cines_seleccionados: movie.cines.clone(),
        cines_no_seleccionados: cinemas
            .iter()
            .filter(|c| !selected_cinemas.contains(&c.id))
            .map(CinemaSummaryDto::from)
            .collect(),
        actores: movie.actores.clone(),
        pelicula: movie,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastForm {
    pub id: i32,
    #[serde(default)]
    pub personaje: Option<String>,
}

/// A movie create/update form, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieForm {
    pub title: String,
    pub summary: Option<String>,
    pub trailer: Option<String>,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    pub genre_ids: Vec<i32>,
    pub cinema_ids: Vec<i32>,
    pub cast: Vec<CastForm>,
}

impl MovieForm {
    pub const MAX_TITLE_LENGTH: usize = 300;
    pub const MAX_CHARACTER_LENGTH: usize = 100;

    pub fn from_form(form: &FormData) -> Result<Self> {
        let title = required("titulo", form.text("titulo").unwrap_or(""), Self::MAX_TITLE_LENGTH)?;
        let release_date = form
            .date("fechaLanzamiento")?
            .ok_or_else(|| CatalogError::validation("El campo fechaLanzamiento es requerido"))?;
        let cast: Vec<CastForm> = form.json("actores")?.unwrap_or_default();
        for entry in &cast {
            if let Some(character) = &entry.personaje {
                if character.chars().count() > Self::MAX_CHARACTER_LENGTH {
                    return Err(CatalogError::validation(format!(
                        "El campo personaje no debe tener más de {} caracteres",
                        Self::MAX_CHARACTER_LENGTH
                    )));
                }
            }
        }

        Ok(MovieForm {
            title,
            summary: optional(form.text("resumen")),
            trailer: optional(form.text("trailer")),
            in_theaters: form.flag("enCines")?,
            release_date,
            genre_ids: form.json("generosIds")?.unwrap_or_default(),
            cinema_ids: form.json("cinesIds")?.unwrap_or_default(),
            cast,
        })
    }

    /// Drops repeated ids (first occurrence wins) and numbers the cast in
    /// submission order.
    pub fn into_write(self, poster: Option<String>) -> MovieWrite {
        let mut seen = HashSet::new();
        let mut genre_ids = self.genre_ids;
        genre_ids.retain(|id| seen.insert(*id));

        let mut seen = HashSet::new();
        let mut cinema_ids = self.cinema_ids;
        cinema_ids.retain(|id| seen.insert(*id));

        let mut seen = HashSet::new();
        let mut cast: Vec<CastEntry> = self
            .cast
            .into_iter()
            .filter(|entry| seen.insert(entry.id))
            .map(|entry| CastEntry {
                actor_id: entry.id,
                character_name: optional(entry.personaje.as_deref()),
                sort_order: 0,
            })
            .collect();
        write_actor_order(&mut cast);

        MovieWrite {
            movie: NewMovie {
                title: self.title,
                summary: self.summary,
                trailer: self.trailer,
                in_theaters: self.in_theaters,
                release_date: self.release_date,
                poster,
            },
            genre_ids,
            cinema_ids,
            cast,
        }
    }
}

/// Rejects writes that link genres, cinemas or actors that don't exist.
fn check_references(store: &dyn CatalogStore, write: &MovieWrite) -> Result<()> {
    for id in &write.genre_ids {
        if store.genre(*id)?.is_none() {
            return Err(CatalogError::validation(format!("El género {} no existe", id)));
        }
    }
    for id in &write.cinema_ids {
        if store.cinema(*id)?.is_none() {
            return Err(CatalogError::validation(format!("El cine {} no existe", id)));
        }
    }
    for entry in &write.cast {
        if store.actor(entry.actor_id)?.is_none() {
            return Err(CatalogError::validation(format!(
                "El actor {} no existe",
                entry.actor_id
            )));
        }
    }
    Ok(())
}

#[get("/peliculas")]
pub async fn landing_page(store: web::Data<dyn CatalogStore>) -> Result<HttpResponse> {
    let today = today();
    let (in_theaters, upcoming) = web::block(move || -> Result<_> {
        Ok((
            store.movies_in_theaters(LANDING_PAGE_SIZE)?,
            store.upcoming_movies(today, LANDING_PAGE_SIZE)?,
        ))
    })
    .await??;

    Ok(HttpResponse::Ok().json(LandingPageDto {
        en_cines: in_theaters.iter().map(MovieDto::from).collect(),
        proximos_estrenos: upcoming.iter().map(MovieDto::from).collect(),
    }))
}

#[get("/peliculas/{id:\\d+}")]
pub async fn get_movie(
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
    viewer: OptionalViewer,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let viewer_id = viewer.0.map(|v| v.user_id);
    let detail = web::block(move || load_movie_detail(store.get_ref(), id, viewer_id)).await??;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/peliculas/filtrar")]
pub async fn filter_movies(
    store: web::Data<dyn CatalogStore>,
    query: web::Query<MovieFilterQuery>,
) -> Result<HttpResponse> {
    let (filter, pagination) = query.into_inner().into_parts(today());
    log::debug!("Filtering movies with {:?} {:?}", filter, pagination);
    let page = web::block(move || store.filter_movies(&filter, &pagination)).await??;

    let mut response = HttpResponse::Ok();
    insert_total_records(&mut response, page.total);
    Ok(response.json(page.items.iter().map(MovieDto::from).collect::<Vec<_>>()))
}

#[get("/peliculas/PostGet")]
pub async fn post_get(_admin: Admin, store: web::Data<dyn CatalogStore>) -> Result<HttpResponse> {
    let (genres, cinemas) =
        web::block(move || -> Result<_> { Ok((store.genres()?, store.cinemas()?)) }).await??;

    Ok(HttpResponse::Ok().json(MoviesPostGetDto {
        generos: genres.iter().map(GenreDto::from).collect(),
        cines: cinemas.iter().map(CinemaSummaryDto::from).collect(),
    }))
}

#[get("/peliculas/PutGet/{id:\\d+}")]
pub async fn put_get(
    admin: Admin,
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let viewer_id = Some(admin.0.user_id);
    let response = web::block(move || load_put_get(store.get_ref(), id, viewer_id)).await??;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/peliculas")]
pub async fn create_movie(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    files: web::Data<dyn FileStore>,
    uploads: web::Data<UploadSettings>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = FormData::read(payload, uploads.max_file_size).await?;
    let poster = form.take_file("poster");
    let write = MovieForm::from_form(&form)?.into_write(None);

    let movie = web::block(move || {
        check_references(store.get_ref(), &write)?;
        save_with(files.get_ref(), POSTER_CONTAINER, poster.as_ref(), |url| {
            let mut write = write;
            write.movie.poster = url;
            store.insert_movie(write)
        })
    })
    .await??;

    log::info!("Created movie {} ({})", movie.id, movie.title);
    Ok(HttpResponse::Created().json(movie.id))
}

#[put("/peliculas/{id:\\d+}")]
pub async fn update_movie(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    files: web::Data<dyn FileStore>,
    uploads: web::Data<UploadSettings>,
    path: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let mut form = FormData::read(payload, uploads.max_file_size).await?;
    let poster = form.take_file("poster");
    let write = MovieForm::from_form(&form)?.into_write(None);

    web::block(move || {
        let existing = store.movie(id)?.ok_or(CatalogError::NotFound)?;
        check_references(store.get_ref(), &write)?;
        save_with(files.get_ref(), POSTER_CONTAINER, poster.as_ref(), |url| {
            let mut write = write;
            write.movie.poster = url;
            store.update_movie(id, write)?.ok_or(CatalogError::NotFound)
        })?;
        if let (Some(_), Some(previous)) = (&poster, &existing.poster) {
            discard(files.get_ref(), previous, POSTER_CONTAINER);
        }
        Ok::<_, CatalogError>(())
    })
    .await??;

    log::info!("Updated movie {}", id);
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/peliculas/{id:\\d+}")]
pub async fn delete_movie(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    files: web::Data<dyn FileStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    web::block(move || {
        let movie = store.delete_movie(id)?.ok_or(CatalogError::NotFound)?;
        if let Some(poster) = &movie.poster {
            discard(files.get_ref(), poster, POSTER_CONTAINER);
        }
        Ok::<_, CatalogError>(())
    })
    .await??;

    log::info!("Deleted movie {}", id);
    Ok(HttpResponse::NoContent().finish())
}
