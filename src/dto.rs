//! Wire shapes of the API and the projections from store entities into them.
//!
//! Field names follow the client contract (`titulo`, `enCines`, ...). Every
//! view is built by an explicit `From` projection; nested lists are projected
//! from the join rows directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::{Actor, Cinema, Genre, Movie, MovieActor, NewCinema, NewGenre};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreDto {
    pub id: i32,
    pub nombre: String,
}

impl From<&Genre> for GenreDto {
    fn from(genre: &Genre) -> Self {
        Self {
            id: genre.id,
            nombre: genre.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreForm {
    #[serde(default)]
    pub nombre: String,
}

impl GenreForm {
    pub const MAX_NAME_LENGTH: usize = 50;

    pub fn validate(self) -> Result<NewGenre> {
        let name = required("nombre", &self.nombre, Self::MAX_NAME_LENGTH)?;
        if !name.chars().next().is_some_and(char::is_uppercase) {
            return Err(CatalogError::validation(
                "La primera letra del campo nombre debe ser mayúscula",
            ));
        }
        Ok(NewGenre { name })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinemaDto {
    pub id: i32,
    pub nombre: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

impl From<&Cinema> for CinemaDto {
    fn from(cinema: &Cinema) -> Self {
        Self {
            id: cinema.id,
            nombre: cinema.name.clone(),
            latitud: cinema.latitude,
            longitud: cinema.longitude,
        }
    }
}

/// A cinema as listed inside a movie or an edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinemaSummaryDto {
    pub id: i32,
    pub nombre: String,
}

impl From<&Cinema> for CinemaSummaryDto {
    fn from(cinema: &Cinema) -> Self {
        Self {
            id: cinema.id,
            nombre: cinema.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CinemaForm {
    #[serde(default)]
    pub nombre: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

impl CinemaForm {
    pub const MAX_NAME_LENGTH: usize = 75;

    pub fn validate(self) -> Result<NewCinema> {
        let name = required("nombre", &self.nombre, Self::MAX_NAME_LENGTH)?;
        if self.latitud.is_some() != self.longitud.is_some() {
            return Err(CatalogError::validation(
                "Los campos latitud y longitud deben enviarse juntos",
            ));
        }
        if let Some(latitude) = self.latitud {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(CatalogError::validation(
                    "El campo latitud debe estar entre -90 y 90",
                ));
            }
        }
        if let Some(longitude) = self.longitud {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(CatalogError::validation(
                    "El campo longitud debe estar entre -180 y 180",
                ));
            }
        }
        Ok(NewCinema {
            name,
            latitude: self.latitud,
            longitude: self.longitud,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDto {
    pub id: i32,
    pub nombre: String,
    pub biografia: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub foto: Option<String>,
}

impl From<&Actor> for ActorDto {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            nombre: actor.name.clone(),
            biografia: actor.biography.clone(),
            fecha_nacimiento: actor.birth_date,
            foto: actor.photo.clone(),
        }
    }
}

/// Result row of the actor name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSearchDto {
    pub id: i32,
    pub nombre: String,
    pub foto: Option<String>,
}

impl From<&Actor> for ActorSearchDto {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            nombre: actor.name.clone(),
            foto: actor.photo.clone(),
        }
    }
}

/// An actor as cast in a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMemberDto {
    pub id: i32,
    pub nombre: String,
    pub personaje: Option<String>,
    pub biografia: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub foto: Option<String>,
    pub orden: i32,
}

impl From<(&MovieActor, &Actor)> for CastMemberDto {
    fn from((link, actor): (&MovieActor, &Actor)) -> Self {
        Self {
            id: link.actor_id,
            nombre: actor.name.clone(),
            personaje: link.character_name.clone(),
            biografia: actor.biography.clone(),
            fecha_nacimiento: actor.birth_date,
            foto: actor.photo.clone(),
            orden: link.sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    pub id: i32,
    pub titulo: String,
    pub resumen: Option<String>,
    pub trailer: Option<String>,
    pub en_cines: bool,
    pub fecha_lanzamiento: NaiveDate,
    pub poster: Option<String>,
}

impl From<&Movie> for MovieDto {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            titulo: movie.title.clone(),
            resumen: movie.summary.clone(),
            trailer: movie.trailer.clone(),
            en_cines: movie.in_theaters,
            fecha_lanzamiento: movie.release_date,
            poster: movie.poster.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetailDto {
    pub id: i32,
    pub titulo: String,
    pub resumen: Option<String>,
    pub trailer: Option<String>,
    pub en_cines: bool,
    pub fecha_lanzamiento: NaiveDate,
    pub poster: Option<String>,
    pub generos: Vec<GenreDto>,
    pub actores: Vec<CastMemberDto>,
    pub cines: Vec<CinemaSummaryDto>,
    pub promedio_voto: f64,
    pub voto_usuario: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageDto {
    pub en_cines: Vec<MovieDto>,
    pub proximos_estrenos: Vec<MovieDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviesPostGetDto {
    pub generos: Vec<GenreDto>,
    pub cines: Vec<CinemaSummaryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesPutGetDto {
    pub pelicula: MovieDetailDto,
    pub generos_seleccionados: Vec<GenreDto>,
    pub generos_no_seleccionados: Vec<GenreDto>,
    pub cines_seleccionados: Vec<CinemaSummaryDto>,
    pub cines_no_seleccionados: Vec<CinemaSummaryDto>,
    pub actores: Vec<CastMemberDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingForm {
    pub pelicula_id: i32,
    pub puntuacion: i32,
}

impl RatingForm {
    pub const MIN_SCORE: i32 = 1;
    pub const MAX_SCORE: i32 = 5;

    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_SCORE..=Self::MAX_SCORE).contains(&self.puntuacion) {
            return Err(CatalogError::validation(format!(
                "El campo puntuacion debe estar entre {} y {}",
                Self::MIN_SCORE,
                Self::MAX_SCORE
            )));
        }
        Ok(())
    }
}

/// Trims `value` and enforces presence and a maximum length in characters.
pub fn required(field: &str, value: &str, max_length: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::validation(format!(
            "El campo {} es requerido",
            field
        )));
    }
    if value.chars().count() > max_length {
        return Err(CatalogError::validation(format!(
            "El campo {} no debe tener más de {} caracteres",
            field, max_length
        )));
    }
    Ok(value.to_string())
}

/// Trims an optional text field; blank becomes `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
