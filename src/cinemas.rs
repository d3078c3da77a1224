use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::auth::Admin;
use crate::dto::{CinemaDto, CinemaForm};
use crate::error::{CatalogError, Result};
use crate::store::CatalogStore;

#[get("/cines")]
pub async fn list_cinemas(store: web::Data<dyn CatalogStore>) -> Result<HttpResponse> {
    let cinemas = web::block(move || store.cinemas()).await??;
    Ok(HttpResponse::Ok().json(cinemas.iter().map(CinemaDto::from).collect::<Vec<_>>()))
}

#[get("/cines/{id:\\d+}")]
pub async fn get_cinema(
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let cinema = web::block(move || store.cinema(id))
        .await??
        .ok_or(CatalogError::NotFound)?;
    Ok(HttpResponse::Ok().json(CinemaDto::from(&cinema)))
}

#[post("/cines")]
pub async fn create_cinema(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    form: web::Json<CinemaForm>,
) -> Result<HttpResponse> {
    let new_cinema = form.into_inner().validate()?;
    let cinema = web::block(move || store.insert_cinema(new_cinema)).await??;
    log::info!("Created cinema {} ({})", cinema.id, cinema.name);
    Ok(HttpResponse::Created().json(cinema.id))
}

#[put("/cines/{id:\\d+}")]
pub async fn update_cinema(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
    form: web::Json<CinemaForm>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let changes = form.into_inner().validate()?;
    web::block(move || store.update_cinema(id, changes))
        .await??
        .ok_or(CatalogError::NotFound)?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/cines/{id:\\d+}")]
pub async fn delete_cinema(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if !web::block(move || store.delete_cinema(id)).await?? {
        return Err(CatalogError::NotFound);
    }
    log::info!("Deleted cinema {}", id);
    Ok(HttpResponse::NoContent().finish())
}
