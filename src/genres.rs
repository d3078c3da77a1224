use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::auth::Admin;
use crate::dto::{GenreDto, GenreForm};
use crate::error::{CatalogError, Result};
use crate::store::CatalogStore;

#[get("/generos")]
pub async fn list_genres(store: web::Data<dyn CatalogStore>) -> Result<HttpResponse> {
    let genres = web::block(move || store.genres()).await??;
    Ok(HttpResponse::Ok().json(genres.iter().map(GenreDto::from).collect::<Vec<_>>()))
}

#[get("/generos/{id:\\d+}")]
pub async fn get_genre(
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let genre = web::block(move || store.genre(id))
        .await??
        .ok_or(CatalogError::NotFound)?;
    Ok(HttpResponse::Ok().json(GenreDto::from(&genre)))
}

#[post("/generos")]
pub async fn create_genre(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    form: web::Json<GenreForm>,
) -> Result<HttpResponse> {
    let new_genre = form.into_inner().validate()?;
    let genre = web::block(move || store.insert_genre(new_genre)).await??;
    log::info!("Created genre {} ({})", genre.id, genre.name);
    Ok(HttpResponse::Created().json(genre.id))
}

#[put("/generos/{id:\\d+}")]
pub async fn update_genre(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
    form: web::Json<GenreForm>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let changes = form.into_inner().validate()?;
    web::block(move || store.update_genre(id, changes))
        .await??
        .ok_or(CatalogError::NotFound)?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/generos/{id:\\d+}")]
pub async fn delete_genre(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if !web::block(move || store.delete_genre(id)).await?? {
        return Err(CatalogError::NotFound);
    }
    log::info!("Deleted genre {}", id);
    Ok(HttpResponse::NoContent().finish())
}
