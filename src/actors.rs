use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::auth::Admin;
use crate::dto::{optional, required, ActorDto, ActorSearchDto};
use crate::error::{CatalogError, Result};
use crate::files::{discard, save_with, FileStore};
use crate::model::NewActor;
use crate::multipart::FormData;
use crate::pagination::{insert_total_records, Pagination, PaginationQuery};
use crate::settings::UploadSettings;
use crate::store::CatalogStore;

pub const PHOTO_CONTAINER: &str = "actores";
pub const SEARCH_LIMIT: i64 = 5;
pub const MAX_NAME_LENGTH: usize = 200;

/// Reads the scalar fields of an actor form. The photo is attached later.
fn actor_from_form(form: &FormData) -> Result<NewActor> {
    let name = required("nombre", form.text("nombre").unwrap_or(""), MAX_NAME_LENGTH)?;
    let birth_date = form
        .date("fechaNacimiento")?
        .ok_or_else(|| CatalogError::validation("El campo fechaNacimiento es requerido"))?;
    Ok(NewActor {
        name,
        biography: optional(form.text("biografia")),
        birth_date,
        photo: None,
    })
}

#[get("/actores")]
pub async fn list_actors(
    store: web::Data<dyn CatalogStore>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let pagination = Pagination::from(query.into_inner());
    let page = web::block(move || store.actors(&pagination)).await??;

    let mut response = HttpResponse::Ok();
    insert_total_records(&mut response, page.total);
    Ok(response.json(page.items.iter().map(ActorDto::from).collect::<Vec<_>>()))
}

#[get("/actores/{id:\\d+}")]
pub async fn get_actor(
    store: web::Data<dyn CatalogStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let actor = web::block(move || store.actor(id))
        .await??
        .ok_or(CatalogError::NotFound)?;
    Ok(HttpResponse::Ok().json(ActorDto::from(&actor)))
}

#[post("/actores/buscarPorNombre")]
pub async fn search_actors(
    store: web::Data<dyn CatalogStore>,
    name: web::Json<String>,
) -> Result<HttpResponse> {
    let fragment = name.into_inner().trim().to_string();
    if fragment.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<ActorSearchDto>::new()));
    }
    let actors = web::block(move || store.actors_by_name(&fragment, SEARCH_LIMIT)).await??;
    Ok(HttpResponse::Ok().json(actors.iter().map(ActorSearchDto::from).collect::<Vec<_>>()))
}

#[post("/actores")]
pub async fn create_actor(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    files: web::Data<dyn FileStore>,
    uploads: web::Data<UploadSettings>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = FormData::read(payload, uploads.max_file_size).await?;
    let photo = form.take_file("foto");
    let new_actor = actor_from_form(&form)?;

    let actor = web::block(move || {
        save_with(files.get_ref(), PHOTO_CONTAINER, photo.as_ref(), |url| {
            store.insert_actor(NewActor { photo: url, ..new_actor })
        })
    })
    .await??;

    log::info!("Created actor {} ({})", actor.id, actor.name);
    Ok(HttpResponse::Created().json(actor.id))
}

#[put("/actores/{id:\\d+}")]
pub async fn update_actor(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    files: web::Data<dyn FileStore>,
    uploads: web::Data<UploadSettings>,
    path: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let mut form = FormData::read(payload, uploads.max_file_size).await?;
    let photo = form.take_file("foto");
    let changes = actor_from_form(&form)?;

    web::block(move || {
        let existing = store.actor(id)?.ok_or(CatalogError::NotFound)?;
        save_with(files.get_ref(), PHOTO_CONTAINER, photo.as_ref(), |url| {
            store
                .update_actor(id, NewActor { photo: url, ..changes })?
                .ok_or(CatalogError::NotFound)
        })?;
        if let (Some(_), Some(previous)) = (&photo, &existing.photo) {
            discard(files.get_ref(), previous, PHOTO_CONTAINER);
        }
        Ok::<_, CatalogError>(())
    })
    .await??;

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/actores/{id:\\d+}")]
pub async fn delete_actor(
    _admin: Admin,
    store: web::Data<dyn CatalogStore>,
    files: web::Data<dyn FileStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    web::block(move || {
        let actor = store.delete_actor(id)?.ok_or(CatalogError::NotFound)?;
        if let Some(photo) = &actor.photo {
            discard(files.get_ref(), photo, PHOTO_CONTAINER);
        }
        Ok::<_, CatalogError>(())
    })
    .await??;

    log::info!("Deleted actor {}", id);
    Ok(HttpResponse::NoContent().finish())
}
