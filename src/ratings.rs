use actix_web::{post, web, HttpResponse};

use crate::auth::Viewer;
use crate::dto::RatingForm;
use crate::error::{CatalogError, Result};
use crate::model::NewRating;
use crate::store::CatalogStore;

/// Records the caller's score for a movie. A later vote by the same user
/// overwrites the earlier one.
#[post("")]
pub async fn rate_movie(
    viewer: Viewer,
    store: web::Data<dyn CatalogStore>,
    form: web::Json<RatingForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    form.validate()?;

    let rating = NewRating {
        user_id: viewer.user_id,
        movie_id: form.pelicula_id,
        score: form.puntuacion,
    };
    let rating = web::block(move || {
        store.movie(rating.movie_id)?.ok_or(CatalogError::NotFound)?;
        store.upsert_rating(rating)
    })
    .await??;

    log::debug!(
        "User {} ({}) rated movie {} with {}",
        rating.user_id,
        viewer.email.as_deref().unwrap_or("no email"),
        rating.movie_id,
        rating.score
    );
    Ok(HttpResponse::NoContent().finish())
}
