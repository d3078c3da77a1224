use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::{actors, auth, cinemas, genres, movies, ratings};

/// Mounts every endpoint under `/api`. Expects the catalog store, file store,
/// auth settings and upload settings to be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/ratings")
                    .wrap(HttpAuthentication::bearer(auth::require_bearer))
                    .service(ratings::rate_movie),
            )
            .service(genres::list_genres)
            .service(genres::get_genre)
            .service(genres::create_genre)
            .service(genres::update_genre)
            .service(genres::delete_genre)
            .service(cinemas::list_cinemas)
            .service(cinemas::get_cinema)
            .service(cinemas::create_cinema)
            .service(cinemas::update_cinema)
            .service(cinemas::delete_cinema)
            .service(actors::list_actors)
            .service(actors::get_actor)
            .service(actors::search_actors)
            .service(actors::create_actor)
            .service(actors::update_actor)
            .service(actors::delete_actor)
            .service(movies::landing_page)
            .service(movies::filter_movies)
            .service(movies::post_get)
            .service(movies::put_get)
            .service(movies::get_movie)
            .service(movies::create_movie)
            .service(movies::update_movie)
            .service(movies::delete_movie),
    );
}
