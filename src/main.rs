use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use dotenvy::dotenv;
use env_logger::Env;
use r2d2::Pool;

use crate::db::PgCatalogStore;
use crate::files::{FileStore, LocalFileStore};
use crate::settings::Settings;
use crate::store::CatalogStore;

mod actors;
mod auth;
mod cinemas;
mod db;
mod dto;
mod error;
mod files;
mod filter;
mod genres;
mod model;
mod movies;
mod multipart;
mod pagination;
mod ratings;
mod routes;
mod schema;
mod settings;
mod store;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod testing;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::load()?;

    let manager = ConnectionManager::<PgConnection>::new(&settings.database.url);
    let pool = Pool::builder()
        .max_size(settings.database.pool_size)
        .build(manager)
        .context("Failed to create pool.")?;
    db::run_migrations(&pool)?;

    let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool));
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
        &settings.uploads.root,
        settings.uploads.public_url.clone(),
    ));
    let store = web::Data::from(store);
    let files = web::Data::from(files);
    let auth_settings = web::Data::new(settings.auth.clone());
    let upload_settings = web::Data::new(settings.uploads.clone());

    let address = settings.bind_address();
    log::info!("Listening on {}:{}", address.0, address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(files.clone())
            .app_data(auth_settings.clone())
            .app_data(upload_settings.clone())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
