//! Shared fixtures for handler tests.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use tempfile::TempDir;
use uuid::Uuid;

use crate::auth::tests::{test_settings, token_for};
use crate::files::{FileStore, LocalFileStore};
use crate::memory::MemoryCatalogStore;
use crate::routes;
use crate::settings::UploadSettings;
use crate::store::CatalogStore;

pub struct TestContext {
    pub store: Arc<MemoryCatalogStore>,
    pub files: Arc<LocalFileStore>,
    pub upload_root: PathBuf,
    _upload_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let upload_dir = TempDir::new().unwrap();
        let upload_root = upload_dir.path().to_path_buf();
        Self {
            store: Arc::new(MemoryCatalogStore::new()),
            files: Arc::new(LocalFileStore::new(&upload_root, "http://localhost:8080")),
            upload_root,
            _upload_dir: upload_dir,
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            root: self.upload_root.clone(),
            public_url: "http://localhost:8080".to_string(),
            max_file_size: 1024 * 1024,
        }
    }

    /// Registers the stores, settings and every route, as `main` does.
    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) {
        let store: Arc<dyn CatalogStore> = self.store.clone();
        let files: Arc<dyn FileStore> = self.files.clone();
        let uploads = self.upload_settings();
        move |cfg| {
            cfg.app_data(web::Data::from(store))
                .app_data(web::Data::from(files))
                .app_data(web::Data::new(test_settings()))
                .app_data(web::Data::new(uploads));
            routes::configure(cfg);
        }
    }
}

pub fn admin_auth() -> (&'static str, String) {
    (
        "Authorization",
        format!("Bearer {}", token_for(Uuid::new_v4(), &["ADMIN"])),
    )
}

pub fn user_auth(user_id: Uuid) -> (&'static str, String) {
    (
        "Authorization",
        format!("Bearer {}", token_for(user_id, &["USER"])),
    )
}
