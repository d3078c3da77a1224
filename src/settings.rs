use std::env;
use std::path::PathBuf;

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub secret: String,
    pub admin_role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub root: PathBuf,
    pub public_url: String,
    pub max_file_size: usize,
}

impl Settings {
    /// Layers built-in defaults, `config/default.toml` and `PELICULAS_*`
    /// environment variables (`PELICULAS_SERVER__PORT=9000`). `DATABASE_URL`
    /// wins over `PELICULAS_DATABASE__URL` when both are set.
    pub fn load() -> anyhow::Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.pool_size", 10)?
            .set_default("auth.admin_role", "ADMIN")?
            .set_default("uploads.root", "wwwroot")?
            .set_default("uploads.public_url", "http://localhost:8080")?
            .set_default("uploads.max_file_size", 4 * 1024 * 1024)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("PELICULAS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()
            .context("Failed to read configuration.")?;

        settings
            .try_deserialize()
            .context("Invalid configuration: DATABASE_URL and PELICULAS_AUTH__SECRET must be set.")
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
