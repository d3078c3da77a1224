use actix_multipart::MultipartError;
use actix_web::body::BoxBody;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("An unspecified internal error ocurred: {0}")]
    InternalError(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Couldn't get db connection from pool: {0}")]
    PoolError(#[from] r2d2::Error),
    #[error("An unspecified internal error ocurred")]
    BlockingError(#[from] BlockingError),
    #[error("File storage error: {0}")]
    StorageError(#[from] std::io::Error),
    #[error("Invalid multipart payload: {0}")]
    UploadError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Not found")]
    NotFound,
    #[error("Missing or invalid credentials")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
}

// `MultipartError` can wrap an `actix_web::Error`, which is not `Send`; keep
// only its message so the error can cross `web::block`.
impl From<MultipartError> for CatalogError {
    fn from(value: MultipartError) -> Self {
        CatalogError::UploadError(value.to_string())
    }
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::ValidationError(message.into())
    }

    fn get_error_code(&self) -> String {
        match self {
            CatalogError::InternalError(_) => "IE-00500".to_string(),
            CatalogError::DatabaseError(_) => "DE-00500".to_string(),
            CatalogError::PoolError(_) => "PE-00500".to_string(),
            CatalogError::BlockingError(_) => "BE-00500".to_string(),
            CatalogError::StorageError(_) => "SE-00500".to_string(),
            CatalogError::UploadError(_) => "UE-00400".to_string(),
            CatalogError::ValidationError(_) => "VE-00400".to_string(),
            CatalogError::NotFound => "NF-00404".to_string(),
            CatalogError::Unauthorized => "UA-00401".to_string(),
            CatalogError::Forbidden => "FB-00403".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogErrorResponse {
    pub message: String,
    pub status: u16,
    pub timestamp: NaiveDateTime,
    pub internal_code: String,
}

impl From<&CatalogError> for CatalogErrorResponse {
    fn from(value: &CatalogError) -> Self {
        Self {
            message: value.to_string(),
            status: value.status_code().as_u16(),
            timestamp: chrono::Utc::now().naive_utc(),
            internal_code: value.get_error_code(),
        }
    }
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match &self {
            CatalogError::NotFound => StatusCode::NOT_FOUND,
            CatalogError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CatalogError::UploadError(_) => StatusCode::BAD_REQUEST,
            CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
            CatalogError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        if status == StatusCode::NOT_FOUND {
            return HttpResponse::NotFound().finish();
        }
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(CatalogErrorResponse::from(self))
    }
}
