use std::str::FromStr;

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::http::header::Header;
use actix_web::{web, Error, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use anyhow::anyhow;
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::settings::AuthSettings;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub exp: i64,
    pub iss: String,
    pub sub: String,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

pub fn get_claims_and_validate(token: &str, secret: &str) -> anyhow::Result<TokenClaims> {
    let token = token.trim_start_matches("Bearer ");
    let claims = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(claims.claims)
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl Viewer {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

impl TryFrom<TokenClaims> for Viewer {
    type Error = CatalogError;

    fn try_from(claims: TokenClaims) -> Result<Self> {
        let user_id = Uuid::from_str(&claims.user_id).map_err(|_| CatalogError::Unauthorized)?;
        Ok(Viewer {
            user_id,
            email: claims.email,
            roles: claims.roles,
        })
    }
}

fn auth_settings(req: &HttpRequest) -> Result<&AuthSettings> {
    req.app_data::<web::Data<AuthSettings>>()
        .map(|settings| settings.get_ref())
        .ok_or_else(|| anyhow!("Auth settings are not registered as app data.").into())
}

/// `Ok(None)` when the request carries no bearer token at all.
fn viewer_from_request(req: &HttpRequest) -> Result<Option<Viewer>> {
    let Ok(authorization) = Authorization::<Bearer>::parse(req) else {
        return Ok(None);
    };
    let settings = auth_settings(req)?;
    let claims = get_claims_and_validate(authorization.into_scheme().token(), &settings.secret)
        .map_err(|e| {
            log::info!("Rejected bearer token: {}", e);
            CatalogError::Unauthorized
        })?;
    Viewer::try_from(claims).map(Some)
}

impl FromRequest for Viewer {
    type Error = CatalogError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(viewer_from_request(req).and_then(|viewer| viewer.ok_or(CatalogError::Unauthorized)))
    }
}

/// The caller when a valid token is present; anonymous otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalViewer(pub Option<Viewer>);

impl FromRequest for OptionalViewer {
    type Error = CatalogError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(OptionalViewer(viewer_from_request(req).unwrap_or(None))))
    }
}

/// A caller holding the configured admin role.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin(pub Viewer);

impl FromRequest for Admin {
    type Error = CatalogError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let admin = viewer_from_request(req)
            .and_then(|viewer| viewer.ok_or(CatalogError::Unauthorized))
            .and_then(|viewer| {
                let settings = auth_settings(req)?;
                if viewer.has_role(&settings.admin_role) {
                    Ok(Admin(viewer))
                } else {
                    Err(CatalogError::Forbidden)
                }
            });
        ready(admin)
    }
}

/// `HttpAuthentication::bearer` validator for scopes open to any
/// authenticated caller.
pub async fn require_bearer(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> std::result::Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(secret) = req
        .app_data::<web::Data<AuthSettings>>()
        .map(|settings| settings.secret.clone())
    else {
        return Err((Error::from(CatalogError::Unauthorized), req));
    };

    match get_claims_and_validate(credentials.token(), &secret) {
        Ok(_) => Ok(req),
        Err(e) => {
            log::info!("Rejected bearer token: {}", e);
            Err((Error::from(CatalogError::Unauthorized), req))
        }
    }
}
