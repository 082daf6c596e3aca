use crate::auth_middleware::AuthenticatedUser;
use crate::content::{ContentProvider, Month, PortalContent};
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub content: PortalContent,
}

pub async fn content(
    _user: AuthenticatedUser,
    query: web::Query<ContentQuery>,
    provider: web::Data<ContentProvider>,
) -> Result<HttpResponse, ApiError> {
    let month = match query.month.as_deref().filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => Some(Month::parse(raw).ok_or_else(|| {
            ApiError::BadRequest("month must be formatted as YYYY-MM".to_string())
        })?),
        None => None,
    };

    Ok(HttpResponse::Ok().json(ContentResponse {
        ok: true,
        content: provider.snapshot(month),
    }))
}
