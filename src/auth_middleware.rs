use crate::auth::{Role, UserInfo};
use crate::error::{ApiError, AuthFailure};
use crate::session::{Session, SessionAuthority};
use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::{DateTime, Utc};
use log::error;
use std::future::{ready, Ready};

/// Token from an `Authorization: Bearer <token>` header, if well formed.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
        .filter(|token| !token.is_empty())
}

/// Identity bound to a request that passed the bearer-token gate.
///
/// Taking this extractor as a handler argument makes the route protected:
/// when validation fails the handler never runs and the client gets a `401`
/// whose `error` field is either `unauthenticated` or `expired`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    session: Session,
}

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.session.username
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    pub fn user(&self) -> UserInfo {
        self.session.user()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.session.expires_at
    }

    fn authorize(req: &HttpRequest) -> Result<Self, ApiError> {
        let authority = req
            .app_data::<web::Data<SessionAuthority>>()
            .ok_or_else(|| {
                error!("SessionAuthority is not registered as app data");
                ApiError::Internal
            })?;

        let token = bearer_token(req).ok_or(AuthFailure::Unauthenticated)?;
        let session = authority.validate(&token)?;
        Ok(Self { session })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::authorize(req))
    }
}
