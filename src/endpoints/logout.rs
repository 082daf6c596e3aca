use crate::auth_middleware::bearer_token;
use crate::session::SessionAuthority;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

/// Ends the caller's session. Always answers `{ok: true}`, whether or not the
/// presented token was still valid.
pub async fn logout(req: HttpRequest, authority: web::Data<SessionAuthority>) -> HttpResponse {
    if let Some(token) = bearer_token(&req) {
        authority.revoke(&token);
    }
    HttpResponse::Ok().json(json!({ "ok": true }))
}
