use crate::auth::UserInfo;
use crate::auth_middleware::AuthenticatedUser;
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub ok: bool,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

/// Who the bearer token belongs to. Lets the front end restore its portal
/// screen after a reload without asking for the password again.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse {
        ok: true,
        user: user.user(),
        expires_at: user.expires_at(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::endpoints::test_support::authority;
    use actix_web::{http::StatusCode, test, web, App};

    #[actix_web::test]
    async fn test_me_returns_identity() {
        let authority = authority();
        let session = authority.login("joao", "pw1").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(authority.clone())
                .route("/api/me", web::get().to(me)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", session.token)))
            .to_request();
        let resp: ProfileResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.user.username, "joao");
        assert_eq!(resp.user.role, Role::User);
        assert_eq!(resp.expires_at, session.expires_at);
    }

    #[actix_web::test]
    async fn test_me_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(authority())
                .route("/api/me", web::get().to(me)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
