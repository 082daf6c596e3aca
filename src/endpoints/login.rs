use crate::auth::UserInfo;
use crate::error::ApiError;
use crate::session::SessionAuthority;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    body: web::Json<LoginRequest>,
    authority: web::Data<SessionAuthority>,
) -> Result<HttpResponse, ApiError> {
    let session = authority.login(&body.username, &body.password)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        ok: true,
        user: session.user(),
        expires_at: session.expires_at,
        token: session.token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::endpoints::test_support::authority;
    use crate::error::ErrorBody;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_login_success() {
        let _ = env_logger::builder().is_test(true).try_init();
        let authority = authority();

        let app = test::init_service(
            App::new()
                .app_data(authority.clone())
                .route("/api/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(&LoginRequest {
                username: "Admin".to_string(),
                password: "SenhaForte123".to_string(),
            })
            .to_request();
        let resp: LoginResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.ok);
        assert_eq!(resp.token.len(), 64);
        assert_eq!(resp.user.username, "Admin");
        assert_eq!(resp.user.role, Role::Admin);
        assert!(authority.validate(&resp.token).is_ok());
    }

    #[actix_web::test]
    async fn test_login_missing_fields() {
        let app = test::init_service(
            App::new()
                .app_data(authority())
                .route("/api/login", web::post().to(login)),
        )
        .await;

        for body in [json!({}), json!({"username": "Admin"}), json!({"password": "x"})] {
            let req = test::TestRequest::post()
                .uri("/api/login")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: ErrorBody = test::read_body_json(resp).await;
            assert_eq!(body.error, "missing_fields");
            assert!(!body.ok);
        }
    }

    #[actix_web::test]
    async fn test_login_invalid_credentials_do_not_leak_cause() {
        let app = test::init_service(
            App::new()
                .app_data(authority())
                .route("/api/login", web::post().to(login)),
        )
        .await;

        let mut bodies = Vec::new();
        for (username, password) in [("Admin", "wrong"), ("ghost", "SenhaForte123")] {
            let req = test::TestRequest::post()
                .uri("/api/login")
                .set_json(&json!({"username": username, "password": password}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            bodies.push(test::read_body(resp).await);
        }
        assert_eq!(bodies[0], bodies[1]);
    }
}
