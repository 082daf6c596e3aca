use actix_web::HttpResponse;
use serde_json::json;

pub mod chat;
pub mod content;
pub mod login;
pub mod logout;
pub mod profile;

pub use chat::chat;
pub use content::content;
pub use login::login;
pub use logout::logout;
pub use profile::me;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}
