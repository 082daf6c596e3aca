use crate::auth::rbac::require_role;
use crate::auth::Role;
use crate::auth_middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::relay::{ChatInput, ChatMessage, ChatRelay};
use actix_web::{web, HttpResponse};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Admin only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Admin only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub ok: bool,
    pub answer: String,
}

pub async fn chat(
    user: AuthenticatedUser,
    body: web::Json<ChatRequest>,
    relay: web::Data<ChatRelay>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    if body.system_prompt.is_some() || body.temperature.is_some() {
        require_role(user.role(), Role::Admin)?;
    }

    debug!("Relaying chat message from {}", user.username());
    let answer = relay
        .reply(ChatInput {
            message: body.message,
            history: body.history,
            system_prompt: body.system_prompt,
            temperature: body.temperature,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ChatResponse { ok: true, answer }))
}
