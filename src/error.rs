use crate::relay::RelayError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures produced by the session authority.
///
/// Every variant is an expected outcome the HTTP layer translates into a
/// status code; none of them should bring the process down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("username and password are required")]
    MissingFields,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("session expired, please log in again")]
    Expired,
    #[error("could not generate a unique session token")]
    TokenGeneration,
}

impl AuthFailure {
    /// Stable machine-readable kind, used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthFailure::MissingFields => "missing_fields",
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::Unauthenticated => "unauthenticated",
            AuthFailure::Expired => "expired",
            AuthFailure::TokenGeneration => "server_error",
        }
    }
}

/// Errors returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),
    #[error("this action requires the admin role")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("chat relay is not configured")]
    RelayNotConfigured,
    #[error("the assistant is unavailable, try again in a moment")]
    Upstream,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Auth(failure) => failure.kind(),
            ApiError::Forbidden => "forbidden",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::RelayNotConfigured => "relay_not_configured",
            ApiError::Upstream => "upstream_error",
            ApiError::Internal => "server_error",
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::EmptyMessage | RelayError::InvalidTemperature(_) => {
                ApiError::BadRequest(err.to_string())
            }
            RelayError::NotConfigured => ApiError::RelayNotConfigured,
            RelayError::Upstream(_) => ApiError::Upstream,
            RelayError::Client(_) => ApiError::Internal,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: &str, message: &str) -> Self {
        ErrorBody {
            ok: false,
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthFailure::MissingFields) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthFailure::InvalidCredentials)
            | ApiError::Auth(AuthFailure::Unauthenticated)
            | ApiError::Auth(AuthFailure::Expired) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthFailure::TokenGeneration) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RelayNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(ErrorBody::new(self.kind(), &self.to_string()))
    }
}
