// Expose the session, credential, content, relay and HTTP modules
pub mod auth;
pub mod auth_middleware;
pub mod config;
pub mod content;
pub mod endpoints;
pub mod error;
pub mod relay;
pub mod routes;
pub mod security;
pub mod session;

pub use auth::{Account, CredentialStore, Role};
pub use error::{ApiError, AuthFailure};
pub use routes::PortalState;
pub use session::{Session, SessionAuthority};
