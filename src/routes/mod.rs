use crate::config::{ConfigError, PortalConfig};
use crate::content::ContentProvider;
use crate::endpoints;
use crate::error::ApiError;
use crate::relay::ChatRelay;
use crate::session::SessionAuthority;
use actix_web::web;
use std::sync::Arc;

/// Shared services handed to every actix-web worker.
#[derive(Clone)]
pub struct PortalState {
    pub authority: Arc<SessionAuthority>,
    pub content: Arc<ContentProvider>,
    pub relay: Arc<ChatRelay>,
}

impl PortalState {
    pub fn new(authority: SessionAuthority, content: ContentProvider, relay: ChatRelay) -> Self {
        Self {
            authority: Arc::new(authority),
            content: Arc::new(content),
            relay: Arc::new(relay),
        }
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, ConfigError> {
        let authority = SessionAuthority::new(config.credentials.clone(), config.session_ttl);
        let content = ContentProvider::load(config.content_path.as_deref())?;
        let relay = ChatRelay::new(config.relay.clone())?;
        Ok(Self::new(authority, content, relay))
    }

    /// Registers the shared services and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.authority.clone()))
            .app_data(web::Data::from(self.content.clone()))
            .app_data(web::Data::from(self.relay.clone()));
        init_routes(cfg);
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("invalid JSON body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("invalid query string: {}", err)).into()
    }));

    cfg.service(web::resource("/health").route(web::get().to(endpoints::health)));
    // `/login` is kept for older front ends that post there directly.
    cfg.service(web::resource("/login").route(web::post().to(endpoints::login)));
    cfg.service(
        web::scope("/api")
            .service(web::resource("/login").route(web::post().to(endpoints::login)))
            .service(web::resource("/logout").route(web::post().to(endpoints::logout)))
            .service(web::resource("/me").route(web::get().to(endpoints::me)))
            .service(web::resource("/content").route(web::get().to(endpoints::content)))
            .service(web::resource("/chat").route(web::post().to(endpoints::chat))),
    );
}
