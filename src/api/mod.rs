//! HTTP surface: shared state, router assembly, server loop.

pub mod guard;
pub mod hotels;
pub mod my_bookings;
pub mod my_hotels;
pub mod session;
pub mod users;

use crate::config::AppConfig;
use crate::store::users::reconcile_admin;
use crate::store::Store;
use crate::token::TokenService;
use crate::upload::{DiskImageStore, ImageStore};
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Enough for six 5MB images plus the form fields around them.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared state for all request handlers.
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
    pub tokens: TokenService,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let images: Arc<dyn ImageStore> = Arc::new(DiskImageStore::new(&config.upload_dir)?);
        let tokens = TokenService::new(&config.jwt_secret);
        Ok(Arc::new(Self {
            store: Store::new(),
            tokens,
            images,
            config,
        }))
    }
}

/// Assemble the full application router.
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let origin: HeaderValue = state
        .config
        .frontend_origin
        .parse()
        .context("invalid frontend origin")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/users", users::routes())
        .nest("/api/auth", session::routes())
        .nest("/api/my-hotels", my_hotels::routes())
        .nest("/api/my-bookings", my_bookings::routes())
        .nest("/api/hotels", hotels::routes())
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state))
}

/// Run the server: build state, reconcile the admin account, serve.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    reconcile_admin(&state.store.users, &state.config.admin)?;

    let app = router(Arc::clone(&state))?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", state.config.port))
        .await
        .with_context(|| format!("failed to bind port {}", state.config.port))?;
    eprintln!("[server] listening on port {}", state.config.port);

    axum::serve(listener, app).await.context("server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_state_and_router_assemble() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            upload_dir: dir.path().join("uploads").to_string_lossy().to_string(),
            ..AppConfig::default()
        };

        let state = AppState::new(config).unwrap();
        reconcile_admin(&state.store.users, &state.config.admin).unwrap();
        assert_eq!(state.store.users.count(), 1);

        router(state).unwrap();
    }
}
