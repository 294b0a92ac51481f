pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use services::notification::{self, Notifier};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn new(config: config::Config) -> Result<Arc<Self>, store::StoreError> {
        let notifier = notification::from_config(&config.notification);
        Self::with_notifier(config, notifier).await
    }

    pub async fn with_notifier(
        config: config::Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Arc<Self>, store::StoreError> {
        let db = database::Database::open(&config.storage).await?;
        Ok(Arc::new(Self { db, config, notifier }))
    }
}

/// Главный роутер приложения.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Tour Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
