pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod validation;

use std::path::PathBuf;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::utils::app_config::AppConfig;
use handlers::{health, ledger::*, method_not_allowed};

pub fn router(app_config: AppConfig, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/health", get(health::health).fallback(method_not_allowed))
        .route("/data", get(get_data).fallback(method_not_allowed))
        .route("/entries", get(get_entries).fallback(method_not_allowed))
        .route("/summary", get(get_summary).fallback(method_not_allowed))
        .route("/add", post(add_entry).fallback(method_not_allowed))
        .route("/delete", post(delete_entry).fallback(method_not_allowed));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_config)
}
