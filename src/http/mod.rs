//! REST API
//!
//! JSON endpoints under `/api/v1` plus `/health`. Every handler delegates
//! to the shared [`Refinery`] service; errors map to 400/404/500 with an
//! `{"error": message}` body.

mod error;
mod handlers;

pub use error::{ApiError, ApiResult};

use crate::config::Config;
use crate::service::{Refinery, RefineryError};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub refinery: Arc<Refinery>,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Manuscripts
        .route(
            "/manuscripts",
            get(handlers::list_manuscripts).post(handlers::import_manuscript),
        )
        .route(
            "/manuscripts/:id",
            get(handlers::get_manuscript).delete(handlers::delete_manuscript),
        )
        // Analysis
        .route("/analysis/run", post(handlers::run_module))
        .route("/analysis/run-all", post(handlers::run_all))
        .route("/analysis/result/:id", get(handlers::get_result))
        .route("/analysis/:manuscript_id", get(handlers::list_results))
        // Edit queue
        .route("/manuscripts/:id/queue", get(handlers::edit_queue))
        .route(
            "/manuscripts/:id/queue/:item_id",
            patch(handlers::set_item_status),
        )
        // Scoring and reports
        .route("/manuscripts/:id/score", post(handlers::acquisition_score))
        .route("/manuscripts/:id/reports", post(handlers::generate_report))
        // Workflow
        .route("/manuscripts/:id/workflow", get(handlers::get_decision))
        .route(
            "/manuscripts/:id/workflow/advance",
            post(handlers::advance_decision),
        )
        // Annotations
        .route(
            "/manuscripts/:id/annotations",
            get(handlers::list_annotations).post(handlers::add_annotation),
        )
        .route(
            "/annotations/:id",
            patch(handlers::update_annotation).delete(handlers::delete_annotation),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until it stops.
pub async fn serve(config: &Config, bind: Option<&str>) -> Result<(), RefineryError> {
    let refinery = Refinery::from_config(config)?;
    let app = build_router(AppState {
        refinery: Arc::new(refinery),
    });

    let addr = bind.unwrap_or(&config.server.bind);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, mode = ?config.analysis.mode, "Starting HTTP server");

    axum::serve(listener, app).await?;
    Ok(())
}
