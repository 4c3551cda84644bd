//! Lab report service: PDF laboratory reports and dashboard aggregates for a
//! public-health testing laboratory.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod report;
pub mod repository;
pub mod services;
pub mod utils;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Reports
        .route("/api/lab/:id/pdf-fm", get(handlers::reports::lab_pdf_fm))
        .route("/api/lab/:id/pdf-icn", get(handlers::reports::lab_pdf_icn))
        // Reference data
        .route("/api/pathogens/test_type/:id", get(handlers::pathogens::by_test_type))
        // Dashboard
        .route("/api/dashboard/chart/pathogens", get(handlers::dashboard::pathogen_chart))
        .route("/api/dashboard/chart/results", get(handlers::dashboard::results_chart))
        // Health
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
