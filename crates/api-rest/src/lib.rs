//! # API REST
//!
//! REST API implementation for DocBridge.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, base64 payloads, CORS)
//!
//! Uses `api-shared` for request and response bodies and `graph-client` for every call to the
//! content service.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use docbridge_core::ServiceConfig;
use graph_client::GraphClient;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::dto;

/// Application state for the REST API server
///
/// Shared by all request handlers. Nothing in it changes after startup.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<ServiceConfig>,
    pub graph: GraphClient,
}

impl AppState {
    pub fn new(cfg: Arc<ServiceConfig>) -> Self {
        let graph = GraphClient::new(cfg.clone());
        Self { cfg, graph }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_folders,
        handlers::get_folder,
        handlers::list_subfolders,
        handlers::create_folder,
        handlers::copy_template_folder,
        handlers::upload_file,
        handlers::delete_file,
        handlers::convert_doc_to_pdf,
        handlers::aggregate_timesheet,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ErrorRes,
        dto::SubfolderEntry,
        dto::SubfoldersRes,
        dto::CreateFolderReq,
        dto::CreateFolderRes,
        dto::CopyFolderReq,
        dto::CopyFolderRes,
        dto::UploadFileReq,
        dto::UploadFileRes,
        dto::DeleteFileReq,
        dto::DeleteFileRes,
        dto::ConvertDocReq,
        dto::ConvertDocRes,
        dto::AggregateTimesheetReq,
        dto::TimesheetRowRes,
        dto::AggregateTimesheetRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/folders", get(handlers::list_folders))
        .route("/folders", post(handlers::create_folder))
        .route("/folders/copy", post(handlers::copy_template_folder))
        .route("/folders/:id", get(handlers::get_folder))
        .route("/folders/:id/subfolders", get(handlers::list_subfolders))
        .route("/upload_file", post(handlers::upload_file))
        .route("/delete_file", post(handlers::delete_file))
        .route("/convert_doc_to_pdf/:server_id", post(handlers::convert_doc_to_pdf))
        .route("/timesheets/aggregate", post(handlers::aggregate_timesheet))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
