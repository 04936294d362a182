//! Mapping from library errors to HTTP responses.
//!
//! Every failure is returned as `{"detail": "..."}` with a status chosen from the error kind.

use api_shared::ErrorRes;
use axum::{http::StatusCode, response::Json};
use docbridge_core::CoreError;
use graph_client::GraphError;

pub type ApiError = (StatusCode, Json<ErrorRes>);

pub fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorRes::new(detail)))
}

pub fn core_status(e: &CoreError) -> StatusCode {
    match e {
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidInput(_)
        | CoreError::Text(_)
        | CoreError::Csv(_)
        | CoreError::TimesheetRow { .. }
        | CoreError::Pdf(_) => StatusCode::BAD_REQUEST,
        CoreError::CsvWrite(_)
        | CoreError::PdfWrite(_)
        | CoreError::FileRead(_)
        | CoreError::FileWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn graph_status(e: &GraphError) -> StatusCode {
    match e {
        GraphError::NotFound(_) => StatusCode::NOT_FOUND,
        GraphError::Conflict(_) => StatusCode::CONFLICT,
        GraphError::NotRenderable(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        GraphError::Core(inner) => core_status(inner),
        GraphError::Http(_)
        | GraphError::Token(_)
        | GraphError::Api { .. }
        | GraphError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Logs `e` under `context` and converts it to a response.
pub fn from_core(context: &str, e: CoreError) -> ApiError {
    tracing::error!("{} error: {:?}", context, e);
    api_error(core_status(&e), e.to_string())
}

/// Logs `e` under `context` and converts it to a response.
pub fn from_graph(context: &str, e: GraphError) -> ApiError {
    tracing::error!("{} error: {:?}", context, e);
    api_error(graph_status(&e), e.to_string())
}
