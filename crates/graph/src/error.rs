use docbridge_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token request failed: {0}")]
    Token(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("item cannot be rendered as PDF: {0}")]
    NotRenderable(String),
    #[error("Graph API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Extract a human-readable message from a Graph or identity-platform error body.
///
/// Tries `error.message`, then `error_description`, then falls back to the raw body.
pub(crate) fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
        {
            return msg.to_string();
        }
        if let Some(desc) = json.get("error_description").and_then(|v| v.as_str()) {
            return desc.to_string();
        }
    }
    body.to_string()
}
