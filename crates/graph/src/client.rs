//! HTTP client for the Microsoft Graph document-library endpoints.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use docbridge_core::{last_with_id, EntityId, RemoteItem, SequenceId, ServiceConfig};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use crate::error::{extract_error_message, GraphError, GraphResult};
use crate::types::{CopyOutcome, DriveItem, ListItemsPage, TokenResponse};

/// Client for the configured site, list and drive.
///
/// Cloning is cheap: the connection pool and configuration are shared.
#[derive(Clone, Debug)]
pub struct GraphClient {
    http: Client,
    cfg: Arc<ServiceConfig>,
}

impl GraphClient {
    pub fn new(cfg: Arc<ServiceConfig>) -> Self {
        Self::with_http_client(Client::new(), cfg)
    }

    pub fn with_http_client(http: Client, cfg: Arc<ServiceConfig>) -> Self {
        Self { http, cfg }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.cfg
    }

    /// Obtain an access token with the client-credentials grant.
    ///
    /// A fresh token is requested on every call.
    pub async fn acquire_token(&self) -> GraphResult<String> {
        let creds = self.cfg.credentials();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("scope", self.cfg.scope()),
        ];

        tracing::debug!(url = %self.cfg.token_url(), "requesting access token");
        let response = self
            .http
            .post(self.cfg.token_url())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Token(format!(
                "{} ({})",
                extract_error_message(&body),
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Token(format!("malformed token response: {e}")))?;
        Ok(token.access_token)
    }

    /// Fetch every item of the configured list, following `@odata.nextLink` pages.
    pub async fn list_items(&self) -> GraphResult<Vec<RemoteItem>> {
        let token = self.acquire_token().await?;
        let library = self.cfg.library();
        let mut next = Some(format!(
            "{}/sites/{}/lists/{}/items?expand=fields",
            self.cfg.graph_base_url(),
            library.site_id,
            library.list_id
        ));

        let mut items = Vec::new();
        while let Some(url) = next.take() {
            tracing::debug!(%url, "fetching list items page");
            let response = self.http.get(&url).bearer_auth(&token).send().await?;
            let page: ListItemsPage = check_response(response).await?.json().await?;
            items.extend(page.value);
            next = page.next_link;
        }

        tracing::debug!(count = items.len(), "fetched list items");
        Ok(items)
    }

    /// Bridge from a list-item sequence id to its drive item.
    pub async fn drive_item_for(&self, sequence_id: SequenceId) -> GraphResult<DriveItem> {
        let token = self.acquire_token().await?;
        let library = self.cfg.library();
        let url = format!(
            "{}/sites/{}/lists/{}/items/{}/driveItem",
            self.cfg.graph_base_url(),
            library.site_id,
            library.list_id,
            sequence_id
        );

        tracing::debug!(%url, "resolving drive item");
        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        Ok(check_response(response).await?.json().await?)
    }

    /// Resolve a stable entity id to its drive item.
    ///
    /// Fetches the current list batch, finds the item and follows its sequence id. A repeated id
    /// resolves to the last item carrying it, the same item the folder tree keeps.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotFound` when no item has the id or the item carries no usable
    /// sequence id.
    pub async fn drive_item_for_entity(&self, id: &EntityId) -> GraphResult<DriveItem> {
        let items = self.list_items().await?;
        let sequence_id = last_with_id(&items, id)
            .ok_or_else(|| GraphError::NotFound(format!("no item with id '{id}'")))?
            .sequence_id()
            .ok_or_else(|| GraphError::NotFound(format!("item '{id}' has no list item id")))?;

        self.drive_item_for(sequence_id).await
    }

    /// Create a folder named `name` under the drive item `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Conflict` when an item with that name already exists.
    pub async fn create_folder(&self, parent_id: &str, name: &str) -> GraphResult<DriveItem> {
        let token = self.acquire_token().await?;
        let url = format!(
            "{}/drives/{}/items/{}/children",
            self.cfg.graph_base_url(),
            self.cfg.library().drive_id,
            parent_id
        );
        let body = json!({
            "name": name,
            "folder": {},
            "@microsoft.graph.conflictBehavior": "fail",
        });

        tracing::debug!(%url, name, "creating folder");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        Ok(check_response(response).await?.json().await?)
    }

    /// Start a server-side copy of `source_id` into the folder `destination_id`.
    ///
    /// `new_name` renames the copy; the source name is kept otherwise.
    pub async fn copy_item(
        &self,
        source_id: &str,
        destination_id: &str,
        new_name: Option<&str>,
    ) -> GraphResult<CopyOutcome> {
        let token = self.acquire_token().await?;
        let drive_id = self.cfg.library().drive_id.as_str();
        let url = format!(
            "{}/drives/{}/items/{}/copy",
            self.cfg.graph_base_url(),
            drive_id,
            source_id
        );
        let mut body = json!({
            "parentReference": { "driveId": drive_id, "id": destination_id },
        });
        if let Some(name) = new_name {
            body["name"] = json!(name);
        }

        tracing::debug!(%url, destination_id, "copying item");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let response = check_response(response).await?;

        if response.status() == StatusCode::ACCEPTED {
            let monitor_url = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            Ok(CopyOutcome::Accepted { monitor_url })
        } else {
            Ok(CopyOutcome::Completed)
        }
    }

    /// Upload `content` as `file_name` into the folder `parent_id`, replacing any existing file.
    pub async fn upload_file(
        &self,
        parent_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> GraphResult<DriveItem> {
        let token = self.acquire_token().await?;
        let url = format!(
            "{}/drives/{}/items/{}:/{}:/content",
            self.cfg.graph_base_url(),
            self.cfg.library().drive_id,
            parent_id,
            urlencoding::encode(file_name)
        );

        tracing::debug!(%url, bytes = content.len(), "uploading file");
        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await?;
        Ok(check_response(response).await?.json().await?)
    }

    /// Resolve a sharing or web URL to its drive item.
    pub async fn resolve_share_url(&self, web_url: &str) -> GraphResult<DriveItem> {
        let token = self.acquire_token().await?;
        let url = format!(
            "{}/shares/{}/driveItem",
            self.cfg.graph_base_url(),
            encode_sharing_url(web_url)
        );

        tracing::debug!(%url, "resolving shared URL");
        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        Ok(check_response(response).await?.json().await?)
    }

    pub async fn delete_item(&self, item_id: &str) -> GraphResult<()> {
        let token = self.acquire_token().await?;
        let url = format!(
            "{}/drives/{}/items/{}",
            self.cfg.graph_base_url(),
            self.cfg.library().drive_id,
            item_id
        );

        tracing::debug!(%url, "deleting item");
        let response = self.http.delete(&url).bearer_auth(&token).send().await?;
        check_response(response).await?;
        Ok(())
    }

    /// Download the PDF rendition of a document.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotRenderable` when the service cannot convert the item.
    pub async fn render_pdf(&self, item_id: &str) -> GraphResult<Vec<u8>> {
        let token = self.acquire_token().await?;
        let url = format!(
            "{}/drives/{}/items/{}/content?format=pdf",
            self.cfg.graph_base_url(),
            self.cfg.library().drive_id,
            item_id
        );

        tracing::debug!(%url, "rendering item as PDF");
        let response = self.http.get(&url).bearer_auth(&token).send().await?;

        let status = response.status();
        if matches!(status.as_u16(), 400 | 406 | 415) {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::NotRenderable(extract_error_message(&body)));
        }

        let bytes = check_response(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Map an HTTP response to a `GraphError` based on status code.
async fn check_response(response: Response) -> GraphResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);

    match status.as_u16() {
        404 => Err(GraphError::NotFound(message)),
        409 => Err(GraphError::Conflict(message)),
        code => Err(GraphError::Api {
            status: code,
            body: message,
        }),
    }
}

/// Encode a URL for the `/shares/{token}` endpoint: `u!` followed by unpadded base64url.
pub fn encode_sharing_url(web_url: &str) -> String {
    format!("u!{}", URL_SAFE_NO_PAD.encode(web_url))
}
