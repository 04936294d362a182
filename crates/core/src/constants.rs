//! Constants used throughout the docbridge core crate.

/// Graph REST root used when no override is configured.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Identity platform root for the client-credentials token request.
pub const DEFAULT_LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";

/// Appended to the Graph origin to request the application's configured permissions.
pub const GRAPH_SCOPE_SUFFIX: &str = "/.default";

/// List holding the document library items.
pub const DEFAULT_LIST_ID: &str = "Documents";

/// Default listen address for the REST facade.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

/// Content type name Graph reports for folders.
pub const FOLDER_CONTENT_KIND: &str = "Folder";

/// Content type name Graph reports for regular documents.
pub const DOCUMENT_CONTENT_KIND: &str = "Document";

/// Longest file or folder name the document library accepts.
pub const MAX_ITEM_NAME_LEN: usize = 255;

pub const ENV_TENANT_ID: &str = "GRAPH_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "GRAPH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GRAPH_CLIENT_SECRET";
pub const ENV_SITE_ID: &str = "GRAPH_SITE_ID";
pub const ENV_LIST_ID: &str = "GRAPH_LIST_ID";
pub const ENV_DRIVE_ID: &str = "GRAPH_DRIVE_ID";
pub const ENV_TEMPLATE_FOLDER_ID: &str = "GRAPH_TEMPLATE_FOLDER_ID";
pub const ENV_GRAPH_BASE_URL: &str = "GRAPH_BASE_URL";
pub const ENV_LOGIN_BASE_URL: &str = "GRAPH_LOGIN_URL";
pub const ENV_GRAPH_SCOPE: &str = "GRAPH_SCOPE";
pub const ENV_REST_ADDR: &str = "DOCBRIDGE_REST_ADDR";
