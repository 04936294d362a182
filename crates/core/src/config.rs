//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the Graph client and
//! REST handlers. Nothing in request handling reads process-wide environment variables.

use crate::constants::{
    DEFAULT_GRAPH_BASE_URL, DEFAULT_LIST_ID, DEFAULT_LOGIN_BASE_URL, GRAPH_SCOPE_SUFFIX,
    ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_DRIVE_ID, ENV_GRAPH_BASE_URL, ENV_GRAPH_SCOPE,
    ENV_LIST_ID, ENV_LOGIN_BASE_URL, ENV_SITE_ID, ENV_TEMPLATE_FOLDER_ID, ENV_TENANT_ID,
};
use crate::{CoreError, CoreResult};
use docbridge_types::NonEmptyText;
use std::fmt;

/// App registration used for the client-credentials flow.
#[derive(Clone)]
pub struct GraphCredentials {
    pub tenant_id: NonEmptyText,
    pub client_id: NonEmptyText,
    pub client_secret: NonEmptyText,
}

impl fmt::Debug for GraphCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// The document library the facade manages.
#[derive(Clone, Debug)]
pub struct LibraryLocation {
    pub site_id: NonEmptyText,
    pub list_id: NonEmptyText,
    pub drive_id: NonEmptyText,
}

/// Service configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    credentials: GraphCredentials,
    library: LibraryLocation,
    template_folder_id: Option<NonEmptyText>,
    graph_base_url: String,
    login_base_url: String,
    scope: String,
}

impl ServiceConfig {
    /// Create a new `ServiceConfig`.
    ///
    /// Base URLs are stored without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if a base URL or the scope is blank or a base URL is not
    /// an http(s) URL.
    pub fn new(
        credentials: GraphCredentials,
        library: LibraryLocation,
        template_folder_id: Option<NonEmptyText>,
        graph_base_url: &str,
        login_base_url: &str,
        scope: &str,
    ) -> CoreResult<Self> {
        let graph_base_url = normalise_base_url("graph base URL", graph_base_url)?;
        let login_base_url = normalise_base_url("login base URL", login_base_url)?;

        if scope.trim().is_empty() {
            return Err(CoreError::InvalidInput("scope cannot be empty".into()));
        }

        Ok(Self {
            credentials,
            library,
            template_folder_id,
            graph_base_url,
            login_base_url,
            scope: scope.trim().to_string(),
        })
    }

    /// Build the configuration from environment-style key/value lookups.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`; tests pass a map instead so they never
    /// touch the process environment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` naming the first required variable that is missing or
    /// blank, or any validation error from [`ServiceConfig::new`].
    pub fn from_env_values(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let required = |key: &str| -> CoreResult<NonEmptyText> {
            let value = lookup(key).unwrap_or_default();
            NonEmptyText::new(&value)
                .map_err(|_| CoreError::InvalidInput(format!("{key} must be set")))
        };
        let optional = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials = GraphCredentials {
            tenant_id: required(ENV_TENANT_ID)?,
            client_id: required(ENV_CLIENT_ID)?,
            client_secret: required(ENV_CLIENT_SECRET)?,
        };
        let library = LibraryLocation {
            site_id: required(ENV_SITE_ID)?,
            list_id: NonEmptyText::new(
                optional(ENV_LIST_ID).unwrap_or_else(|| DEFAULT_LIST_ID.into()),
            )?,
            drive_id: required(ENV_DRIVE_ID)?,
        };
        let template_folder_id = optional(ENV_TEMPLATE_FOLDER_ID)
            .map(NonEmptyText::new)
            .transpose()?;

        let graph_base_url =
            optional(ENV_GRAPH_BASE_URL).unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.into());
        let scope = optional(ENV_GRAPH_SCOPE)
            .unwrap_or_else(|| default_scope_for(&graph_base_url));

        Self::new(
            credentials,
            library,
            template_folder_id,
            &graph_base_url,
            &optional(ENV_LOGIN_BASE_URL).unwrap_or_else(|| DEFAULT_LOGIN_BASE_URL.into()),
            &scope,
        )
    }

    pub fn credentials(&self) -> &GraphCredentials {
        &self.credentials
    }

    pub fn library(&self) -> &LibraryLocation {
        &self.library
    }

    /// Drive item id of the folder copied by the copy endpoint, if configured.
    pub fn template_folder_id(&self) -> Option<&NonEmptyText> {
        self.template_folder_id.as_ref()
    }

    pub fn graph_base_url(&self) -> &str {
        &self.graph_base_url
    }

    pub fn login_base_url(&self) -> &str {
        &self.login_base_url
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Token endpoint for the configured tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base_url, self.credentials.tenant_id
        )
    }
}

/// `.default` scope on the origin of `graph_base_url`, dropping any version path.
fn default_scope_for(graph_base_url: &str) -> String {
    let trimmed = graph_base_url.trim();
    let origin_end = trimmed
        .find("://")
        .and_then(|scheme_end| {
            let host_start = scheme_end + 3;
            trimmed[host_start..].find('/').map(|slash| host_start + slash)
        })
        .unwrap_or(trimmed.len());
    format!("{}{GRAPH_SCOPE_SUFFIX}", &trimmed[..origin_end])
}

fn normalise_base_url(label: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{label} cannot be empty")));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CoreError::InvalidInput(format!(
            "{label} must start with http:// or https://, got '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (ENV_TENANT_ID, "tenant-1".to_string()),
            (ENV_CLIENT_ID, "client-1".to_string()),
            (ENV_CLIENT_SECRET, "s3cret".to_string()),
            (ENV_SITE_ID, "site-1".to_string()),
            (ENV_DRIVE_ID, "drive-1".to_string()),
        ])
    }

    fn lookup<'a>(env: &'a HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| env.get(key).cloned()
    }

    #[test]
    fn test_from_env_values_applies_defaults() {
        let env = full_env();
        let cfg = ServiceConfig::from_env_values(lookup(&env)).unwrap();

        assert_eq!(cfg.library().list_id.as_str(), DEFAULT_LIST_ID);
        assert_eq!(cfg.graph_base_url(), DEFAULT_GRAPH_BASE_URL);
        assert_eq!(cfg.scope(), "https://graph.microsoft.com/.default");
        assert!(cfg.template_folder_id().is_none());
        assert_eq!(
            cfg.token_url(),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_from_env_values_rejects_missing_required_value() {
        let mut env = full_env();
        env.insert(ENV_CLIENT_SECRET, "   ".to_string());

        let err = ServiceConfig::from_env_values(lookup(&env)).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains(ENV_CLIENT_SECRET)));
    }

    #[test]
    fn test_base_urls_are_normalised() {
        let mut env = full_env();
        env.insert(ENV_GRAPH_BASE_URL, "http://127.0.0.1:9000/v1.0/".to_string());
        env.insert(ENV_TEMPLATE_FOLDER_ID, "01TEMPLATE".to_string());

        let cfg = ServiceConfig::from_env_values(lookup(&env)).unwrap();
        assert_eq!(cfg.graph_base_url(), "http://127.0.0.1:9000/v1.0");
        assert_eq!(
            cfg.template_folder_id().map(|id| id.as_str()),
            Some("01TEMPLATE")
        );
    }

    #[test]
    fn test_default_scope_follows_graph_base_url() {
        let mut env = full_env();
        env.insert(ENV_GRAPH_BASE_URL, "https://graph.microsoft.us/v1.0".to_string());
        let cfg = ServiceConfig::from_env_values(lookup(&env)).unwrap();
        assert_eq!(cfg.scope(), "https://graph.microsoft.us/.default");

        env.insert(ENV_GRAPH_SCOPE, "api://custom/.default".to_string());
        let cfg = ServiceConfig::from_env_values(lookup(&env)).unwrap();
        assert_eq!(cfg.scope(), "api://custom/.default");
    }

    #[test]
    fn test_default_scope_without_path() {
        assert_eq!(
            default_scope_for("http://127.0.0.1:9000"),
            "http://127.0.0.1:9000/.default"
        );
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let mut env = full_env();
        env.insert(ENV_LOGIN_BASE_URL, "ftp://login".to_string());

        let err = ServiceConfig::from_env_values(lookup(&env)).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("http")));
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let env = full_env();
        let cfg = ServiceConfig::from_env_values(lookup(&env)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
