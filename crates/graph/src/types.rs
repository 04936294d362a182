//! Wire types for the Graph endpoints the client calls.

use docbridge_core::RemoteItem;
use serde::{Deserialize, Serialize};

/// A file or folder in the drive addressing scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "webUrl", default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(
        rename = "parentReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_reference: Option<DriveParentReference>,
}

impl DriveItem {
    /// Drive item id of the containing folder, if the service reported one.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_reference
            .as_ref()
            .and_then(|parent| parent.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveParentReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "driveId", default, skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,
}

/// Result of starting a server-side copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The copy runs in the background; progress can be polled at `monitor_url`.
    Accepted { monitor_url: Option<String> },
    Completed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListItemsPage {
    #[serde(default)]
    pub value: Vec<RemoteItem>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}
