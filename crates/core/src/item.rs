//! Remote content items as returned by the Graph list-items endpoint.
//!
//! Only the members the facade reads are typed. Everything else on the item is kept in
//! `extra` so a node's raw item can be echoed back to clients unchanged.

use crate::constants::{DOCUMENT_CONTENT_KIND, FOLDER_CONTENT_KIND};
use docbridge_types::{EntityId, SequenceId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One list item from the content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Compound `"<entityId>,<revision>"` tag.
    #[serde(rename = "@odata.etag", default, skip_serializing_if = "Option::is_none")]
    pub version_tag: Option<String>,

    /// List-item id exactly as received; see [`RemoteItem::sequence_id`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(
        rename = "parentReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_reference: Option<ParentReference>,

    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentTypeRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<ItemFields>,

    #[serde(rename = "webUrl", default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    #[serde(rename = "FileLeafRef", default, skip_serializing_if = "Option::is_none")]
    pub file_leaf_ref: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteItem {
    /// Stable identifier derived from the version tag. A missing tag yields the empty id.
    pub fn entity_id(&self) -> EntityId {
        EntityId::from_version_tag(self.version_tag.as_deref().unwrap_or_default())
    }

    /// List-item id, accepting `"12"` or `12`. Anything else is `None`.
    pub fn sequence_id(&self) -> Option<SequenceId> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64().map(SequenceId::new),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Declared parent, treating an empty parent id as no parent.
    pub fn parent_entity_id(&self) -> Option<&EntityId> {
        self.parent_reference
            .as_ref()
            .and_then(|parent| parent.id.as_ref())
            .filter(|id| !id.is_empty())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.fields
            .as_ref()
            .and_then(|fields| fields.file_leaf_ref.as_deref())
    }

    pub fn content_kind(&self) -> Option<ContentKind> {
        self.content_type
            .as_ref()
            .and_then(|ct| ct.name.as_deref())
            .map(ContentKind::from)
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.content_kind(), Some(ContentKind::Folder))
    }
}

/// Classifier distinguishing folders from documents and any other list content type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Folder,
    Document,
    Other(String),
}

impl ContentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ContentKind::Folder => FOLDER_CONTENT_KIND,
            ContentKind::Document => DOCUMENT_CONTENT_KIND,
            ContentKind::Other(name) => name,
        }
    }
}

impl From<&str> for ContentKind {
    fn from(value: &str) -> Self {
        match value {
            FOLDER_CONTENT_KIND => ContentKind::Folder,
            DOCUMENT_CONTENT_KIND => ContentKind::Document,
            other => ContentKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
