//! Request and response bodies for the REST surface.
//!
//! Field names are part of the public contract and match what existing clients send and read.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

impl ErrorRes {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubfolderEntry {
    pub name: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubfoldersRes {
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub subfolders: Vec<SubfolderEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderReq {
    /// Entity id of the folder to create the new folder in.
    pub parent_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderRes {
    /// Drive item id of the new folder.
    pub id: String,
    pub name: Option<String>,
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CopyFolderReq {
    /// Entity id of the folder the template is copied into.
    pub destination_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CopyFolderRes {
    /// `accepted` while the service copies in the background, `completed` otherwise.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadFileReq {
    pub file_name: String,
    /// Entity id of the destination folder.
    pub server_id: String,
    /// Standard base64 file content.
    pub file_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadFileRes {
    pub message: String,
    pub file_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileReq {
    pub file_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileRes {
    pub message: String,
    pub file_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConvertDocReq {
    /// Standard base64 PDF appended after the rendered document.
    pub pdf_to_append_b64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConvertDocRes {
    pub combined_pdf_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharepoint_file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggregateTimesheetReq {
    /// Standard base64 CSV export.
    pub csv_base64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimesheetRowRes {
    pub project: String,
    pub person: Option<String>,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggregateTimesheetRes {
    pub rows: Vec<TimesheetRowRes>,
    pub total_hours: f64,
    pub summary_csv: String,
}
