//! # DocBridge Core
//!
//! Core logic for the DocBridge document-library facade.
//!
//! This crate contains pure data operations over content-service batches and local files:
//! - Folder hierarchy reconstruction and lookups ([`hierarchy`])
//! - The typed view of a remote list item ([`item`])
//! - PDF concatenation for rendered documents ([`pdf`])
//! - Timesheet CSV aggregation ([`timesheet`])
//! - Startup configuration ([`config`])
//!
//! **No API concerns**: talking to the content service belongs in `graph-client`, and HTTP
//! handlers belong in `api-rest` and `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod hierarchy;
pub mod item;
pub mod pdf;
pub mod timesheet;
pub mod validation;

pub use config::{GraphCredentials, LibraryLocation, ServiceConfig};
pub use error::{CoreError, CoreResult};
pub use hierarchy::{
    build_hierarchy, find_by_id, immediate_children_of, last_with_id, ChildEntry, ChildListing,
    FolderNode,
};
pub use item::{ContentKind, RemoteItem};

pub use docbridge_types::{EntityId, NonEmptyText, SequenceId, TextError};
