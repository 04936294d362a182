//! # Graph Client
//!
//! Async access to the Microsoft Graph endpoints behind the DocBridge facade: token
//! acquisition, list-item batches, the list-item to drive-item bridge, folder and file
//! operations, and PDF rendition.
//!
//! Every call acquires its own bearer token from the configured tenant.

pub mod client;
pub mod error;
pub mod types;

pub use client::{encode_sharing_url, GraphClient};
pub use error::{GraphError, GraphResult};
pub use types::{CopyOutcome, DriveItem, DriveParentReference};
