//! # API Shared
//!
//! Shared definitions for the DocBridge APIs.
//!
//! Contains:
//! - Request and response bodies (`dto` module), documented for OpenAPI
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
