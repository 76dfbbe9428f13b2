//! # Jira Admin MCP - administrative tool server
//!
//! Exposes a fixed set of administrative operations (user creation, group
//! membership, project-role assignment, permission-scheme grants) through a
//! uniform tool-calling interface, and reports aggregate connectivity health.
//!
//! ## Architecture
//!
//! ```text
//!   stdio JSON-RPC ──► McpRouter ──► ToolDispatcher ──► JiraAdminClient ──► HttpTransport
//!                                      │  (catalog,          │  REST API (Basic)
//!                                      │   validation)       │  Org Admin API (Bearer)
//!                                      ▼                     ▼
//!                                   ToolResult          BackendOutcome
//!
//!   GET /health ──► HealthAggregator ──► environment │ rest_api │ org_admin_api
//! ```
//!
//! Only configuration errors are fatal (at startup). Everything else is
//! reported in a `ToolResult` or as an unhealthy probe.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod health;
pub mod mcp;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use backend::{BackendOutcome, HttpTransport, JiraAdminClient, ReqwestTransport};
pub use health::{HealthAggregator, HealthReport, HealthStatus};
pub use tools::{ToolCall, ToolDispatcher, ToolResult};
pub use types::{Config, CredentialContext, Error, ErrorKind, Result};
