//! Core types for the admin tool server.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (AccountId, ProjectKey, etc.)
//! - **Errors**: Error taxonomy and the crate error type
//! - **Config**: Configuration sources and process configuration
//! - **Credentials**: Backend endpoints and credential sets

mod config;
mod credentials;
mod errors;
mod ids;

pub use config::{
    Config, ConfigSource, EnvSource, HttpConfig, McpConfig, ObservabilityConfig, ServerConfig,
    ADMIN_API_KEY, HTTP_TIMEOUT, JIRA_API_TOKEN, JIRA_URL, JIRA_USERNAME, LOG_FORMAT, MCP_PORT,
    ORG_ADMIN_URL, ORG_ID, PROBE_TIMEOUT, REQUIRED_KEYS,
};
pub use credentials::{CredentialContext, OrgScope, DEFAULT_ORG_ADMIN_URL};
pub use errors::{Error, ErrorKind, Result};
pub use ids::{AccountId, GroupId, ProjectKey, RoleId, SchemeId};
