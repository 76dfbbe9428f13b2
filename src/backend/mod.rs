//! Backend access layer.
//!
//! - **transport**: the HTTP capability (`HttpTransport`) and its reqwest implementation
//! - **outcome**: status classification and error-body normalization
//! - **models**: typed response shapes
//! - **client**: the fixed set of admin operations against both APIs

pub mod client;
pub mod models;
pub mod outcome;
pub mod transport;

pub use client::{JiraAdminClient, DEFAULT_REQUEST_TIMEOUT};
pub use models::{
    ConnectionInfo, GroupMembershipChange, HolderType, JiraUser, OrgGroup, OrgGroupPage,
    Organization, PermissionGrant, PermissionHolder, PermissionScheme, PermissionSchemeList,
    ProjectRole, ProjectRoleLink, RoleActor, UserLookup,
};
pub use outcome::{BackendFailure, BackendOutcome};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};
