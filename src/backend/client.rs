//! Authenticated client for the REST API and the Org Admin API.
//!
//! Every operation is exactly one request/response cycle with no retry. The
//! outcome is either the typed payload or a [`BackendFailure`] classified by
//! HTTP status.

use reqwest::Url;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::models::{
    GroupMembershipChange, HolderType, JiraUser, OrgGroupPage, Organization, PermissionGrant,
    PermissionSchemeList, ProjectRole, ProjectRoleLink, UserLookup,
};
use super::outcome::{parse_response, BackendFailure, BackendOutcome};
use super::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::types::{AccountId, CredentialContext, GroupId, OrgScope, ProjectKey, RoleId, SchemeId};

const REST_API_PREFIX: [&str; 3] = ["rest", "api", "3"];
const ORG_API_PREFIX: [&str; 3] = ["admin", "v1", "orgs"];

/// Default upper bound on one backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct JiraAdminClient {
    credentials: Arc<CredentialContext>,
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl fmt::Debug for JiraAdminClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraAdminClient")
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl JiraAdminClient {
    pub fn new(credentials: Arc<CredentialContext>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            credentials,
            transport,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(&self) -> &CredentialContext {
        &self.credentials
    }

    // =========================================================================
    // REST API operations
    // =========================================================================

    /// Create (invite) a user. `products` may be empty; a blank display name is omitted.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: Option<&str>,
        products: &[String],
    ) -> BackendOutcome<JiraUser> {
        let mut body = Map::new();
        body.insert("emailAddress".into(), json!(email));
        body.insert("products".into(), json!(products));
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            body.insert("displayName".into(), json!(name));
        }

        let result = self
            .rest(HttpMethod::Post, &["user"], &[], Some(Value::Object(body)))
            .await;
        finish("create_user", result)
    }

    /// First user whose email matches case-insensitively.
    pub async fn find_user_by_email(&self, email: &str) -> BackendOutcome<UserLookup> {
        let result = self
            .rest::<Vec<JiraUser>>(HttpMethod::Get, &["user", "search"], &[("query", email)], None)
            .await
            .map(|candidates| UserLookup::from_candidates(email, candidates));
        finish("find_user_by_email", result)
    }

    /// Replace role actors. At least one of the two lists must be non-empty.
    pub async fn assign_project_role(
        &self,
        project_key: &ProjectKey,
        role_id: &RoleId,
        account_ids: &[AccountId],
        group_names: &[String],
    ) -> BackendOutcome<ProjectRole> {
        if account_ids.is_empty() && group_names.is_empty() {
            return finish(
                "assign_project_role",
                Err(BackendFailure::validation(
                    "at least one of account_ids or group_names must be provided",
                )),
            );
        }

        let mut actors = Map::new();
        if !account_ids.is_empty() {
            actors.insert("atlassian-user-role-actor".into(), json!(account_ids));
        }
        if !group_names.is_empty() {
            actors.insert("atlassian-group-role-actor".into(), json!(group_names));
        }
        let body = json!({ "categorisedActors": actors });

        let result = self
            .rest(
                HttpMethod::Put,
                &["project", project_key.as_str(), "role", role_id.as_str()],
                &[],
                Some(body),
            )
            .await;
        finish("assign_project_role", result)
    }

    pub async fn grant_permission(
        &self,
        scheme_id: &SchemeId,
        permission: &str,
        holder_type: HolderType,
        holder_parameter: &str,
    ) -> BackendOutcome<PermissionGrant> {
        let body = json!({
            "holder": {
                "type": holder_type.as_str(),
                "parameter": holder_parameter,
            },
            "permission": permission,
        });

        let result = self
            .rest(
                HttpMethod::Post,
                &["permissionscheme", scheme_id.as_str(), "permission"],
                &[],
                Some(body),
            )
            .await;
        finish("grant_permission", result)
    }

    /// Role index of a project, ordered by role name.
    pub async fn list_project_roles(
        &self,
        project_key: &ProjectKey,
    ) -> BackendOutcome<Vec<ProjectRoleLink>> {
        let result = self
            .rest::<BTreeMap<String, String>>(
                HttpMethod::Get,
                &["project", project_key.as_str(), "role"],
                &[],
                None,
            )
            .await
            .map(ProjectRoleLink::from_index);
        finish("list_project_roles", result)
    }

    pub async fn list_permission_schemes(&self) -> BackendOutcome<PermissionSchemeList> {
        let result = self
            .rest(HttpMethod::Get, &["permissionscheme"], &[], None)
            .await;
        finish("list_permission_schemes", result)
    }

    /// The authenticated principal.
    pub async fn get_myself(&self) -> BackendOutcome<JiraUser> {
        let result = self.rest(HttpMethod::Get, &["myself"], &[], None).await;
        finish("get_myself", result)
    }

    // =========================================================================
    // Org Admin API operations
    // =========================================================================

    pub async fn add_user_to_group(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
    ) -> BackendOutcome<GroupMembershipChange> {
        let body = json!({ "groupIds": [group_id.as_str()] });
        let result = self
            .org::<IgnoredAny>(
                HttpMethod::Post,
                &["users", account_id.as_str(), "manage", "groups"],
                Some(body),
            )
            .await
            .map(|_| GroupMembershipChange::added(account_id.as_str(), group_id.as_str()));
        finish("add_user_to_group", result)
    }

    pub async fn list_org_groups(&self) -> BackendOutcome<OrgGroupPage> {
        let result = self.org(HttpMethod::Get, &["groups"], None).await;
        finish("list_org_groups", result)
    }

    pub async fn get_organization(&self) -> BackendOutcome<Organization> {
        let result = self.org(HttpMethod::Get, &[], None).await;
        finish("get_organization", result)
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    async fn rest<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, BackendFailure> {
        let mut url = join_path(self.credentials.rest_base_url(), &REST_API_PREFIX, segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }

        let mut request = HttpRequest::new(method, url, self.timeout)
            .header("Authorization", self.credentials.basic_auth_header());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.execute(request).await?;
        parse_response(&response)
    }

    async fn org<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<T, BackendFailure> {
        let scope: OrgScope<'_> = self.credentials.org_scope()?;
        let mut prefix: Vec<&str> = ORG_API_PREFIX.to_vec();
        prefix.push(scope.org_id);
        let url = join_path(scope.base_url, &prefix, segments)?;

        let mut request =
            HttpRequest::new(method, url, self.timeout).header("Authorization", scope.bearer_header());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.execute(request).await?;
        parse_response(&response)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BackendFailure> {
        tracing::debug!(method = %request.method, url = %request.url, "backend_request");
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(TransportError::Timeout(self.timeout).into()),
        }
    }
}

/// `base` + prefix + segments, each segment percent-encoded.
fn join_path(base: &Url, prefix: &[&str], segments: &[&str]) -> Result<Url, BackendFailure> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| BackendFailure::from(crate::types::Error::configuration(format!(
            "base URL '{base}' cannot carry a path"
        ))))?
        .pop_if_empty()
        .extend(prefix)
        .extend(segments);
    Ok(url)
}

fn finish<T>(operation: &'static str, result: Result<T, BackendFailure>) -> BackendOutcome<T> {
    match &result {
        Ok(_) => tracing::info!(operation, "backend_call_succeeded"),
        Err(failure) => tracing::warn!(
            operation,
            kind = %failure.kind,
            http_status = ?failure.http_status,
            message = %failure.message,
            "backend_call_failed"
        ),
    }
    result.into()
}
