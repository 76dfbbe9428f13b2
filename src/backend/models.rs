//! Typed response shapes for both backends.
//!
//! Unknown fields are ignored at parse time and optional fields are skipped on
//! output, so a payload re-serializes to what the backend sent for the fields
//! we model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
}

impl JiraUser {
    pub fn email_matches(&self, email: &str) -> bool {
        self.email_address
            .as_deref()
            .is_some_and(|addr| addr.trim().eq_ignore_ascii_case(email.trim()))
    }
}

/// Outcome of an email search. Not finding anyone is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserLookup {
    Found { user: JiraUser },
    NotFound { email: String },
}

impl UserLookup {
    /// First case-insensitive exact email match among search results.
    pub fn from_candidates(email: &str, candidates: Vec<JiraUser>) -> Self {
        match candidates.into_iter().find(|u| u.email_matches(email)) {
            Some(user) => UserLookup::Found { user },
            None => UserLookup::NotFound {
                email: email.to_string(),
            },
        }
    }

    pub fn user(&self) -> Option<&JiraUser> {
        match self {
            UserLookup::Found { user } => Some(user),
            UserLookup::NotFound { .. } => None,
        }
    }
}

/// Summary of the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<JiraUser> for ConnectionInfo {
    fn from(user: JiraUser) -> Self {
        Self {
            account_id: user.account_id,
            display_name: user.display_name,
        }
    }
}

// =============================================================================
// Groups
// =============================================================================

/// Confirmation of an org group membership change (the API answers 204).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMembershipChange {
    pub account_id: String,
    pub group_id: String,
    pub status: &'static str,
}

impl GroupMembershipChange {
    pub fn added(account_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            group_id: group_id.into(),
            status: "added",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// One page of organization groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgGroupPage {
    #[serde(default)]
    pub data: Vec<OrgGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

// =============================================================================
// Organization
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOrganization")]
pub struct Organization {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct RawOrganization {
    data: RawOrganizationData,
}

#[derive(Deserialize)]
struct RawOrganizationData {
    id: String,
    #[serde(default)]
    attributes: Option<RawOrganizationAttributes>,
}

#[derive(Deserialize)]
struct RawOrganizationAttributes {
    #[serde(default)]
    name: Option<String>,
}

impl From<RawOrganization> for Organization {
    fn from(raw: RawOrganization) -> Self {
        Self {
            id: raw.data.id,
            name: raw.data.attributes.and_then(|a| a.name),
        }
    }
}

// =============================================================================
// Project roles
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleActor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_user: Option<ActorUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_group: Option<ActorGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorUser {
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// A project role with its current actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default)]
    pub actors: Vec<RoleActor>,
}

/// Entry of the project role index (`name -> url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRoleLink {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

impl ProjectRoleLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let role_id = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string);
        Self {
            name: name.into(),
            url,
            role_id,
        }
    }

    /// Index ordered by role name.
    pub fn from_index(index: BTreeMap<String, String>) -> Vec<Self> {
        index
            .into_iter()
            .map(|(name, url)| Self::new(name, url))
            .collect()
    }
}

// =============================================================================
// Permission schemes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolderType {
    Group,
    User,
}

impl HolderType {
    pub const ALL: [HolderType; 2] = [HolderType::Group, HolderType::User];

    pub fn as_str(self) -> &'static str {
        match self {
            HolderType::Group => "group",
            HolderType::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionHolder {
    #[serde(rename = "type")]
    pub holder_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    pub holder: PermissionHolder,
    pub permission: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionScheme {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSchemeList {
    #[serde(default)]
    pub permission_schemes: Vec<PermissionScheme>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_user_round_trips_minimal_body() {
        let user: JiraUser = serde_json::from_value(json!({"accountId": "123"})).unwrap();
        assert_eq!(serde_json::to_value(&user).unwrap(), json!({"accountId": "123"}));
    }

    #[test]
    fn test_user_ignores_unknown_fields() {
        let user: JiraUser = serde_json::from_value(json!({
            "accountId": "9",
            "emailAddress": "a@b.com",
            "avatarUrls": {"48x48": "x"},
        }))
        .unwrap();
        assert_eq!(user.email_address.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let users: Vec<JiraUser> = serde_json::from_value(json!([
            {"accountId": "1", "emailAddress": "other@b.com"},
            {"accountId": "9", "emailAddress": "a@b.com"},
        ]))
        .unwrap();
        let lookup = UserLookup::from_candidates("A@B.com", users);
        assert_eq!(lookup.user().map(|u| u.account_id.as_str()), Some("9"));
        assert_eq!(
            serde_json::to_value(&lookup).unwrap(),
            json!({"status": "found", "user": {"accountId": "9", "emailAddress": "a@b.com"}})
        );
    }

    #[test]
    fn test_lookup_not_found() {
        let lookup = UserLookup::from_candidates("a@b.com", Vec::new());
        assert_eq!(
            serde_json::to_value(&lookup).unwrap(),
            json!({"status": "not_found", "email": "a@b.com"})
        );
    }

    #[test]
    fn test_role_link_parses_id() {
        let link = ProjectRoleLink::new(
            "Developers",
            "https://acme.atlassian.net/rest/api/3/project/SCRUM/role/10001",
        );
        assert_eq!(link.role_id.as_deref(), Some("10001"));
        assert_eq!(ProjectRoleLink::new("Odd", "not-a-url").role_id, None);
    }

    #[test]
    fn test_role_index_ordered_by_name() {
        let mut index = BTreeMap::new();
        index.insert("Viewers".to_string(), "u/role/3".to_string());
        index.insert("Administrators".to_string(), "u/role/1".to_string());
        let links = ProjectRoleLink::from_index(index);
        assert_eq!(links[0].name, "Administrators");
        assert_eq!(links[1].role_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_organization_flattens_envelope() {
        let org: Organization = serde_json::from_value(json!({
            "data": {"id": "org-1", "type": "orgs", "attributes": {"name": "Acme"}}
        }))
        .unwrap();
        assert_eq!(org.name.as_deref(), Some("Acme"));
        assert_eq!(
            serde_json::to_value(&org).unwrap(),
            json!({"id": "org-1", "name": "Acme"})
        );
    }

    #[test]
    fn test_holder_type_lowercase() {
        assert_eq!(serde_json::to_value(HolderType::Group).unwrap(), "group");
        let parsed: HolderType = serde_json::from_value(json!("user")).unwrap();
        assert_eq!(parsed, HolderType::User);
    }
}
