//! Typed tool arguments.
//!
//! Parsing runs after catalog validation, so shape errors here are rare; the
//! newtype identifiers still reject blank values on their own.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::registry::ToolKind;
use crate::backend::HolderType;
use crate::types::{AccountId, Error, GroupId, ProjectKey, Result, RoleId, SchemeId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserArgs {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindUserArgs {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddUserToGroupArgs {
    pub account_id: AccountId,
    pub group_id: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignProjectRoleArgs {
    pub project_key: ProjectKey,
    pub role_id: RoleId,
    #[serde(default)]
    pub account_ids: Option<Vec<String>>,
    #[serde(default)]
    pub group_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantPermissionArgs {
    pub scheme_id: SchemeId,
    pub permission: String,
    pub holder_type: HolderType,
    pub holder_parameter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectArgs {
    pub project_key: ProjectKey,
}

/// Arguments of one call, one variant per tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolArgs {
    CreateUser(CreateUserArgs),
    FindUserByEmail(FindUserArgs),
    AddUserToGroup(AddUserToGroupArgs),
    AssignProjectRole(AssignProjectRoleArgs),
    GrantPermission(GrantPermissionArgs),
    ListProjectRoles(ProjectArgs),
    ListPermissionSchemes,
    ListOrgGroups,
    TestConnection,
}

impl ToolArgs {
    pub fn parse(kind: ToolKind, arguments: &Map<String, Value>) -> Result<Self> {
        Ok(match kind {
            ToolKind::CreateUser => ToolArgs::CreateUser(from_map(arguments)?),
            ToolKind::FindUserByEmail => ToolArgs::FindUserByEmail(from_map(arguments)?),
            ToolKind::AddUserToGroup => ToolArgs::AddUserToGroup(from_map(arguments)?),
            ToolKind::AssignProjectRole => ToolArgs::AssignProjectRole(from_map(arguments)?),
            ToolKind::GrantPermission => ToolArgs::GrantPermission(from_map(arguments)?),
            ToolKind::ListProjectRoles => ToolArgs::ListProjectRoles(from_map(arguments)?),
            ToolKind::ListPermissionSchemes => ToolArgs::ListPermissionSchemes,
            ToolKind::ListOrgGroups => ToolArgs::ListOrgGroups,
            ToolKind::TestConnection => ToolArgs::TestConnection,
        })
    }
}

impl AssignProjectRoleArgs {
    /// Account ids, blank entries rejected.
    pub fn account_ids(&self) -> Result<Vec<AccountId>> {
        self.account_ids
            .iter()
            .flatten()
            .map(|id| AccountId::from_string(id.as_str()).map_err(Error::validation))
            .collect()
    }

    pub fn group_names(&self) -> &[String] {
        self.group_names.as_deref().unwrap_or_default()
    }
}

fn from_map<T: DeserializeOwned>(arguments: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(arguments.clone()))
        .map_err(|e| Error::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_create_user_defaults() {
        let args = ToolArgs::parse(ToolKind::CreateUser, &map(json!({"email": "a@b.com"}))).unwrap();
        assert_eq!(
            args,
            ToolArgs::CreateUser(CreateUserArgs {
                email: "a@b.com".into(),
                display_name: None,
                products: None,
            })
        );
    }

    #[test]
    fn test_parse_rejects_blank_identifier() {
        let err = ToolArgs::parse(
            ToolKind::ListProjectRoles,
            &map(json!({"project_key": " "})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::Validation);
    }

    #[test]
    fn test_parse_holder_type() {
        let args = ToolArgs::parse(
            ToolKind::GrantPermission,
            &map(json!({
                "scheme_id": "10000",
                "permission": "BROWSE_PROJECTS",
                "holder_type": "user",
                "holder_parameter": "abc",
            })),
        )
        .unwrap();
        match args {
            ToolArgs::GrantPermission(g) => assert_eq!(g.holder_type, HolderType::User),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_assign_role_lists() {
        let args: AssignProjectRoleArgs = from_map(&map(json!({
            "project_key": "SCRUM",
            "role_id": "10002",
            "account_ids": ["a1", "  "],
            "group_names": null,
        })))
        .unwrap();
        assert!(args.account_ids().is_err());
        assert!(args.group_names().is_empty());
    }
}
