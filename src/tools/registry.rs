//! The closed set of tools this server exposes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::{ParamDef, ParamType};
use crate::backend::HolderType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    CreateUser,
    FindUserByEmail,
    AddUserToGroup,
    AssignProjectRole,
    GrantPermission,
    ListProjectRoles,
    ListPermissionSchemes,
    ListOrgGroups,
    TestConnection,
}

impl ToolKind {
    /// Listing order.
    pub const ALL: [ToolKind; 9] = [
        ToolKind::CreateUser,
        ToolKind::FindUserByEmail,
        ToolKind::AddUserToGroup,
        ToolKind::AssignProjectRole,
        ToolKind::GrantPermission,
        ToolKind::ListProjectRoles,
        ToolKind::ListPermissionSchemes,
        ToolKind::ListOrgGroups,
        ToolKind::TestConnection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::CreateUser => "create_user",
            ToolKind::FindUserByEmail => "find_user_by_email",
            ToolKind::AddUserToGroup => "add_user_to_group",
            ToolKind::AssignProjectRole => "assign_project_role",
            ToolKind::GrantPermission => "grant_permission",
            ToolKind::ListProjectRoles => "list_project_roles",
            ToolKind::ListPermissionSchemes => "list_permission_schemes",
            ToolKind::ListOrgGroups => "list_org_groups",
            ToolKind::TestConnection => "test_connection",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::CreateUser => {
                "Create (invite) a new user by email address, optionally with a display name and product access"
            }
            ToolKind::FindUserByEmail => {
                "Find a user by exact email address (case-insensitive); reports not_found when no user matches"
            }
            ToolKind::AddUserToGroup => {
                "Add a user (account id) to an organization group (group id) through the Org Admin API"
            }
            ToolKind::AssignProjectRole => {
                "Assign users (account ids) and/or groups (group names) to a project role"
            }
            ToolKind::GrantPermission => {
                "Grant a permission in a permission scheme to a group or user"
            }
            ToolKind::ListProjectRoles => "List the roles available in a project",
            ToolKind::ListPermissionSchemes => "List all permission schemes",
            ToolKind::ListOrgGroups => "List the groups of the organization",
            ToolKind::TestConnection => {
                "Check REST API credentials and return the authenticated account"
            }
        }
    }

    pub fn parameters(self) -> Vec<ParamDef> {
        match self {
            ToolKind::CreateUser => vec![
                ParamDef::required("email", ParamType::Identifier, "Email address of the new user"),
                ParamDef::optional("display_name", ParamType::String, "Display name"),
                ParamDef::optional(
                    "products",
                    ParamType::StringList,
                    "Products to grant access to (e.g. jira-software); defaults to none",
                ),
            ],
            ToolKind::FindUserByEmail => vec![ParamDef::required(
                "email",
                ParamType::Identifier,
                "Email address to search for",
            )],
            ToolKind::AddUserToGroup => vec![
                ParamDef::required("account_id", ParamType::Identifier, "Account id of the user"),
                ParamDef::required(
                    "group_id",
                    ParamType::Identifier,
                    "Organization group id (not the display name)",
                ),
            ],
            ToolKind::AssignProjectRole => vec![
                ParamDef::required("project_key", ParamType::Identifier, "Project key (e.g. SCRUM)"),
                ParamDef::required("role_id", ParamType::Identifier, "Project role id"),
                ParamDef::optional("account_ids", ParamType::StringList, "Account ids to assign"),
                ParamDef::optional("group_names", ParamType::StringList, "Group names to assign"),
            ],
            ToolKind::GrantPermission => vec![
                ParamDef::required("scheme_id", ParamType::Identifier, "Permission scheme id"),
                ParamDef::required(
                    "permission",
                    ParamType::Identifier,
                    "Permission key (e.g. BROWSE_PROJECTS)",
                ),
                ParamDef::required(
                    "holder_type",
                    ParamType::Enum(HolderType::ALL.iter().map(|h| h.as_str().to_string()).collect()),
                    "Holder type",
                ),
                ParamDef::required(
                    "holder_parameter",
                    ParamType::Identifier,
                    "Group name or account id of the holder",
                ),
            ],
            ToolKind::ListProjectRoles => vec![ParamDef::required(
                "project_key",
                ParamType::Identifier,
                "Project key (e.g. SCRUM)",
            )],
            ToolKind::ListPermissionSchemes | ToolKind::ListOrgGroups | ToolKind::TestConnection => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.name());
        }
        assert_eq!(ToolKind::from_name("CREATE_USER"), None);
    }

    #[test]
    fn test_holder_type_enum_values() {
        let params = ToolKind::GrantPermission.parameters();
        let holder = params.iter().find(|p| p.name == "holder_type").unwrap();
        assert_eq!(
            holder.param_type,
            ParamType::Enum(vec!["group".to_string(), "user".to_string()])
        );
    }
}
