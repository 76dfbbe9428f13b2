//! Tool dispatch: name -> validated arguments -> backend operation -> envelope.
//!
//! `call_tool` never fails past this boundary. Every outcome, including unknown
//! tools and invalid arguments, comes back as a [`ToolResult`].

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::Instrument;

use super::args::ToolArgs;
use super::catalog::{value_type_name, ToolCatalog, ToolDefinition};
use super::registry::ToolKind;
use crate::backend::{BackendFailure, BackendOutcome, ConnectionInfo, JiraAdminClient};
use crate::types::{Error, ErrorKind};

/// One tool invocation.
///
/// `arguments` is kept as received. `null` means no arguments; any other
/// non-object is rejected at dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self::from_value(name, Value::Object(arguments))
    }

    pub fn from_value(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Failure payload of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
        }
    }
}

impl From<BackendFailure> for ToolError {
    fn from(failure: BackendFailure) -> Self {
        Self {
            kind: failure.kind,
            message: failure.message,
            http_status: failure.http_status,
        }
    }
}

impl From<Error> for ToolError {
    fn from(err: Error) -> Self {
        Self::new(err.kind(), err.message())
    }
}

/// Envelope of one tool call, serialized as `{ok, payload}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Ok(Value),
    Err(ToolError),
}

impl ToolResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ToolResult::Ok(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ToolResult::Ok(_) => None,
            ToolResult::Err(e) => Some(e.kind),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ToolResult::Ok(payload) => serde_json::json!({"ok": true, "payload": payload}),
            ToolResult::Err(err) => serde_json::json!({"ok": false, "payload": err}),
        }
    }

    fn from_outcome<T: Serialize>(outcome: BackendOutcome<T>) -> Self {
        match outcome {
            BackendOutcome::Success(payload) => match serde_json::to_value(payload) {
                Ok(value) => ToolResult::Ok(value),
                Err(e) => ToolResult::Err(ToolError::new(
                    ErrorKind::UnexpectedStatus,
                    format!("could not encode payload: {e}"),
                )),
            },
            BackendOutcome::Failure(failure) => ToolResult::Err(failure.into()),
        }
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ToolResult", 2)?;
        match self {
            ToolResult::Ok(payload) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("payload", payload)?;
            }
            ToolResult::Err(err) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("payload", err)?;
            }
        }
        state.end()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Routes tool calls to backend operations.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    catalog: ToolCatalog,
    client: JiraAdminClient,
}

impl ToolDispatcher {
    pub fn new(client: JiraAdminClient) -> Self {
        Self {
            catalog: ToolCatalog::standard(),
            client,
        }
    }

    /// Ordered tool definitions. Pure and idempotent.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        self.catalog.definitions()
    }

    pub async fn call_tool(&self, call: ToolCall) -> ToolResult {
        let call_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("tool_call", %call_id, tool = %call.name);
        async move {
            let started = Instant::now();
            let result = self.dispatch(call).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                ToolResult::Ok(_) => tracing::info!(elapsed_ms, "tool_call_succeeded"),
                ToolResult::Err(err) => tracing::warn!(
                    elapsed_ms,
                    kind = %err.kind,
                    message = %err.message,
                    "tool_call_failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, call: ToolCall) -> ToolResult {
        let Some(kind) = ToolKind::from_name(&call.name) else {
            return ToolResult::Err(Error::unknown_tool(format!("unknown tool: {}", call.name)).into());
        };
        let Some(entry) = self.catalog.get(kind) else {
            return ToolResult::Err(Error::unknown_tool(format!("unknown tool: {}", call.name)).into());
        };

        let empty = Map::new();
        let arguments = match &call.arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return ToolResult::Err(
                    Error::validation(format!(
                        "arguments must be an object, got {}",
                        value_type_name(other)
                    ))
                    .into(),
                )
            }
        };

        let errors = entry.validate_params(arguments);
        if !errors.is_empty() {
            return ToolResult::Err(Error::validation(errors.join("; ")).into());
        }
        let args = match ToolArgs::parse(kind, arguments) {
            Ok(args) => args,
            Err(e) => return ToolResult::Err(e.into()),
        };

        self.execute(args).await
    }

    async fn execute(&self, args: ToolArgs) -> ToolResult {
        let client = &self.client;
        match args {
            ToolArgs::CreateUser(a) => ToolResult::from_outcome(
                client
                    .create_user(
                        a.email.trim(),
                        a.display_name.as_deref(),
                        a.products.as_deref().unwrap_or_default(),
                    )
                    .await,
            ),
            ToolArgs::FindUserByEmail(a) => {
                ToolResult::from_outcome(client.find_user_by_email(a.email.trim()).await)
            }
            ToolArgs::AddUserToGroup(a) => {
                ToolResult::from_outcome(client.add_user_to_group(&a.account_id, &a.group_id).await)
            }
            ToolArgs::AssignProjectRole(a) => {
                let account_ids = match a.account_ids() {
                    Ok(ids) => ids,
                    Err(e) => return ToolResult::Err(e.into()),
                };
                ToolResult::from_outcome(
                    client
                        .assign_project_role(&a.project_key, &a.role_id, &account_ids, a.group_names())
                        .await,
                )
            }
            ToolArgs::GrantPermission(a) => ToolResult::from_outcome(
                client
                    .grant_permission(
                        &a.scheme_id,
                        a.permission.trim(),
                        a.holder_type,
                        a.holder_parameter.trim(),
                    )
                    .await,
            ),
            ToolArgs::ListProjectRoles(a) => {
                ToolResult::from_outcome(client.list_project_roles(&a.project_key).await)
            }
            ToolArgs::ListPermissionSchemes => {
                ToolResult::from_outcome(client.list_permission_schemes().await)
            }
            ToolArgs::ListOrgGroups => ToolResult::from_outcome(client.list_org_groups().await),
            ToolArgs::TestConnection => {
                ToolResult::from_outcome(client.get_myself().await.map(ConnectionInfo::from))
            }
        }
    }
}
