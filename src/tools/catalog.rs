//! Tool catalog: typed metadata, parameter validation, input schemas.
//!
//! Owns tool *metadata*. Handlers live in `dispatch`; the catalog only answers
//! "which tools exist, what do they accept, and does this argument map fit".

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use super::registry::ToolKind;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    /// String that must contain at least one non-whitespace character.
    Identifier,
    StringList,
    Enum(Vec<String>),
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Identifier => match value.as_str() {
                Some(s) if s.trim().is_empty() => Err("must not be empty".to_string()),
                Some(_) => Ok(()),
                None => Err(format!("expected string, got {}", value_type_name(value))),
            },
            ParamType::StringList => {
                if let Some(arr) = value.as_array() {
                    for (i, item) in arr.iter().enumerate() {
                        if !item.is_string() {
                            return Err(format!(
                                "expected string at index {}, got {}",
                                i,
                                value_type_name(item)
                            ));
                        }
                    }
                    Ok(())
                } else {
                    Err(format!("expected array, got {}", value_type_name(value)))
                }
            }
            ParamType::Enum(variants) => {
                if let Some(s) = value.as_str() {
                    if variants.iter().any(|v| v == s) {
                        Ok(())
                    } else {
                        Err(format!(
                            "invalid enum value '{}', expected one of: {}",
                            s,
                            variants.join(", ")
                        ))
                    }
                } else {
                    Err(format!("expected string for enum, got {}", value_type_name(value)))
                }
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// JSON Schema fragment accepting (at least) what [`validate`](Self::validate) accepts.
    pub fn to_json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Identifier => json!({"type": "string", "minLength": 1, "pattern": "\\S"}),
            ParamType::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamType::Enum(variants) => json!({"type": "string", "enum": variants}),
            ParamType::Optional(inner) => {
                let mut schema = inner.to_json_schema();
                if let Some(obj) = schema.as_object_mut() {
                    if let Some(ty) = obj.remove("type") {
                        obj.insert("type".into(), json!([ty, "null"]));
                    }
                    if let Some(Value::Array(variants)) = obj.get_mut("enum") {
                        variants.push(Value::Null);
                    }
                }
                schema
            }
        }
    }
}

pub(crate) fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::required(name, ParamType::Optional(Box::new(param_type)), description)
    }

    pub fn is_required(&self) -> bool {
        !matches!(self.param_type, ParamType::Optional(_))
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = self.param_type.to_json_schema();
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".into(), json!(self.description));
        }
        schema
    }
}

// =============================================================================
// Tool definition
// =============================================================================

/// Published tool description: name, prose, JSON Schema of the arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Catalog entry: the tool kind with its parameters.
#[derive(Debug, Clone)]
pub struct ToolEntry {
    pub kind: ToolKind,
    pub description: String,
    pub parameters: Vec<ParamDef>,
}

impl ToolEntry {
    pub fn for_kind(kind: ToolKind) -> Self {
        Self {
            kind,
            description: kind.description().to_string(),
            parameters: kind.parameters(),
        }
    }

    /// Object schema with `required` and no additional properties.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.kind.name().to_string(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }

    /// Validate an argument map. Returns a list of errors (empty = valid).
    pub fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();

        for param_def in &self.parameters {
            if param_def.is_required() && !params.contains_key(&param_def.name) {
                errors.push(format!("Missing required parameter: {}", param_def.name));
            }
        }

        let known_names: HashMap<&str, &ParamDef> = self
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p))
            .collect();

        for (key, value) in params {
            if let Some(param_def) = known_names.get(key.as_str()) {
                if let Err(e) = param_def.param_type.validate(value) {
                    errors.push(format!("Parameter '{}': {}", key, e));
                }
            } else {
                errors.push(format!("Unknown parameter: {}", key));
            }
        }

        errors
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// Immutable, ordered tool catalog built once at startup.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    entries: Vec<ToolEntry>,
    definitions: Vec<ToolDefinition>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToolCatalog {
    /// Every tool kind, in listing order.
    pub fn standard() -> Self {
        let entries: Vec<ToolEntry> = ToolKind::ALL.iter().copied().map(ToolEntry::for_kind).collect();
        let definitions = entries.iter().map(ToolEntry::definition).collect();
        Self {
            entries,
            definitions,
        }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn get(&self, kind: ToolKind) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        ToolKind::from_name(name).is_some_and(|kind| self.get(kind).is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
