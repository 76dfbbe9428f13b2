//! Tool infrastructure: registry, catalog, argument parsing, dispatch.
//!
//! The tool set is closed (`ToolKind`). The catalog publishes definitions and
//! validates argument maps; the dispatcher turns a validated call into one
//! backend operation and wraps the outcome in a `ToolResult`.

pub mod args;
pub mod catalog;
pub mod dispatch;
pub mod registry;

pub use args::ToolArgs;
pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolDefinition, ToolEntry};
pub use dispatch::{ToolCall, ToolDispatcher, ToolError, ToolResult};
pub use registry::ToolKind;
