//! Stdio tool protocol (JSON-RPC 2.0, one message per line).
//!
//! - **codec**: line framing with a size cap
//! - **router**: method routing and the `tools/call` envelope
//! - **server**: the read/route/write loop

pub mod codec;
pub mod router;
pub mod server;

pub use router::{McpRouter, RpcError, PROTOCOL_VERSION, SERVER_NAME};
pub use server::McpServer;
