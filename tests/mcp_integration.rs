//! Stdio protocol integration tests: frames -> router -> dispatcher -> frames.

mod common;

use common::{dispatcher, StubTransport};
use jira_admin_mcp::mcp::codec::{read_frame, write_frame};
use jira_admin_mcp::mcp::{McpServer, RpcError, PROTOCOL_VERSION};
use jira_admin_mcp::types::McpConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

struct Client {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    server: JoinHandle<std::io::Result<()>>,
}

impl Client {
    async fn send_raw(&mut self, line: &[u8]) {
        write_frame(&mut self.writer, line).await.unwrap();
    }

    async fn request(&mut self, request: Value) -> Value {
        self.send_raw(&serde_json::to_vec(&request).unwrap()).await;
        self.recv().await
    }

    async fn recv(&mut self) -> Value {
        let frame = read_frame(&mut self.reader, 1 << 20).await.unwrap().unwrap();
        serde_json::from_slice(&frame).unwrap()
    }
}

/// Helper: run an McpServer over an in-memory duplex pipe.
fn start(transport: Arc<StubTransport>, config: McpConfig) -> Client {
    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let (client_read, client_write) = tokio::io::split(client_side);

    let server = McpServer::new(dispatcher(transport), config);
    let handle = tokio::spawn(async move { server.serve(BufReader::new(server_read), server_write).await });

    Client {
        reader: BufReader::new(client_read),
        writer: client_write,
        server: handle,
    }
}

#[tokio::test]
async fn test_initialize_list_call_round_trip() {
    let transport = Arc::new(StubTransport::new().route(
        "POST",
        "/rest/api/3/user",
        201,
        r#"{"accountId":"123"}"#,
    ));
    let mut client = start(transport, McpConfig::default());

    let init = client
        .request(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": PROTOCOL_VERSION, "capabilities": {}, "clientInfo": {"name": "t", "version": "0"}
        }}))
        .await;
    assert_eq!(init["result"]["protocolVersion"], PROTOCOL_VERSION);
    assert!(init["result"]["capabilities"]["tools"].is_object());

    client
        .send_raw(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;

    let list = client
        .request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .await;
    let tools = list["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 9);
    assert_eq!(tools[0]["name"], "create_user");
    assert_eq!(tools[0]["inputSchema"]["type"], "object");

    let call = client
        .request(json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
            "name": "create_user", "arguments": {"email": "a@b.com"}
        }}))
        .await;
    assert_eq!(call["id"], 3);
    assert_eq!(call["result"]["isError"], false);
    assert_eq!(
        call["result"]["structuredContent"],
        json!({"ok": true, "payload": {"accountId": "123"}})
    );

    tokio::io::AsyncWriteExt::shutdown(&mut client.writer).await.unwrap();
    client.server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unknown_method_is_rejected() {
    let mut client = start(Arc::new(StubTransport::new()), McpConfig::default());
    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 7, "method": "prompts/list"}))
        .await;
    assert_eq!(response["error"]["code"], RpcError::METHOD_NOT_FOUND);
    assert_eq!(response["id"], 7);
}

#[tokio::test]
async fn test_malformed_json_gets_parse_error_and_server_continues() {
    let mut client = start(Arc::new(StubTransport::new()), McpConfig::default());

    client.send_raw(b"{not json").await;
    let response = client.recv().await;
    assert_eq!(response["error"]["code"], RpcError::PARSE_ERROR);
    assert_eq!(response["id"], Value::Null);

    let pong = client
        .request(json!({"jsonrpc": "2.0", "id": 8, "method": "ping"}))
        .await;
    assert_eq!(pong["result"], json!({}));
}

#[tokio::test]
async fn test_oversized_frame_is_rejected() {
    let config = McpConfig {
        max_frame_bytes: 128,
    };
    let mut client = start(Arc::new(StubTransport::new()), config);

    let big = json!({"jsonrpc": "2.0", "id": 1, "method": "ping", "params": {"pad": "x".repeat(512)}});
    client.send_raw(&serde_json::to_vec(&big).unwrap()).await;
    let response = client.recv().await;
    assert_eq!(response["error"]["code"], RpcError::PARSE_ERROR);

    let pong = client
        .request(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}))
        .await;
    assert_eq!(pong["id"], 2);
}

#[tokio::test]
async fn test_tool_failure_is_reported_in_result() {
    let transport = Arc::new(StubTransport::always(404, r#"{"errorMessages":["No project"]}"#));
    let mut client = start(transport, McpConfig::default());

    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
            "name": "list_project_roles", "arguments": {"project_key": "NOPE"}
        }}))
        .await;
    let result = &response["result"];
    assert_eq!(result["isError"], true);
    assert_eq!(result["structuredContent"]["payload"]["kind"], "NotFoundError");
    assert_eq!(result["structuredContent"]["payload"]["message"], "HTTP 404: No project");
}

#[tokio::test]
async fn test_cancellation_stops_server() {
    let (client_side, server_side) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let cancel = tokio_util::sync::CancellationToken::new();
    let server = McpServer::new(dispatcher(Arc::new(StubTransport::new())), McpConfig::default())
        .with_cancellation(cancel.clone());

    let handle = tokio::spawn(async move { server.serve(BufReader::new(server_read), server_write).await });
    cancel.cancel();
    handle.await.unwrap().unwrap();
    drop(client_side);
}
