//! Stdio server: read frames, route, write responses.
//!
//! One message is handled to completion before the next frame is read.

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio_util::sync::CancellationToken;

use super::codec::{read_frame, write_json};
use super::router::{error_response, McpRouter, RpcError};
use crate::tools::ToolDispatcher;
use crate::types::McpConfig;

#[derive(Debug)]
pub struct McpServer {
    router: McpRouter,
    config: McpConfig,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher, config: McpConfig) -> Self {
        Self {
            router: McpRouter::new(dispatcher),
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Serve on the process stdin/stdout until EOF or cancellation.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serve until EOF, cancellation, or a fatal I/O error.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(max_frame_bytes = self.config.max_frame_bytes, "mcp_server_started");

        loop {
            let frame = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("mcp_server_shutting_down");
                    break;
                }
                frame = read_frame(&mut reader, self.config.max_frame_bytes) => frame,
            };

            let payload = match frame {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    tracing::info!("mcp_client_disconnected");
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!(error = %e, "mcp_frame_rejected");
                    let response =
                        error_response(serde_json::Value::Null, RpcError::parse_error(e.to_string()));
                    write_json(&mut writer, &response).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let incoming: serde_json::Value = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, "mcp_parse_error");
                    let response = error_response(
                        serde_json::Value::Null,
                        RpcError::parse_error(format!("Parse error: {e}")),
                    );
                    write_json(&mut writer, &response).await?;
                    continue;
                }
            };

            for response in self.router.handle_message(incoming).await {
                write_json(&mut writer, &response).await?;
            }
        }

        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
