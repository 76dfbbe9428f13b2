//! jira-admin-mcp - main entry point.
//!
//! Subcommands:
//! - serve: tool protocol over stdio, optionally with the HTTP health endpoint
//! - health: print one health report, exit 1 when unhealthy
//! - health-server: HTTP health endpoint only
//! - tools: print the tool catalogue

use clap::{Parser, Subcommand};
use jira_admin_mcp::backend::{HttpTransport, JiraAdminClient, ReqwestTransport};
use jira_admin_mcp::health::{self, HealthAggregator};
use jira_admin_mcp::mcp::McpServer;
use jira_admin_mcp::tools::{ToolCatalog, ToolDispatcher};
use jira_admin_mcp::types::{ConfigSource, EnvSource};
use jira_admin_mcp::{Config, CredentialContext};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "jira-admin-mcp", version, about = "Jira administration tool server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the tool protocol on stdin/stdout (default).
    Serve {
        /// Also serve GET /health on this address (e.g. 0.0.0.0:6000).
        #[arg(long, env = "JIRA_ADMIN_HEALTH_ADDR")]
        health_addr: Option<SocketAddr>,
    },
    /// Run the health probes once and print the report as JSON.
    Health,
    /// Serve only the HTTP health endpoint.
    HealthServer {
        /// Bind address; defaults to 0.0.0.0:$MCP_PORT.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Print the tool catalogue as JSON.
    Tools,
}

#[tokio::main]
async fn main() -> ExitCode {
    let source: Arc<dyn ConfigSource> = Arc::new(EnvSource);
    let config = Config::from_source(source.as_ref());
    jira_admin_mcp::observability::init_tracing(&config.observability);

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve { health_addr: None });

    match run(command, config, source).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(kind = %e.kind(), error = %e, "fatal");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    config: Config,
    source: Arc<dyn ConfigSource>,
) -> jira_admin_mcp::Result<ExitCode> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone());

    match command {
        Command::Tools => {
            let catalog = ToolCatalog::standard();
            println!("{}", serde_json::to_string_pretty(catalog.definitions())?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let aggregator = HealthAggregator::standard(source, transport, &config.http);
            let report = aggregator.get_health().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::HealthServer { addr } => {
            let addr = resolve_addr(addr, &config)?;
            let aggregator = HealthAggregator::standard(source, transport, &config.http);
            health::http::serve(addr, aggregator, cancel).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { health_addr } => {
            let credentials = Arc::new(CredentialContext::from_source(source.as_ref())?);
            tracing::info!(credentials = ?credentials, "credentials_loaded");

            let client = JiraAdminClient::new(credentials, transport.clone())
                .with_timeout(config.http.request_timeout);
            let dispatcher = ToolDispatcher::new(client);

            let health_task = match health_addr {
                Some(addr) => {
                    let aggregator = HealthAggregator::standard(source, transport, &config.http);
                    let cancel = cancel.clone();
                    Some(tokio::spawn(async move {
                        if let Err(e) = health::http::serve(addr, aggregator, cancel).await {
                            tracing::warn!(error = %e, "health_endpoint_failed");
                        }
                    }))
                }
                None => None,
            };

            let server =
                McpServer::new(dispatcher, config.mcp.clone()).with_cancellation(cancel.clone());
            let result = server.serve_stdio().await;

            cancel.cancel();
            if let Some(task) = health_task {
                let _ = task.await;
            }
            result?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_addr(addr: Option<SocketAddr>, config: &Config) -> jira_admin_mcp::Result<SocketAddr> {
    match addr {
        Some(addr) => Ok(addr),
        None => config.server.health_addr.parse().map_err(|e| {
            jira_admin_mcp::Error::configuration(format!(
                "invalid health address '{}': {e}",
                config.server.health_addr
            ))
        }),
    }
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown_requested");
            cancel.cancel();
        }
    });
}
