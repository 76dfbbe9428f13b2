//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jira_admin_mcp::backend::{
    HttpRequest, HttpResponse, HttpTransport, JiraAdminClient, TransportError,
};
use jira_admin_mcp::tools::ToolDispatcher;
use jira_admin_mcp::CredentialContext;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const REST_BASE: &str = "https://acme.atlassian.net";

/// Canned-response transport that counts and records every request.
#[derive(Debug, Default)]
pub struct StubTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
    /// `(method, path)` -> response; consulted before `fallback`.
    routes: HashMap<(String, String), HttpResponse>,
    fallback: Option<HttpResponse>,
    hang_paths: Vec<String>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `status` and `body`.
    pub fn always(status: u16, body: &str) -> Self {
        Self {
            fallback: Some(HttpResponse::new(status, body)),
            ..Self::default()
        }
    }

    pub fn route(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method.to_string(), path.to_string()),
            HttpResponse::new(status, body),
        );
        self
    }

    /// Requests to `path` never resolve.
    pub fn hang_on(mut self, path: &str) -> Self {
        self.hang_paths.push(path.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let path = request.url.path().to_string();
        if self.hang_paths.contains(&path) {
            std::future::pending::<()>().await;
        }

        let key = (request.method.as_str().to_string(), path);
        if let Some(response) = self.routes.get(&key) {
            return Ok(response.clone());
        }
        self.fallback
            .clone()
            .ok_or_else(|| TransportError::Connection(format!("no route for {} {}", key.0, key.1)))
    }
}

pub fn credentials() -> CredentialContext {
    CredentialContext::new(REST_BASE, "admin@acme.com", "api-token")
        .unwrap()
        .with_org("org-1", "admin-key")
}

pub fn client(transport: Arc<StubTransport>) -> JiraAdminClient {
    JiraAdminClient::new(Arc::new(credentials()), transport)
}

pub fn dispatcher(transport: Arc<StubTransport>) -> ToolDispatcher {
    ToolDispatcher::new(client(transport))
}

/// Environment map with every key set.
pub fn full_env(rest_base: &str, org_base: &str) -> HashMap<String, String> {
    [
        ("JIRA_URL", rest_base),
        ("JIRA_USERNAME", "admin@acme.com"),
        ("JIRA_API_TOKEN", "api-token"),
        ("ORG_ID", "org-1"),
        ("ADMIN_API_KEY", "admin-key"),
        ("ORG_ADMIN_URL", org_base),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
