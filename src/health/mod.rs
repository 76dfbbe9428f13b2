//! Connectivity health aggregation.
//!
//! A fixed set of probes runs concurrently on every request, each bounded by
//! its own timeout. Probe failures never propagate: they become unhealthy
//! results. The overall status is healthy only when every probe is.

pub mod http;
pub mod probes;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendFailure, HttpTransport, JiraAdminClient};
use crate::types::{ConfigSource, CredentialContext, ErrorKind, HttpConfig};

pub use probes::{EnvironmentProbe, OrgAdminProbe, RestApiProbe};

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == HealthStatus::Healthy
    }
}

/// Outcome of one probe run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthProbeResult {
    pub name: String,
    pub status: HealthStatus,
    pub detail: String,
    pub evidence: BTreeMap<String, Value>,
}

impl HealthProbeResult {
    pub fn healthy(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            detail: detail.into(),
            evidence: BTreeMap::new(),
        }
    }

    pub fn unhealthy(name: &str, detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            ..Self::healthy(name, detail)
        }
    }

    /// Unhealthy result carrying the failure kind and status as evidence.
    pub fn from_failure(name: &str, failure: &BackendFailure) -> Self {
        let mut result = Self::unhealthy(name, failure.message.clone())
            .with_evidence("kind", json!(failure.kind));
        if let Some(status) = failure.http_status {
            result = result.with_evidence("http_status", json!(status));
        }
        result
    }

    pub fn with_evidence(mut self, key: &str, value: Value) -> Self {
        self.evidence.insert(key.to_string(), value);
        self
    }
}

/// Counts by probe status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub healthy: usize,
    pub unhealthy: usize,
}

/// Composite health, a pure function of its probe results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub probes: Vec<HealthProbeResult>,
    pub summary: HealthSummary,
    pub generated_at: DateTime<Utc>,
    pub version: &'static str,
}

impl HealthReport {
    pub fn from_probes(probes: Vec<HealthProbeResult>) -> Self {
        let healthy = probes.iter().filter(|p| p.status.is_healthy()).count();
        let summary = HealthSummary {
            healthy,
            unhealthy: probes.len() - healthy,
        };
        let overall_status = if summary.unhealthy == 0 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self {
            overall_status,
            probes,
            summary,
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status.is_healthy()
    }

    /// 200 when healthy, 503 otherwise.
    pub fn http_status_code(&self) -> u16 {
        if self.is_healthy() {
            200
        } else {
            503
        }
    }

    pub fn probe(&self, name: &str) -> Option<&HealthProbeResult> {
        self.probes.iter().find(|p| p.name == name)
    }
}

// =============================================================================
// Probes
// =============================================================================

/// One independent connectivity check.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the check. Failures are reported in the result, never returned.
    async fn check(&self) -> HealthProbeResult;
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Upper bound on each probe.
    pub probe_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&HttpConfig> for HealthConfig {
    fn from(http: &HttpConfig) -> Self {
        Self {
            probe_timeout: http.probe_timeout,
        }
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Runs the environment, REST API and Org Admin API probes.
#[derive(Clone)]
pub struct HealthAggregator {
    environment: Arc<dyn HealthProbe>,
    rest_api: Arc<dyn HealthProbe>,
    org_admin_api: Arc<dyn HealthProbe>,
    config: HealthConfig,
}

impl fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthAggregator")
            .field(
                "probes",
                &[
                    self.environment.name(),
                    self.rest_api.name(),
                    self.org_admin_api.name(),
                ],
            )
            .field("config", &self.config)
            .finish()
    }
}

impl HealthAggregator {
    pub fn new(
        environment: Arc<dyn HealthProbe>,
        rest_api: Arc<dyn HealthProbe>,
        org_admin_api: Arc<dyn HealthProbe>,
        config: HealthConfig,
    ) -> Self {
        Self {
            environment,
            rest_api,
            org_admin_api,
            config,
        }
    }

    /// Standard probe set over a configuration source and transport.
    ///
    /// When REST credentials cannot be built, both API probes report the
    /// configuration error instead of contacting anything.
    pub fn standard(
        source: Arc<dyn ConfigSource>,
        transport: Arc<dyn HttpTransport>,
        http: &HttpConfig,
    ) -> Self {
        let (rest_api, org_admin_api) = match CredentialContext::from_source(source.as_ref()) {
            Ok(credentials) => {
                let client = JiraAdminClient::new(Arc::new(credentials), transport)
                    .with_timeout(http.request_timeout);
                (
                    RestApiProbe::new(client.clone()),
                    OrgAdminProbe::new(client),
                )
            }
            Err(e) => {
                let failure = BackendFailure::from(e);
                (
                    RestApiProbe::unavailable(failure.clone()),
                    OrgAdminProbe::unavailable(failure),
                )
            }
        };

        Self::new(
            Arc::new(EnvironmentProbe::new(source)),
            Arc::new(rest_api),
            Arc::new(org_admin_api),
            HealthConfig::from(http),
        )
    }

    /// Run all probes concurrently and compose the report.
    pub async fn get_health(&self) -> HealthReport {
        let timeout = self.config.probe_timeout;
        let (environment, rest_api, org_admin_api) = tokio::join!(
            run_probe(self.environment.as_ref(), timeout),
            run_probe(self.rest_api.as_ref(), timeout),
            run_probe(self.org_admin_api.as_ref(), timeout),
        );

        let report = HealthReport::from_probes(vec![environment, rest_api, org_admin_api]);
        tracing::info!(
            overall_status = ?report.overall_status,
            healthy = report.summary.healthy,
            unhealthy = report.summary.unhealthy,
            "health_report_generated"
        );
        report
    }
}

async fn run_probe(probe: &dyn HealthProbe, timeout: Duration) -> HealthProbeResult {
    match tokio::time::timeout(timeout, probe.check()).await {
        Ok(result) => {
            if !result.status.is_healthy() {
                tracing::warn!(probe = probe.name(), detail = %result.detail, "probe_unhealthy");
            }
            result
        }
        Err(_) => {
            tracing::warn!(probe = probe.name(), ?timeout, "probe_timed_out");
            HealthProbeResult::unhealthy(
                probe.name(),
                format!("probe timed out after {timeout:?}"),
            )
            .with_evidence("kind", json!(ErrorKind::Transport))
            .with_evidence("timeout_ms", json!(timeout.as_millis() as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe {
        name: &'static str,
        status: HealthStatus,
    }

    #[async_trait]
    impl HealthProbe for FixedProbe {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn check(&self) -> HealthProbeResult {
            match self.status {
                HealthStatus::Healthy => HealthProbeResult::healthy(self.name, "ok"),
                HealthStatus::Unhealthy => HealthProbeResult::unhealthy(self.name, "down"),
            }
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl HealthProbe for HangingProbe {
        fn name(&self) -> &'static str {
            "rest_api"
        }

        async fn check(&self) -> HealthProbeResult {
            std::future::pending().await
        }
    }

    fn fixed(name: &'static str, status: HealthStatus) -> Arc<dyn HealthProbe> {
        Arc::new(FixedProbe { name, status })
    }

    #[test]
    fn test_report_is_and_of_probes() {
        let all_ok = HealthReport::from_probes(vec![
            HealthProbeResult::healthy("a", ""),
            HealthProbeResult::healthy("b", ""),
        ]);
        assert!(all_ok.is_healthy());
        assert_eq!(all_ok.http_status_code(), 200);

        let one_down = HealthReport::from_probes(vec![
            HealthProbeResult::healthy("a", ""),
            HealthProbeResult::unhealthy("b", "x"),
        ]);
        assert!(!one_down.is_healthy());
        assert_eq!(one_down.http_status_code(), 503);
        assert_eq!(one_down.summary, HealthSummary { healthy: 1, unhealthy: 1 });
    }

    #[tokio::test]
    async fn test_any_unhealthy_probe_fails_overall() {
        for bad in ["environment", "rest_api", "org_admin_api"] {
            let status = |name| {
                if name == bad {
                    HealthStatus::Unhealthy
                } else {
                    HealthStatus::Healthy
                }
            };
            let aggregator = HealthAggregator::new(
                fixed("environment", status("environment")),
                fixed("rest_api", status("rest_api")),
                fixed("org_admin_api", status("org_admin_api")),
                HealthConfig::default(),
            );
            let report = aggregator.get_health().await;
            assert_eq!(report.overall_status, HealthStatus::Unhealthy, "{bad}");
            assert_eq!(report.probes.len(), 3);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_probe_times_out() {
        let aggregator = HealthAggregator::new(
            fixed("environment", HealthStatus::Healthy),
            Arc::new(HangingProbe),
            fixed("org_admin_api", HealthStatus::Healthy),
            HealthConfig {
                probe_timeout: Duration::from_secs(2),
            },
        );

        let started = tokio::time::Instant::now();
        let report = aggregator.get_health().await;
        assert!(started.elapsed() <= Duration::from_secs(2));

        let names: Vec<&str> = report.probes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["environment", "rest_api", "org_admin_api"]);
        let rest = report.probe("rest_api").unwrap();
        assert_eq!(rest.status, HealthStatus::Unhealthy);
        assert_eq!(rest.evidence["kind"], "TransportError");
        assert!(report.probe("environment").unwrap().status.is_healthy());
        assert!(report.probe("org_admin_api").unwrap().status.is_healthy());
    }

    #[test]
    fn test_report_serialization() {
        let report = HealthReport::from_probes(vec![HealthProbeResult::healthy("environment", "ok")
            .with_evidence("missing", json!([]))]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["overall_status"], "healthy");
        assert_eq!(value["probes"][0]["evidence"]["missing"], json!([]));
        assert!(value["generated_at"].is_string());
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }
}
