//! The standard probes: environment completeness and reachability of both APIs.

use async_trait::async_trait;
use serde_json::json;
use std::fmt;
use std::sync::Arc;

use super::{HealthProbe, HealthProbeResult};
use crate::backend::{BackendFailure, BackendOutcome, JiraAdminClient};
use crate::types::{ConfigSource, REQUIRED_KEYS};

// =============================================================================
// Environment
// =============================================================================

/// Checks that every required key is present and non-empty.
/// Reads the source on every run.
#[derive(Clone)]
pub struct EnvironmentProbe {
    source: Arc<dyn ConfigSource>,
}

impl EnvironmentProbe {
    pub const NAME: &'static str = "environment";

    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self { source }
    }
}

impl fmt::Debug for EnvironmentProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentProbe").finish_non_exhaustive()
    }
}

#[async_trait]
impl HealthProbe for EnvironmentProbe {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn check(&self) -> HealthProbeResult {
        let (configured, missing): (Vec<&str>, Vec<&str>) = REQUIRED_KEYS
            .iter()
            .copied()
            .partition(|key| self.source.get(key).is_some());

        let result = if missing.is_empty() {
            HealthProbeResult::healthy(Self::NAME, "all required configuration present")
        } else {
            HealthProbeResult::unhealthy(
                Self::NAME,
                format!("missing required configuration: {}", missing.join(", ")),
            )
        };
        result
            .with_evidence("configured", json!(configured))
            .with_evidence("missing", json!(missing))
    }
}

// =============================================================================
// REST API
// =============================================================================

/// "Who am I" against the REST API with Basic auth.
#[derive(Debug, Clone)]
pub struct RestApiProbe {
    client: Result<JiraAdminClient, BackendFailure>,
}

impl RestApiProbe {
    pub const NAME: &'static str = "rest_api";

    pub fn new(client: JiraAdminClient) -> Self {
        Self { client: Ok(client) }
    }

    /// Probe that always reports `failure` (e.g. credentials could not be built).
    pub fn unavailable(failure: BackendFailure) -> Self {
        Self {
            client: Err(failure),
        }
    }
}

#[async_trait]
impl HealthProbe for RestApiProbe {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn check(&self) -> HealthProbeResult {
        let client = match &self.client {
            Ok(client) => client,
            Err(failure) => return HealthProbeResult::from_failure(Self::NAME, failure),
        };

        match client.get_myself().await {
            BackendOutcome::Success(user) => {
                let mut result = HealthProbeResult::healthy(Self::NAME, "REST API reachable")
                    .with_evidence("account_id", json!(user.account_id));
                if let Some(name) = user.display_name {
                    result = result.with_evidence("display_name", json!(name));
                }
                result
            }
            BackendOutcome::Failure(failure) => HealthProbeResult::from_failure(Self::NAME, &failure),
        }
    }
}

// =============================================================================
// Org Admin API
// =============================================================================

/// Organization lookup against the Org Admin API with the bearer token.
#[derive(Debug, Clone)]
pub struct OrgAdminProbe {
    client: Result<JiraAdminClient, BackendFailure>,
}

impl OrgAdminProbe {
    pub const NAME: &'static str = "org_admin_api";

    pub fn new(client: JiraAdminClient) -> Self {
        Self { client: Ok(client) }
    }

    pub fn unavailable(failure: BackendFailure) -> Self {
        Self {
            client: Err(failure),
        }
    }
}

#[async_trait]
impl HealthProbe for OrgAdminProbe {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn check(&self) -> HealthProbeResult {
        let client = match &self.client {
            Ok(client) => client,
            Err(failure) => return HealthProbeResult::from_failure(Self::NAME, failure),
        };

        match client.get_organization().await {
            BackendOutcome::Success(org) => {
                let mut result = HealthProbeResult::healthy(Self::NAME, "Org Admin API reachable")
                    .with_evidence("org_id", json!(org.id));
                if let Some(name) = org.name {
                    result = result.with_evidence("name", json!(name));
                }
                result
            }
            BackendOutcome::Failure(failure) => HealthProbeResult::from_failure(Self::NAME, &failure),
        }
    }
}
