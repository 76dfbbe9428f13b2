//! Backend endpoints and credentials.
//!
//! Two independent credential sets: a Basic pair for the REST API and a bearer
//! token for the organization admin API. REST values are required at
//! construction; organization values are only checked when an
//! organization-scoped operation runs, so tools can be listed with partial
//! credentials.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Url;
use std::fmt;

use super::config::{
    ConfigSource, ADMIN_API_KEY, JIRA_API_TOKEN, JIRA_URL, JIRA_USERNAME, ORG_ADMIN_URL, ORG_ID,
};
use super::errors::{Error, Result};

/// Default Org Admin API base.
pub const DEFAULT_ORG_ADMIN_URL: &str = "https://api.atlassian.com";

/// Immutable credential context, built once at startup.
#[derive(Clone)]
pub struct CredentialContext {
    rest_base_url: Url,
    rest_username: String,
    rest_token: String,
    org_admin_base_url: Url,
    org_id: Option<String>,
    org_bearer_token: Option<String>,
}

/// Organization scope resolved for one call.
#[derive(Clone, Copy)]
pub struct OrgScope<'a> {
    pub base_url: &'a Url,
    pub org_id: &'a str,
    pub bearer_token: &'a str,
}

impl fmt::Debug for OrgScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgScope")
            .field("base_url", &self.base_url.as_str())
            .field("org_id", &self.org_id)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

impl CredentialContext {
    /// Build from explicit values.
    pub fn new(
        rest_base_url: &str,
        rest_username: impl Into<String>,
        rest_token: impl Into<String>,
    ) -> Result<Self> {
        let rest_username = rest_username.into().trim().to_string();
        let rest_token = rest_token.into().trim().to_string();
        if rest_username.is_empty() {
            return Err(Error::configuration(format!("{JIRA_USERNAME} is required")));
        }
        if rest_token.is_empty() {
            return Err(Error::configuration(format!("{JIRA_API_TOKEN} is required")));
        }

        Ok(Self {
            rest_base_url: parse_base_url(JIRA_URL, rest_base_url)?,
            rest_username,
            rest_token,
            org_admin_base_url: parse_base_url(ORG_ADMIN_URL, DEFAULT_ORG_ADMIN_URL)?,
            org_id: None,
            org_bearer_token: None,
        })
    }

    /// Attach organization credentials. Blank values are treated as absent.
    pub fn with_org(mut self, org_id: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        self.org_id = non_blank(org_id.into());
        self.org_bearer_token = non_blank(bearer_token.into());
        self
    }

    /// Override the Org Admin API base URL.
    pub fn with_org_admin_base_url(mut self, url: &str) -> Result<Self> {
        self.org_admin_base_url = parse_base_url(ORG_ADMIN_URL, url)?;
        Ok(self)
    }

    /// Build from a configuration source.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let require = |key: &str| {
            source
                .get(key)
                .ok_or_else(|| Error::configuration(format!("{key} is required")))
        };

        let mut ctx = Self::new(
            &require(JIRA_URL)?,
            require(JIRA_USERNAME)?,
            require(JIRA_API_TOKEN)?,
        )?;
        ctx.org_id = source.get(ORG_ID);
        ctx.org_bearer_token = source.get(ADMIN_API_KEY);
        if let Some(url) = source.get(ORG_ADMIN_URL) {
            ctx = ctx.with_org_admin_base_url(&url)?;
        }
        Ok(ctx)
    }

    pub fn rest_base_url(&self) -> &Url {
        &self.rest_base_url
    }

    pub fn rest_username(&self) -> &str {
        &self.rest_username
    }

    pub fn org_admin_base_url(&self) -> &Url {
        &self.org_admin_base_url
    }

    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    /// `Authorization` header value for the REST API.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.rest_username, self.rest_token);
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// Organization scope, or a configuration error naming what is missing.
    pub fn org_scope(&self) -> Result<OrgScope<'_>> {
        match (self.org_id.as_deref(), self.org_bearer_token.as_deref()) {
            (Some(org_id), Some(bearer_token)) => Ok(OrgScope {
                base_url: &self.org_admin_base_url,
                org_id,
                bearer_token,
            }),
            (None, None) => Err(Error::configuration(format!(
                "{ORG_ID} and {ADMIN_API_KEY} are required for organization operations"
            ))),
            (None, _) => Err(Error::configuration(format!(
                "{ORG_ID} is required for organization operations"
            ))),
            (_, None) => Err(Error::configuration(format!(
                "{ADMIN_API_KEY} is required for organization operations"
            ))),
        }
    }
}

impl OrgScope<'_> {
    /// `Authorization` header value for the admin API.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("rest_base_url", &self.rest_base_url.as_str())
            .field("rest_username", &self.rest_username)
            .field("rest_token", &"<redacted>")
            .field("org_admin_base_url", &self.org_admin_base_url.as_str())
            .field("org_id", &self.org_id)
            .field(
                "org_bearer_token",
                &self.org_bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_base_url(key: &str, raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::configuration(format!("{key} is required")));
    }
    let url = Url::parse(raw)
        .map_err(|e| Error::configuration(format!("{key} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::configuration(format!(
            "{key} must be an absolute http(s) URL, got '{raw}'"
        )));
    }
    Ok(url)
}
