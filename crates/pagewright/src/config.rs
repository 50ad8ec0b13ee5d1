//! Test-suite settings: where the application under test lives and how long
//! to wait for it.

use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PAGEWRIGHT_";

/// Settings shared by every page object of a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL scheme of the application under test
    pub scheme: String,
    /// Domain below which every tenant lives (`{tenant}.{base_domain}`)
    pub base_domain: String,
    /// Port of the application under test
    pub port: u16,
    /// Tenant (subdomain) used by page objects
    pub tenant: String,
    /// Timeout applied when a wait does not specify one
    pub default_timeout_ms: u64,
    /// Interval between two evaluations of a wait condition
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            base_domain: "dev.fider.io".to_string(),
            port: 3000,
            tenant: "login".to_string(),
            default_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Create default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> PagewrightResult<Self> {
        let settings: Self = serde_yaml_ng::from_str(yaml)?;
        settings.validate()
    }

    /// Load settings from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PagewrightResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by `PAGEWRIGHT_*` environment variables
    pub fn from_env() -> PagewrightResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `PAGEWRIGHT_*` environment variables on top of these settings
    pub fn with_env_overrides(self) -> PagewrightResult<Self> {
        self.with_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from an arbitrary lookup (keys without prefix)
    pub fn with_overrides<F>(mut self, lookup: F) -> PagewrightResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(scheme) = lookup("SCHEME") {
            self.scheme = scheme;
        }
        if let Some(domain) = lookup("BASE_DOMAIN") {
            self.base_domain = domain;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_number("PORT", &port)?;
        }
        if let Some(tenant) = lookup("TENANT") {
            self.tenant = tenant;
        }
        if let Some(timeout) = lookup("TIMEOUT_MS") {
            self.default_timeout_ms = parse_number("TIMEOUT_MS", &timeout)?;
        }
        if let Some(interval) = lookup("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_number("POLL_INTERVAL_MS", &interval)?;
        }
        self.validate()
    }

    fn validate(self) -> PagewrightResult<Self> {
        if self.scheme.is_empty() || self.base_domain.is_empty() || self.tenant.is_empty() {
            return Err(PagewrightError::Config {
                message: "scheme, base_domain and tenant must not be empty".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(PagewrightError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(self)
    }

    /// Set the tenant
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    /// Set the base domain
    #[must_use]
    pub fn with_base_domain(mut self, domain: impl Into<String>) -> Self {
        self.base_domain = domain.into();
        self
    }

    /// Set the scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the default wait timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Host of a tenant: `{tenant}.{base_domain}`
    #[must_use]
    pub fn tenant_host(&self, tenant: &str) -> String {
        format!("{tenant}.{}", self.base_domain)
    }

    /// Origin of the configured tenant: `scheme://{tenant}.{base_domain}:{port}`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.scheme,
            self.tenant_host(&self.tenant),
            self.port
        )
    }

    /// Default timeout as Duration
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Wait options derived from these settings
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.default_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> PagewrightResult<T> {
    value.trim().parse().map_err(|_| PagewrightError::Config {
        message: format!("{ENV_PREFIX}{key} is not a valid number: {value:?}"),
    })
}
