//! Configuration types for the DDNS updater
//!
//! This module defines the configuration structures consumed by the engine
//! and the provider/IP-source crates. Loading them from the environment is
//! the daemon's job.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Njalla JSON-RPC endpoint
pub const DEFAULT_PROVIDER_ENDPOINT: &str = "https://njal.la/api/1/";

/// Default IP echo services, each answering with `{"ip": "..."}`
pub const DEFAULT_IP_SOURCE_URLS: &[&str] = &["https://api.ipify.org?format=json", "https://ipinfo.io"];

/// Longest accepted update interval (one year)
pub const MAX_INTERVAL_SECS: u64 = 31_536_000;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Records to keep in sync
    pub targets: Vec<UpdateTarget>,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration for the given targets with default engine settings
    pub fn new(targets: Vec<UpdateTarget>) -> Self {
        Self {
            targets,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.targets.is_empty() {
            return Err(crate::Error::config("No update targets configured"));
        }

        for target in &self.targets {
            target.validate()?;
        }

        self.engine.validate()
    }
}

/// A (subdomain, domain) pair whose records follow the host's public IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTarget {
    /// Record name inside the domain (e.g. "home"); matched exactly
    #[serde(rename = "sub")]
    pub subdomain: String,

    /// Domain managed at the provider (e.g. "example.com")
    pub domain: String,
}

impl UpdateTarget {
    /// Create a new update target
    pub fn new(subdomain: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            domain: domain.into(),
        }
    }

    /// Validate the target
    ///
    /// An empty subdomain is allowed: it matches the zone apex record, whose
    /// name is empty at the provider.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "Update target '{}' has an empty domain",
                self.subdomain
            )));
        }
        Ok(())
    }

    /// Fully qualified name, for logging
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }
}

impl std::fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqdn())
    }
}

/// The update list document: `{"update": [{"sub": "...", "domain": "..."}]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateList {
    /// Ordered targets
    pub update: Vec<UpdateTarget>,
}

impl UpdateList {
    /// Decode the update list from its JSON form
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("Malformed update list: {}", e)))
    }

    /// Consume the list, yielding the targets in order
    pub fn into_targets(self) -> Vec<UpdateTarget> {
        self.update
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between reconciliation ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Update interval must be > 0 seconds"));
        }
        if self.interval_secs > MAX_INTERVAL_SECS {
            return Err(crate::Error::config(format!(
                "Update interval must be at most {} seconds (one year). Got: {}",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// The tick period
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_event_channel_capacity() -> usize {
    1000
}

/// Njalla provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Opaque API token, sent as `Authorization: Njalla <token>`
    pub api_token: String,

    /// JSON-RPC endpoint
    #[serde(default = "default_provider_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,

    /// List records but only log the edits that would be sent
    #[serde(default)]
    pub dry_run: bool,
}

impl ProviderConfig {
    /// Create a live-mode configuration for the default endpoint
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            endpoint: default_provider_endpoint(),
            timeout_secs: default_http_timeout_secs(),
            dry_run: false,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("Njalla API token cannot be empty"));
        }
        validate_http_url("Provider endpoint", &self.endpoint)?;
        validate_timeout(self.timeout_secs)
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// The token never appears in debug output.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn default_provider_endpoint() -> String {
    DEFAULT_PROVIDER_ENDPOINT.to_string()
}

/// IP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// Echo service URLs; every one must report the same address
    #[serde(default = "default_ip_source_urls")]
    pub urls: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.urls.len() < 2 {
            return Err(crate::Error::config(format!(
                "At least two IP sources are required for cross-checking, got {}",
                self.urls.len()
            )));
        }
        for url in &self.urls {
            validate_http_url("IP source URL", url)?;
        }
        validate_timeout(self.timeout_secs)
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            urls: default_ip_source_urls(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_ip_source_urls() -> Vec<String> {
    DEFAULT_IP_SOURCE_URLS.iter().map(|u| u.to_string()).collect()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn validate_timeout(timeout_secs: u64) -> Result<(), crate::Error> {
    if !(1..=300).contains(&timeout_secs) {
        return Err(crate::Error::config(format!(
            "HTTP timeout must be between 1 and 300 seconds. Got: {}",
            timeout_secs
        )));
    }
    Ok(())
}
