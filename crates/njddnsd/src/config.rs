//! Daemon configuration
//!
//! Everything comes from environment variables plus one secret file holding
//! the Njalla API token. Loading goes through a lookup function so the
//! parsing rules can be tested without touching the process environment.

use anyhow::{Context, Result};
use njddns_core::config::{
    DEFAULT_IP_SOURCE_URLS, DEFAULT_PROVIDER_ENDPOINT, DdnsConfig, EngineConfig, IpSourceConfig,
    MAX_INTERVAL_SECS, ProviderConfig, UpdateList, UpdateTarget,
};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Default location of the secret file (Vault agent injector layout)
pub const DEFAULT_TOKEN_FILE: &str = "/vault/secrets/api.txt";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration
pub struct Config {
    pub token_file: PathBuf,
    pub api_token: String,
    pub interval_secs: u64,
    pub targets: Vec<UpdateTarget>,
    pub log_level: String,
    pub mode: String,
    pub http_timeout_secs: u64,
    pub provider_endpoint: String,
    pub ip_source_urls: Vec<String>,
}

// The token never appears in debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token_file", &self.token_file)
            .field("api_token", &"<REDACTED>")
            .field("interval_secs", &self.interval_secs)
            .field("targets", &self.targets)
            .field("log_level", &self.log_level)
            .field("mode", &self.mode)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("provider_endpoint", &self.provider_endpoint)
            .field("ip_source_urls", &self.ip_source_urls)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, reading the secret file it names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token_file = PathBuf::from(
            lookup("DDNS_TOKEN_FILE").unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string()),
        );
        let api_token = read_token_file(&token_file)?;

        let interval_secs = match lookup("njalla_update_interval") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!(
                    "njalla_update_interval must be a whole number of seconds. Got: '{}'",
                    raw
                )
            })?,
            None => anyhow::bail!(
                "njalla_update_interval is required. \
                Set it via: export njalla_update_interval=300"
            ),
        };

        let targets = match lookup("njalla_update") {
            Some(raw) => UpdateList::from_json(&raw)?.into_targets(),
            None => anyhow::bail!(
                "njalla_update is required. \
                Set it via: export njalla_update='{{\"update\":[{{\"sub\":\"home\",\"domain\":\"example.com\"}}]}}'"
            ),
        };

        let http_timeout_secs = match lookup("DDNS_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("DDNS_HTTP_TIMEOUT_SECS must be a whole number. Got: '{}'", raw)
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let ip_source_urls = match lookup("DDNS_IP_SOURCE_URLS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_IP_SOURCE_URLS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            token_file,
            api_token,
            interval_secs,
            targets,
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            mode: lookup("DDNS_MODE").unwrap_or_else(|| "live".to_string()),
            http_timeout_secs,
            provider_endpoint: lookup("DDNS_PROVIDER_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PROVIDER_ENDPOINT.to_string()),
            ip_source_urls,
        })
    }

    /// Validate the configuration
    ///
    /// Checks the values that parsing alone cannot: ranges, enumerations,
    /// domain name syntax, and the component configs built from them.
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            anyhow::bail!("njalla_update_interval must be greater than 0 seconds");
        }

        if self.interval_secs > MAX_INTERVAL_SECS {
            anyhow::bail!(
                "njalla_update_interval must be at most {} seconds (one year). Got: {}",
                MAX_INTERVAL_SECS,
                self.interval_secs
            );
        }

        if self.targets.is_empty() {
            anyhow::bail!(
                "njalla_update must contain at least one entry in its \"update\" list"
            );
        }

        for target in &self.targets {
            validate_domain_name(&target.domain)
                .with_context(|| format!("Invalid domain in update target {}", target))?;
        }

        match self.mode.as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        self.log_level()?;

        self.ddns_config().validate()?;
        self.provider_config().validate()?;
        self.ip_source_config().validate()?;

        Ok(())
    }

    /// Tracing level named by `DDNS_LOG_LEVEL`
    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == "dry-run"
    }

    /// Engine configuration
    pub fn ddns_config(&self) -> DdnsConfig {
        DdnsConfig {
            targets: self.targets.clone(),
            engine: EngineConfig {
                interval_secs: self.interval_secs,
                ..EngineConfig::default()
            },
        }
    }

    /// Njalla provider configuration
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_token: self.api_token.clone(),
            endpoint: self.provider_endpoint.clone(),
            timeout_secs: self.http_timeout_secs,
            dry_run: self.is_dry_run(),
        }
    }

    /// Echo service configuration
    pub fn ip_source_config(&self) -> IpSourceConfig {
        IpSourceConfig {
            urls: self.ip_source_urls.clone(),
            timeout_secs: self.http_timeout_secs,
        }
    }
}

/// Read the API token, stripping one trailing line ending
pub fn read_token_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read API token from {}", path.display()))?;

    let token = match content.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => content.as_str(),
    };

    if token.is_empty() {
        anyhow::bail!(
            "API token file {} is empty. \
            Write your Njalla API token into it",
            path.display()
        );
    }

    Ok(token.to_string())
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks; catches typos, not every invalid name.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}
