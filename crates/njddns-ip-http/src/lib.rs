// # HTTP IP Source
//
// This crate provides HTTP-based IP sources for the Njalla DDNS updater.
//
// ## Architecture
//
// Each source asks one public "what is my IP" service that answers with a
// JSON object carrying an `ip` field, e.g.
//
// ```json
// {"ip": "203.0.113.5"}
// ```
//
// A source is only ever used through `njddns_core::IpResolver`, which asks
// at least two of them and refuses to proceed when they disagree.
//
// ## Defaults
//
// - `https://api.ipify.org?format=json`
// - `https://ipinfo.io` (JSON when asked with `Accept: application/json`)

use njddns_core::config::IpSourceConfig;
use njddns_core::traits::IpSource;
use njddns_core::{Error, IpResolver, Result};

use serde::Deserialize;
use std::time::Duration;

/// Default HTTP timeout for echo requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shape of the echo services' answer; other fields are ignored
#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: String,
}

/// HTTP-based IP source backed by one JSON echo service
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// Short name for logs and errors (the URL's host)
    name: String,

    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source with the default timeout
    ///
    /// # Parameters
    ///
    /// - `url`: URL of a service answering `{"ip": "..."}`
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: host_of(&url),
            url,
            client,
        })
    }

    /// The URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from the echo service
    async fn fetch_ip(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::network(format!("{}: request failed: {}", self.name, e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "{}: HTTP error: {}",
                self.name,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("{}: failed to read response: {}", self.name, e)))?;

        let echo: EchoResponse = serde_json::from_str(&body).map_err(|e| {
            Error::decode(format!("{}: unexpected response body: {}", self.name, e))
        })?;

        Ok(echo.ip)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("{} reported {}", self.name, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Build a cross-checking resolver from configuration
pub fn resolver_from_config(config: &IpSourceConfig) -> Result<IpResolver> {
    config.validate()?;

    let timeout = config.timeout();
    let sources = config
        .urls
        .iter()
        .map(|url| {
            HttpIpSource::with_timeout(url.as_str(), timeout)
                .map(|source| Box::new(source) as Box<dyn IpSource>)
        })
        .collect::<Result<Vec<_>>>()?;

    IpResolver::new(sources)
}

/// Host part of a URL, falling back to the whole string
fn host_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .split(['/', '?', ':'])
        .next()
        .filter(|host| !host.is_empty())
        .unwrap_or(url)
        .to_string()
}
