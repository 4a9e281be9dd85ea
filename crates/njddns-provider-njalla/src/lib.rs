// # Njalla DNS Provider
//
// This crate provides the Njalla DNS provider for the DDNS updater.
//
// ## Implementation
//
// - ✅ One JSON-RPC call per trait method (list-records, edit-record)
// - ✅ Full error propagation to the engine (the engine decides what to skip)
// - ✅ HTTP timeout configured (30 seconds by default)
// - ✅ Specific error handling for HTTP status codes (401/403, 429, 5xx)
// - ✅ Inspection of the envelope's `error` object
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (the next engine tick is the retry)
// - ❌ NO caching of record ids (re-listed every cycle)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Endpoint: `POST https://njal.la/api/1/`
// - Auth header: `Authorization: Njalla <token>`
// - `list-records {domain}` → `{"result": {"records": [...]}}`
// - `edit-record {domain, id, content}` → `{"result": {record}}`

pub mod rpc;

use async_trait::async_trait;
use njddns_core::config::ProviderConfig;
use njddns_core::traits::{DnsProvider, DnsRecord};
use njddns_core::{Error, Result};
use rpc::{
    EditRecordParams, ListRecordsParams, ListRecordsResult, METHOD_EDIT_RECORD,
    METHOD_LIST_RECORDS, RpcRequest, RpcResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Njalla JSON-RPC endpoint
pub const NJALLA_API_ENDPOINT: &str = njddns_core::config::DEFAULT_PROVIDER_ENDPOINT;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "njalla";

/// Njalla DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform `list-records` calls
/// - Log the intended `edit-record` payload
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct NjallaProvider {
    /// Njalla API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// JSON-RPC endpoint
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list records but skip edits
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for NjallaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NjallaProvider")
            .field("api_token", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl NjallaProvider {
    /// Create a new Njalla provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Njalla API token
    /// - `endpoint`: JSON-RPC endpoint URL
    /// - `timeout`: Per-request timeout
    /// - `dry_run`: If true, list records but skip edits
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the token is empty or the HTTP client
    /// cannot be built.
    pub fn new(
        api_token: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Njalla API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            endpoint: endpoint.into(),
            client,
            dry_run,
        })
    }

    /// Create a provider against the public endpoint (live mode)
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, NJALLA_API_ENDPOINT, DEFAULT_HTTP_TIMEOUT, false)
    }

    /// Create a provider against the public endpoint (dry-run mode)
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, NJALLA_API_ENDPOINT, DEFAULT_HTTP_TIMEOUT, true)
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        if config.dry_run {
            tracing::warn!("Njalla provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(
            config.api_token.clone(),
            config.endpoint.clone(),
            config.timeout(),
            config.dry_run,
        )
    }

    /// Whether edits are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send one JSON-RPC call and unwrap its `result`
    ///
    /// # HTTP
    ///
    /// ```http
    /// POST /api/1/
    /// Accept: application/json
    /// Content-Type: application/json
    /// Authorization: Njalla <token>
    ///
    /// {"jsonrpc": "2.0", "method": "...", "params": {...}, "id": "njddns"}
    /// ```
    async fn call<P, T>(&self, method: &str, params: P) -> Result<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let request = RpcRequest::new(method, params);

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Njalla {}", self.api_token),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::network(format!("{} request timed out", method))
                } else {
                    Error::network(format!("{} request failed: {}", method, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!(
                    "Invalid API token or insufficient permissions. Status: {}",
                    status
                ))),
                429 => Err(Error::rate_limited(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                ))),
                500..=599 => Err(Error::network(format!(
                    "Njalla server error (transient): {} - {}",
                    status, error_text
                ))),
                _ => Err(Error::network(format!(
                    "{} failed: {} - {}",
                    method, status, error_text
                ))),
            };
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read {} response: {}", method, e)))?;

        let envelope: RpcResponse<T> = serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Invalid {} response: {}", method, e)))?;

        if let Some(error) = envelope.error {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("{} failed: {} (code {})", method, error.message, error.code),
            ));
        }

        envelope
            .result
            .ok_or_else(|| Error::decode(format!("{} response has no result", method)))
    }
}

#[async_trait]
impl DnsProvider for NjallaProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing records of {}", domain);

        let result: ListRecordsResult = self
            .call(METHOD_LIST_RECORDS, ListRecordsParams { domain })
            .await?;

        tracing::debug!("{} has {} record(s)", domain, result.records.len());
        Ok(result.records)
    }

    async fn edit_record(&self, domain: &str, record_id: i64, content: &str) -> Result<DnsRecord> {
        let params = EditRecordParams {
            domain,
            id: record_id,
            content,
        };

        if self.dry_run {
            // Report the record as it would look after the edit.
            let mut record = self
                .list_records(domain)
                .await?
                .into_iter()
                .find(|r| r.id == record_id)
                .ok_or_else(|| {
                    Error::provider(
                        PROVIDER_NAME,
                        format!("record {} not found in {}", record_id, domain),
                    )
                })?;

            tracing::info!(
                "[DRY-RUN] Would send {} to {} with params: {}",
                METHOD_EDIT_RECORD,
                self.endpoint,
                serde_json::to_string(&params).unwrap_or_default()
            );
            record.content = content.to_string();
            return Ok(record);
        }

        let record: DnsRecord = self.call(METHOD_EDIT_RECORD, params).await?;

        if record.content != content {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!(
                    "edit of record {} in {} not applied: content is {:?}, expected {:?}",
                    record_id, domain, record.content, content
                ),
            ));
        }

        tracing::info!("DNS record updated: {} in {} -> {}", record_id, domain, content);
        Ok(record)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
