// # DNS Provider Trait
//
// Defines the interface for reading and editing DNS records via a
// provider API.
//
// ## Implementations
//
// - Njalla JSON-RPC: `njddns-provider-njalla` crate
//
// ## Usage
//
// ```rust,ignore
// use njddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     for record in provider.list_records("example.com").await? {
//         if record.name == "home" {
//             provider.edit_record("example.com", record.id, "198.51.100.2").await?;
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A DNS record as the provider reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record id
    pub id: i64,
    /// Record name relative to the domain ("" for the apex)
    pub name: String,
    /// Record type ("A", "AAAA", "MX", ...)
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Record value
    pub content: String,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: i64,
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// Providers are isolated, stateless, and single-shot.
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoint only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure (the engine decides what happens next)
///
/// ## Forbidden Capabilities
/// - ❌ Cache record ids between calls (ids are re-listed every cycle)
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide whether an update is needed (owned by `DdnsEngine`)
/// - ❌ Spawn tasks or threads
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record of a domain
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: The provider's record list, verbatim
    /// - `Err(Error)`: Transport, decode, or provider failure
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Overwrite the content of one record
    ///
    /// # Parameters
    ///
    /// - `domain`: The domain owning the record
    /// - `record_id`: Id from a `list_records` call in the same cycle
    /// - `content`: New record value
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The provider's view of the record after the edit
    /// - `Err(Error)`: Transport, decode, or provider failure
    async fn edit_record(
        &self,
        domain: &str,
        record_id: i64,
        content: &str,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
