// # IP Source Trait
//
// Defines the interface for asking one external service for the host's
// public address.
//
// ## Implementations
//
// - HTTP JSON echo services: `njddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use njddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ip = source.current().await?;
//     println!("{} says {}", source.source_name(), ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// A source answers with the address exactly as the service reported it.
/// No parsing or canonicalisation happens here; the engine compares
/// addresses as strings.
///
/// # Trust Level: Semi-Trusted
///
/// A single source is never trusted on its own. The [`IpResolver`] asks
/// several sources and only accepts an address they all agree on.
///
/// ## Allowed Capabilities
/// - ✅ Perform one HTTP request per `current()` call
/// - ✅ Parse the service's response
///
/// ## Forbidden Capabilities
/// - ❌ Cache answers between calls (a stale answer hides an IP change)
/// - ❌ Retry or back off (the next engine tick is the retry)
/// - ❌ Spawn tasks
///
/// [`IpResolver`]: crate::resolver::IpResolver
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Ask the service for the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The address, verbatim
    /// - `Err(Error::Network)`: The request failed or returned a non-2xx status
    /// - `Err(Error::Decode)`: The body had no usable `ip` field
    async fn current(&self) -> Result<String, crate::Error>;

    /// Short name of the service (for logging and error messages)
    fn source_name(&self) -> &str;
}
