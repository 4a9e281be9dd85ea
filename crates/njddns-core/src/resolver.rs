//! Cross-validating public IP resolver
//!
//! The resolver asks every configured [`IpSource`] in turn and only trusts
//! an address when all of them report exactly the same string. A single
//! disagreement fails the whole resolution; it is never settled by picking
//! one of the answers.

use crate::error::{Error, Result};
use crate::traits::IpSource;
use tracing::debug;

/// Resolves the host's public address from several independent sources
pub struct IpResolver {
    sources: Vec<Box<dyn IpSource>>,
}

impl IpResolver {
    /// Create a resolver over the given sources
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when fewer than two sources are supplied,
    /// since there is nothing to cross-check against.
    pub fn new(sources: Vec<Box<dyn IpSource>>) -> Result<Self> {
        if sources.len() < 2 {
            return Err(Error::config(format!(
                "IP resolver needs at least two sources, got {}",
                sources.len()
            )));
        }
        Ok(Self { sources })
    }

    /// Create a resolver over a primary and a secondary source
    pub fn pair(primary: Box<dyn IpSource>, secondary: Box<dyn IpSource>) -> Self {
        Self {
            sources: vec![primary, secondary],
        }
    }

    /// Number of sources consulted per resolution
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Resolve the public address
    ///
    /// Sources are queried sequentially; the first failure aborts the
    /// resolution.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The address every source agreed on, verbatim
    /// - `Err(Error::InconsistentSources)`: Two sources disagreed
    /// - `Err(Error)`: A source failed (network or decode)
    pub async fn resolve_own_ip(&self) -> Result<String> {
        let mut agreed: Option<(&str, String)> = None;

        for source in &self.sources {
            let ip = source.current().await?;
            debug!("{} reported {}", source.source_name(), ip);

            if let Some((first_source, first_ip)) = &agreed {
                if *first_ip != ip {
                    return Err(Error::inconsistent_sources(
                        *first_source,
                        first_ip.as_str(),
                        source.source_name(),
                        ip,
                    ));
                }
            } else {
                agreed = Some((source.source_name(), ip));
            }
        }

        agreed
            .map(|(_, ip)| ip)
            .ok_or_else(|| Error::config("IP resolver has no sources"))
    }
}
