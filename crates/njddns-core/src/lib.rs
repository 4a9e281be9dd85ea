// # njddns-core
//
// Core library for the Njalla dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for asking one service for the public IP
// - **IpResolver**: Cross-checks several IpSources before trusting an address
// - **DnsProvider**: Trait for listing and editing DNS records via a provider API
// - **DdnsEngine**: Timer-driven loop that reconciles records on IP change
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Distrust single answers**: An IP is used only when every source agrees
// 3. **No hidden state**: The observed IP lives in the engine, in memory only
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Best effort**: One failing target never blocks the others

pub mod traits;
pub mod engine;
pub mod resolver;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, IpSource};
pub use engine::{CycleOutcome, DdnsEngine, EngineEvent};
pub use resolver::IpResolver;
pub use config::{DdnsConfig, EngineConfig, IpSourceConfig, ProviderConfig, UpdateList, UpdateTarget};
pub use error::{Error, Result};
