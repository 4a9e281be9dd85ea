//! Core DDNS engine
//!
//! The DdnsEngine is the reconciliation loop. It is responsible for:
//! - Resolving the public IP on a fixed timer via [`IpResolver`]
//! - Comparing it with the last address it acted on
//! - Re-listing and editing matching records via [`DnsProvider`] on change
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  interval   │─── tick ───┐
//! └─────────────┘            │
//!                            ▼
//!                   ┌──────────────┐        ┌─────────────┐
//!                   │  DdnsEngine  │◀──ip───│ IpResolver  │
//!                   └──────────────┘        └─────────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!      ┌──────────────┐           ┌─────────────┐
//!      │ DnsProvider  │           │   Events    │
//!      │ (list, edit) │           │  (notify)   │
//!      └──────────────┘           └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Resolve the public IP; on failure log and wait for the next tick
//! 2. If it equals the observed IP, do nothing
//! 3. Otherwise, for every target: list the domain's records and edit each
//!    record whose name equals the target's subdomain
//! 4. Store the new IP as observed, whatever the individual results were

use crate::config::{DdnsConfig, UpdateTarget};
use crate::error::{Error, Result};
use crate::resolver::IpResolver;
use crate::traits::DnsProvider;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        targets_count: usize,
        interval_secs: u64,
    },

    /// The public IP could not be resolved; the cycle was abandoned
    ResolveFailed {
        error: String,
    },

    /// The resolved IP equals the observed IP
    IpUnchanged {
        ip: String,
    },

    /// The resolved IP differs from the observed IP
    IpChangeDetected {
        previous_ip: Option<String>,
        new_ip: String,
    },

    /// A record was edited
    RecordUpdated {
        target: String,
        record_id: i64,
        content: String,
    },

    /// The domain has no record named like the target's subdomain
    NoMatchingRecord {
        target: String,
    },

    /// Listing or editing failed for a target
    TargetFailed {
        target: String,
        record_id: Option<i64>,
        error: String,
    },

    /// A reconciliation cycle finished
    CycleCompleted {
        ip: String,
        updated: usize,
        failed: usize,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// What a single reconciliation cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Resolution failed; no provider calls were made
    ResolveFailed,
    /// The IP had not changed; no provider calls were made
    Unchanged,
    /// The IP changed and every target was attempted
    Reconciled {
        /// Records edited successfully
        updated: usize,
        /// List or edit calls that failed
        failed: usize,
    },
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Engine runs until a shutdown signal is received
///
/// ## Threading
///
/// The engine runs on a single task. The observed IP is a plain field
/// mutated through `&mut self`, so it needs no locking. Ticks are delayed,
/// not overlapped, when a cycle outlasts the interval.
pub struct DdnsEngine {
    /// Cross-validating IP resolver
    resolver: IpResolver,

    /// DNS provider for listing and editing records
    provider: Box<dyn DnsProvider>,

    /// Records to keep in sync, in configuration order
    targets: Vec<UpdateTarget>,

    /// Time between ticks
    interval: Duration,

    /// Last IP acted upon; `None` until the first successful cycle
    observed_ip: Option<String>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        resolver: IpResolver,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            resolver,
            provider,
            targets: config.targets,
            interval: config.engine.interval(),
            observed_ip: None,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The last IP the engine acted upon
    pub fn observed_ip(&self) -> Option<&str> {
        self.observed_ip.as_deref()
    }

    /// The configured targets
    pub fn targets(&self) -> &[UpdateTarget] {
        &self.targets
    }

    /// Run the engine until Ctrl-C
    pub async fn run(&mut self) -> Result<()> {
        self.run_with_shutdown(None).await
    }

    /// Run the engine until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// With `None`, the engine waits for Ctrl-C instead. Shutdown is only
    /// observed between cycles; a cycle in progress runs to completion.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            targets_count: self.targets.len(),
            interval_secs: self.interval.as_secs(),
        });
        info!(
            "Reconciling {} target(s) every {}s via {}",
            self.targets.len(),
            self.interval.as_secs(),
            self.provider.provider_name()
        );

        // First tick one full interval after start.
        let first_tick = Instant::now().checked_add(self.interval).ok_or_else(|| {
            Error::config(format!(
                "Update interval of {}s is too large",
                self.interval.as_secs()
            ))
        })?;
        let mut interval = tokio::time::interval_at(first_tick, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                Some(_) = ticks.next() => {
                    self.run_cycle().await;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        info!("Engine stopped");
        Ok(())
    }

    /// Run one reconciliation cycle
    ///
    /// Never fails: every error is logged, reported as an event, and
    /// reflected in the returned outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let new_ip = match self.resolver.resolve_own_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                if e.is_transient() {
                    warn!("Failed to resolve public IP, retrying next tick: {}", e);
                } else {
                    error!("Failed to resolve public IP: {}", e);
                }
                self.emit_event(EngineEvent::ResolveFailed {
                    error: e.to_string(),
                });
                return CycleOutcome::ResolveFailed;
            }
        };

        if self.observed_ip.as_deref() == Some(new_ip.as_str()) {
            debug!("Public IP unchanged ({}), nothing to do", new_ip);
            self.emit_event(EngineEvent::IpUnchanged { ip: new_ip });
            return CycleOutcome::Unchanged;
        }

        info!(
            "Public IP changed: {} -> {}",
            self.observed_ip.as_deref().unwrap_or("<unset>"),
            new_ip
        );
        self.emit_event(EngineEvent::IpChangeDetected {
            previous_ip: self.observed_ip.clone(),
            new_ip: new_ip.clone(),
        });

        let mut updated = 0;
        let mut failed = 0;
        for target in &self.targets {
            let (ok, err) = self.reconcile_target(target, &new_ip).await;
            updated += ok;
            failed += err;
        }

        // Stored even after partial failure: failed targets wait for the next change.
        self.observed_ip = Some(new_ip.clone());

        if failed > 0 {
            warn!(
                "Cycle for {} finished with {} update(s) and {} failure(s)",
                new_ip, updated, failed
            );
        } else {
            info!("Cycle for {} finished with {} update(s)", new_ip, updated);
        }
        self.emit_event(EngineEvent::CycleCompleted {
            ip: new_ip,
            updated,
            failed,
        });

        CycleOutcome::Reconciled { updated, failed }
    }

    /// List the target's domain and edit every record named like its subdomain
    ///
    /// Returns (records updated, calls failed).
    async fn reconcile_target(&self, target: &UpdateTarget, new_ip: &str) -> (usize, usize) {
        let records = match self.provider.list_records(&target.domain).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to list records for {}: {}", target.domain, e);
                self.emit_event(EngineEvent::TargetFailed {
                    target: target.fqdn(),
                    record_id: None,
                    error: e.to_string(),
                });
                return (0, 1);
            }
        };

        let mut updated = 0;
        let mut failed = 0;
        for record in records.iter().filter(|r| r.name == target.subdomain) {
            info!(
                "Updating {} record {} of {}: {} -> {}",
                record.record_type,
                record.id,
                target,
                record.content,
                new_ip
            );

            match self.provider.edit_record(&target.domain, record.id, new_ip).await {
                Ok(edited) => {
                    debug!("Provider confirmed {} = {}", target, edited.content);
                    self.emit_event(EngineEvent::RecordUpdated {
                        target: target.fqdn(),
                        record_id: record.id,
                        content: edited.content,
                    });
                    updated += 1;
                }
                Err(e) => {
                    error!("Failed to update record {} of {}: {}", record.id, target, e);
                    self.emit_event(EngineEvent::TargetFailed {
                        target: target.fqdn(),
                        record_id: Some(record.id),
                        error: e.to_string(),
                    });
                    failed += 1;
                }
            }
        }

        if updated == 0 && failed == 0 {
            warn!(
                "No record named '{}' in {} ({} record(s) listed)",
                target.subdomain,
                target.domain,
                records.len()
            );
            self.emit_event(EngineEvent::NoMatchingRecord {
                target: target.fqdn(),
            });
        }

        (updated, failed)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening; events are optional.
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
