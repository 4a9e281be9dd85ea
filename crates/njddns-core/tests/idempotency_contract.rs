//! Contract Test: Change Detection & Idempotency
//!
//! This test verifies that the engine only touches the provider when the
//! resolved IP differs from the last one it acted on.
//!
//! Constraints verified:
//! - Same IP twice → provider is called only on the first cycle
//! - A new IP → records are re-listed and edited again
//! - Record ids are never cached between cycles
//! - A fresh engine (restart) always runs one update cycle

mod common;

use common::*;
use njddns_core::{CycleOutcome, DdnsEngine, IpResolver};

#[tokio::test]
async fn duplicate_ip_does_not_trigger_dns_update() {
    let provider = MockDnsProvider::new().with_record("example.com", 7, "home", "198.51.100.1");

    let (mut engine, _event_rx) = DdnsEngine::new(
        agreeing_resolver("198.51.100.2"),
        Box::new(provider.clone()),
        minimal_config(&[("home", "example.com")]),
    )
    .expect("engine construction succeeds");

    engine.run_cycle().await;
    let calls_after_first = provider.total_calls();

    let outcome = engine.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::Unchanged);
    assert_eq!(
        provider.total_calls(),
        calls_after_first,
        "an unchanged IP must not reach the provider"
    );
    assert_eq!(provider.edit_calls().len(), 1);
}

#[tokio::test]
async fn ip_change_relists_and_edits_again() {
    let primary = ScriptedIpSource::fixed("primary", "198.51.100.2");
    let secondary = ScriptedIpSource::fixed("secondary", "198.51.100.2");
    let primary_handle = ScriptedIpSource::sharing_with(&primary);
    let secondary_handle = ScriptedIpSource::sharing_with(&secondary);

    let provider = MockDnsProvider::new().with_record("example.com", 7, "home", "198.51.100.1");

    let (mut engine, _event_rx) = DdnsEngine::new(
        IpResolver::pair(Box::new(primary), Box::new(secondary)),
        Box::new(provider.clone()),
        minimal_config(&[("home", "example.com")]),
    )
    .expect("engine construction succeeds");

    engine.run_cycle().await;

    primary_handle.set_answer("198.51.100.3");
    secondary_handle.set_answer("198.51.100.3");
    let outcome = engine.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::Reconciled { updated: 1, failed: 0 });
    assert_eq!(
        provider.list_calls().len(),
        2,
        "record ids are re-resolved on every change"
    );
    assert_eq!(
        provider.edit_calls(),
        vec![
            EditCall::new("example.com", 7, "198.51.100.2"),
            EditCall::new("example.com", 7, "198.51.100.3"),
        ]
    );
    assert_eq!(engine.observed_ip(), Some("198.51.100.3"));
    assert_eq!(primary_handle.call_count(), 2);
}

#[tokio::test]
async fn restart_forgets_observed_ip() {
    // Records already hold the current IP; a restarted engine still updates once.
    let provider = MockDnsProvider::new().with_record("example.com", 7, "home", "198.51.100.2");

    for _ in 0..2 {
        let (mut engine, _event_rx) = DdnsEngine::new(
            agreeing_resolver("198.51.100.2"),
            Box::new(provider.clone()),
            minimal_config(&[("home", "example.com")]),
        )
        .expect("engine construction succeeds");

        assert_eq!(engine.observed_ip(), None);
        assert_eq!(
            engine.run_cycle().await,
            CycleOutcome::Reconciled { updated: 1, failed: 0 }
        );
    }

    assert_eq!(provider.edit_calls().len(), 2, "one update cycle per process start");
}
