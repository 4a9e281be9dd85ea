//! Contract Test: Timer & Idle Behavior
//!
//! This test verifies that work is driven only by the fixed-interval timer.
//!
//! Constraints verified:
//! - Nothing happens before the first full interval has elapsed
//! - Exactly one cycle runs per interval
//! - An unchanged IP produces no provider traffic between ticks

mod common;

use common::*;
use njddns_core::{DdnsEngine, EngineEvent, IpResolver};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn no_cycle_before_first_interval() {
    let primary = ScriptedIpSource::fixed("primary", "198.51.100.2");
    let primary_handle = ScriptedIpSource::sharing_with(&primary);
    let provider = MockDnsProvider::new().with_record("example.com", 7, "home", "198.51.100.1");

    let (mut engine, _event_rx) = DdnsEngine::new(
        IpResolver::pair(
            Box::new(primary),
            Box::new(ScriptedIpSource::fixed("secondary", "198.51.100.2")),
        ),
        Box::new(provider.clone()),
        minimal_config(&[("home", "example.com")]),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle =
        tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(primary_handle.call_count(), 0, "first tick is one interval after start");
    assert_eq!(provider.total_calls(), 0);

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn one_cycle_per_interval() {
    let primary = ScriptedIpSource::fixed("primary", "198.51.100.2");
    let primary_handle = ScriptedIpSource::sharing_with(&primary);
    let provider = MockDnsProvider::new().with_record("example.com", 7, "home", "198.51.100.1");

    let (mut engine, mut event_rx) = DdnsEngine::new(
        IpResolver::pair(
            Box::new(primary),
            Box::new(ScriptedIpSource::fixed("secondary", "198.51.100.2")),
        ),
        Box::new(provider.clone()),
        minimal_config(&[("home", "example.com")]),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle =
        tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    // Ticks at 60s, 120s and 180s.
    tokio::time::sleep(Duration::from_secs(181)).await;

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    assert_eq!(primary_handle.call_count(), 3);
    assert_eq!(provider.list_calls().len(), 1, "only the first tick saw a change");
    assert_eq!(provider.edit_calls().len(), 1);

    let mut unchanged = 0;
    while let Ok(event) = event_rx.try_recv() {
        if matches!(event, EngineEvent::IpUnchanged { .. }) {
            unchanged += 1;
        }
    }
    assert_eq!(unchanged, 2);
}

#[test]
fn oversized_interval_is_rejected_at_construction() {
    let mut config = minimal_config(&[("home", "example.com")]);
    config.engine.interval_secs = u64::MAX;

    let result = DdnsEngine::new(
        agreeing_resolver("198.51.100.2"),
        Box::new(MockDnsProvider::new()),
        config,
    );

    assert!(
        matches!(result, Err(njddns_core::Error::Config(_))),
        "an interval no timer can represent must be a config error"
    );
}
