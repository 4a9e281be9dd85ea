//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that record how the engine
//! drives its collaborators without doing any real I/O.

#![allow(dead_code)]

use njddns_core::config::{DdnsConfig, EngineConfig, UpdateTarget};
use njddns_core::error::{Error, Result};
use njddns_core::resolver::IpResolver;
use njddns_core::traits::{DnsProvider, DnsRecord, IpSource};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that replays scripted answers
///
/// Answers are consumed in order; the last one repeats forever.
pub struct ScriptedIpSource {
    name: &'static str,
    answers: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    last: Arc<Mutex<std::result::Result<String, String>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    /// A source that always reports `ip`
    pub fn fixed(name: &'static str, ip: &str) -> Self {
        Self::scripted(name, vec![Ok(ip.to_string())])
    }

    /// A source that always fails with a network error
    pub fn failing(name: &'static str, msg: &str) -> Self {
        Self::scripted(name, vec![Err(msg.to_string())])
    }

    /// A source replaying `answers`
    pub fn scripted(name: &'static str, answers: Vec<std::result::Result<String, String>>) -> Self {
        let mut answers: VecDeque<_> = answers.into();
        let last = answers
            .pop_back()
            .expect("scripted source needs at least one answer");
        Self {
            name,
            answers: Arc::new(Mutex::new(answers)),
            last: Arc::new(Mutex::new(last)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a handle that shares script and counters with `other`
    pub fn sharing_with(other: &Self) -> Self {
        Self {
            name: other.name,
            answers: Arc::clone(&other.answers),
            last: Arc::clone(&other.last),
            call_count: Arc::clone(&other.call_count),
        }
    }

    /// Change the answer repeated once the script is exhausted
    pub fn set_answer(&self, ip: &str) {
        self.answers.lock().unwrap().clear();
        *self.last.lock().unwrap() = Ok(ip.to_string());
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.lock().unwrap().clone());
        answer.map_err(Error::network)
    }

    fn source_name(&self) -> &str {
        self.name
    }
}

/// Resolver over two sources that always agree on `ip`
pub fn agreeing_resolver(ip: &str) -> IpResolver {
    IpResolver::pair(
        Box::new(ScriptedIpSource::fixed("primary", ip)),
        Box::new(ScriptedIpSource::fixed("secondary", ip)),
    )
}

/// A recorded `edit_record` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCall {
    pub domain: String,
    pub record_id: i64,
    pub content: String,
}

impl EditCall {
    pub fn new(domain: &str, record_id: i64, content: &str) -> Self {
        Self {
            domain: domain.to_string(),
            record_id,
            content: content.to_string(),
        }
    }
}

#[derive(Default)]
struct ProviderState {
    zones: HashMap<String, Vec<DnsRecord>>,
    failing_domains: HashSet<String>,
    failing_records: HashSet<i64>,
    list_calls: Vec<String>,
    edit_calls: Vec<EditCall>,
}

/// A mock DnsProvider backed by in-memory zones that records every call
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to a domain
    pub fn with_record(self, domain: &str, id: i64, name: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .zones
            .entry(domain.to_string())
            .or_default()
            .push(record(id, name, content));
        self
    }

    /// Make `list_records` fail for a domain
    pub fn failing_list(self, domain: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_domains
            .insert(domain.to_string());
        self
    }

    /// Make `edit_record` fail for a record id
    pub fn failing_edit(self, record_id: i64) -> Self {
        self.state.lock().unwrap().failing_records.insert(record_id);
        self
    }

    /// Domains passed to `list_records`, in call order
    pub fn list_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().list_calls.clone()
    }

    /// Calls to `edit_record`, in call order
    pub fn edit_calls(&self) -> Vec<EditCall> {
        self.state.lock().unwrap().edit_calls.clone()
    }

    /// Current content of a record
    pub fn content_of(&self, domain: &str, record_id: i64) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .zones
            .get(domain)?
            .iter()
            .find(|r| r.id == record_id)
            .map(|r| r.content.clone())
    }

    /// Total provider calls of either kind
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.list_calls.len() + state.edit_calls.len()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls.push(domain.to_string());

        if state.failing_domains.contains(domain) {
            return Err(Error::network(format!("connection reset listing {}", domain)));
        }
        Ok(state.zones.get(domain).cloned().unwrap_or_default())
    }

    async fn edit_record(&self, domain: &str, record_id: i64, content: &str) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        state.edit_calls.push(EditCall::new(domain, record_id, content));

        if state.failing_records.contains(&record_id) {
            return Err(Error::provider("mock", format!("record {} is locked", record_id)));
        }

        let record = state
            .zones
            .get_mut(domain)
            .and_then(|records| records.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| Error::provider("mock", format!("no record {}", record_id)))?;
        record.content = content.to_string();
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an A record
pub fn record(id: i64, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id,
        name: name.to_string(),
        record_type: "A".to_string(),
        content: content.to_string(),
        ttl: 10800,
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(targets: &[(&str, &str)]) -> DdnsConfig {
    DdnsConfig {
        targets: targets
            .iter()
            .map(|(sub, domain)| UpdateTarget::new(*sub, *domain))
            .collect(),
        engine: EngineConfig {
            interval_secs: 60,
            event_channel_capacity: 100,
        },
    }
}
