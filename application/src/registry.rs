//! Agent fleet registry
//!
//! Owns the registered backends together with the per-agent health state
//! the rest of the application consults: a circuit breaker per agent and a
//! TTL cache of availability probes. Registration happens once at startup;
//! afterwards the registry is shared behind an `Arc` and all mutation goes
//! through interior mutability on the per-agent state.
//!
//! Breakers for different agents never share a lock, so one stuck agent
//! cannot serialize dispatches to the others.

use crate::config::DiscussionParams;
use crate::ports::agent_backend::AgentBackend;
use roundtable_domain::{AgentDescriptor, AgentId, CircuitBreaker, CircuitState};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

struct ProbeCache {
    available: bool,
    checked_at: Instant,
}

struct RegistryEntry {
    backend: Arc<dyn AgentBackend>,
    breaker: Mutex<CircuitBreaker>,
    availability: Mutex<Option<ProbeCache>>,
}

/// Registry of dispatchable agents, keyed by [`AgentId`].
///
/// Iteration order is registration order, which makes selection ties
/// deterministic.
pub struct AgentRegistry {
    entries: Vec<RegistryEntry>,
    availability_ttl: Duration,
    probe_timeout: Duration,
    breaker_threshold: u32,
    breaker_open_duration: Duration,
}

impl AgentRegistry {
    pub fn new(params: &DiscussionParams) -> Self {
        Self {
            entries: Vec::new(),
            availability_ttl: params.availability_ttl(),
            probe_timeout: params.probe_timeout(),
            breaker_threshold: params.circuit_failure_threshold,
            breaker_open_duration: params.circuit_open_duration(),
        }
    }

    /// Register a backend. A duplicate id is ignored with a warning so a
    /// misconfigured fleet degrades instead of failing startup.
    pub fn register(&mut self, backend: Arc<dyn AgentBackend>) {
        if self.entry(backend.id()).is_some() {
            warn!("Agent {} already registered, ignoring duplicate", backend.id());
            return;
        }
        debug!("Registered agent {}", backend.id());
        self.entries.push(RegistryEntry {
            breaker: Mutex::new(CircuitBreaker::new(
                self.breaker_threshold,
                self.breaker_open_duration,
            )),
            availability: Mutex::new(None),
            backend,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids in registration order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.entries.iter().map(|e| e.backend.id().clone()).collect()
    }

    /// Handle to a registered backend for dispatching.
    pub fn backend(&self, agent_id: &AgentId) -> Option<Arc<dyn AgentBackend>> {
        self.entry(agent_id).map(|e| Arc::clone(&e.backend))
    }

    /// Probe availability for every agent whose cached result is missing or
    /// older than the TTL. Probes run concurrently, each bounded by the
    /// probe timeout; a probe that times out counts as unavailable.
    pub async fn refresh_availability(&self) {
        let now = Instant::now();
        let stale: Vec<(usize, Arc<dyn AgentBackend>)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.is_stale(entry, now))
            .map(|(index, entry)| (index, Arc::clone(&entry.backend)))
            .collect();
        if stale.is_empty() {
            return;
        }
        debug!("Probing availability of {} agents", stale.len());

        let probe_timeout = self.probe_timeout;
        let probes = stale.into_iter().map(|(index, backend)| async move {
            let available = tokio::time::timeout(probe_timeout, backend.check_available())
                .await
                .unwrap_or(false);
            (index, available)
        });

        for (index, available) in futures::future::join_all(probes).await {
            let entry = &self.entries[index];
            if !available {
                debug!("Agent {} is unavailable", entry.backend.id());
            }
            if let Ok(mut cache) = entry.availability.lock() {
                *cache = Some(ProbeCache {
                    available,
                    checked_at: Instant::now(),
                });
            }
        }
    }

    /// Point-in-time descriptors for selection, in registration order.
    ///
    /// An agent that has never been probed reads as available; the first
    /// dispatch will sort out the truth.
    pub fn snapshot(&self) -> Vec<AgentDescriptor> {
        self.entries
            .iter()
            .map(|entry| {
                let available = entry
                    .availability
                    .lock()
                    .ok()
                    .and_then(|cache| cache.as_ref().map(|c| c.available))
                    .unwrap_or(true);
                let circuit = entry
                    .breaker
                    .lock()
                    .map(|mut b| b.state())
                    .unwrap_or(CircuitState::Open);
                AgentDescriptor::new(
                    entry.backend.id().clone(),
                    entry.backend.capability_tags().to_vec(),
                )
                .with_available(available)
                .with_circuit(circuit)
            })
            .collect()
    }

    /// Ask the agent's breaker for permission to start a logical dispatch.
    pub fn try_acquire(&self, agent_id: &AgentId) -> bool {
        match self.entry(agent_id) {
            Some(entry) => entry
                .breaker
                .lock()
                .map(|mut b| b.try_acquire())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Record the terminal outcome of a logical dispatch. Called exactly
    /// once per dispatch, after retries are exhausted or skipped.
    pub fn record_outcome(&self, agent_id: &AgentId, success: bool) {
        let Some(entry) = self.entry(agent_id) else {
            return;
        };
        let Ok(mut breaker) = entry.breaker.lock() else {
            return;
        };
        if success {
            breaker.record_success();
        } else {
            breaker.record_failure();
            if breaker.state() == CircuitState::Open {
                warn!(
                    "Circuit breaker opened for agent {} after {} consecutive failures",
                    agent_id,
                    breaker.consecutive_failures()
                );
            }
        }
    }

    /// Current breaker state for an agent, if registered.
    pub fn circuit_state(&self, agent_id: &AgentId) -> Option<CircuitState> {
        self.entry(agent_id)
            .and_then(|entry| entry.breaker.lock().ok().map(|mut b| b.state()))
    }

    /// Drop the cached availability for one agent so the next refresh
    /// probes it again.
    pub fn invalidate_availability(&self, agent_id: &AgentId) {
        if let Some(entry) = self.entry(agent_id)
            && let Ok(mut cache) = entry.availability.lock()
        {
            *cache = None;
        }
    }

    /// Drop all cached availability results.
    pub fn invalidate_all(&self) {
        for entry in &self.entries {
            if let Ok(mut cache) = entry.availability.lock() {
                *cache = None;
            }
        }
    }

    /// Force one agent's breaker back to closed. Returns false for an
    /// unknown agent.
    pub fn reset_breaker(&self, agent_id: &AgentId) -> bool {
        match self.entry(agent_id) {
            Some(entry) => {
                if let Ok(mut breaker) = entry.breaker.lock() {
                    breaker.reset();
                }
                true
            }
            None => false,
        }
    }

    /// Force every breaker back to closed.
    pub fn reset_breakers(&self) {
        for entry in &self.entries {
            if let Ok(mut breaker) = entry.breaker.lock() {
                breaker.reset();
            }
        }
    }

    fn entry(&self, agent_id: &AgentId) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.backend.id() == agent_id)
    }

    fn is_stale(&self, entry: &RegistryEntry, now: Instant) -> bool {
        match entry.availability.lock() {
            Ok(cache) => cache
                .as_ref()
                .is_none_or(|c| now.duration_since(c.checked_at) >= self.availability_ttl),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_backend::{BackendError, InvokeOptions};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StubBackend {
        id: AgentId,
        tags: Vec<String>,
        available: AtomicBool,
        probes: AtomicUsize,
        probe_delay: Option<Duration>,
    }

    impl StubBackend {
        fn new(id: &str, tags: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                id: AgentId::new(id),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                available: AtomicBool::new(true),
                probes: AtomicUsize::new(0),
                probe_delay: None,
            })
        }

        fn slow_probe(id: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                id: AgentId::new(id),
                tags: vec![],
                available: AtomicBool::new(true),
                probes: AtomicUsize::new(0),
                probe_delay: Some(delay),
            })
        }
    }

    #[async_trait]
    impl AgentBackend for StubBackend {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn capability_tags(&self) -> &[String] {
            &self.tags
        }

        async fn invoke(
            &self,
            _prompt: &str,
            _options: &InvokeOptions,
        ) -> Result<String, BackendError> {
            Ok("stub".to_string())
        }

        async fn check_available(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.probe_delay {
                tokio::time::sleep(delay).await;
            }
            self.available.load(Ordering::SeqCst)
        }
    }

    fn registry() -> AgentRegistry {
        AgentRegistry::new(&DiscussionParams::default())
    }

    #[test]
    fn test_register_and_snapshot_in_order() {
        let mut reg = registry();
        reg.register(StubBackend::new("claude", &["code", "reasoning"]));
        reg.register(StubBackend::new("gemini", &["research"]));

        let snapshot = reg.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id.as_str(), "claude");
        assert_eq!(snapshot[1].id.as_str(), "gemini");
        assert_eq!(snapshot[0].capability_tags, vec!["code", "reasoning"]);
        assert!(snapshot[0].available);
        assert_eq!(snapshot[0].circuit, CircuitState::Closed);
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut reg = registry();
        reg.register(StubBackend::new("claude", &["code"]));
        reg.register(StubBackend::new("claude", &["research"]));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.snapshot()[0].capability_tags, vec!["code"]);
    }

    #[tokio::test]
    async fn test_refresh_probes_once_within_ttl() {
        let mut reg = registry();
        let backend = StubBackend::new("claude", &[]);
        reg.register(Arc::clone(&backend) as Arc<dyn AgentBackend>);

        reg.refresh_availability().await;
        reg.refresh_availability().await;
        assert_eq!(backend.probes.load(Ordering::SeqCst), 1);

        reg.invalidate_availability(&AgentId::new("claude"));
        reg.refresh_availability().await;
        assert_eq!(backend.probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unavailable_backend_reflected_after_refresh() {
        let mut reg = registry();
        let backend = StubBackend::new("claude", &[]);
        backend.available.store(false, Ordering::SeqCst);
        reg.register(Arc::clone(&backend) as Arc<dyn AgentBackend>);

        reg.refresh_availability().await;
        assert!(!reg.snapshot()[0].available);

        backend.available.store(true, Ordering::SeqCst);
        reg.invalidate_all();
        reg.refresh_availability().await;
        assert!(reg.snapshot()[0].available);
    }

    #[tokio::test]
    async fn test_probe_timeout_counts_as_unavailable() {
        let params = DiscussionParams::default().with_probe_timeout(Duration::from_millis(5));
        let mut reg = AgentRegistry::new(&params);
        reg.register(StubBackend::slow_probe("sloth", Duration::from_millis(100)));

        reg.refresh_availability().await;
        assert!(!reg.snapshot()[0].available);
    }

    #[test]
    fn test_breaker_opens_and_resets() {
        let params = DiscussionParams::default().with_circuit_failure_threshold(1);
        let mut reg = AgentRegistry::new(&params);
        reg.register(StubBackend::new("claude", &[]));
        let id = AgentId::new("claude");

        assert!(reg.try_acquire(&id));
        reg.record_outcome(&id, false);
        assert_eq!(reg.circuit_state(&id), Some(CircuitState::Open));
        assert!(!reg.try_acquire(&id));

        assert!(reg.reset_breaker(&id));
        assert_eq!(reg.circuit_state(&id), Some(CircuitState::Closed));
        assert!(reg.try_acquire(&id));
    }

    #[test]
    fn test_breakers_are_independent() {
        let params = DiscussionParams::default().with_circuit_failure_threshold(1);
        let mut reg = AgentRegistry::new(&params);
        reg.register(StubBackend::new("claude", &[]));
        reg.register(StubBackend::new("gemini", &[]));

        reg.record_outcome(&AgentId::new("claude"), false);
        assert_eq!(
            reg.circuit_state(&AgentId::new("claude")),
            Some(CircuitState::Open)
        );
        assert_eq!(
            reg.circuit_state(&AgentId::new("gemini")),
            Some(CircuitState::Closed)
        );
    }

    #[test]
    fn test_unknown_agent() {
        let reg = registry();
        let id = AgentId::new("ghost");
        assert!(!reg.try_acquire(&id));
        assert!(reg.backend(&id).is_none());
        assert!(reg.circuit_state(&id).is_none());
        assert!(!reg.reset_breaker(&id));
    }
}
