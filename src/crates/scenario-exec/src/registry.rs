//! The active-execution map (spec §4.2 "Concurrency model"): one entry per
//! live execution, each carrying its own subscriber set behind a per-entry
//! lock so writes never leak across executions. A `DashMap` of
//! per-execution subscriber registries, rather than a single global
//! broadcast channel, since subscribers must see only their own
//! `executionId`'s events in order.

use crate::events::{send_silently, ExecutionEvent, Subscriber};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type SubscriberId = u64;

struct Entry {
    scenario_id: String,
    started_at: DateTime<Utc>,
    subscribers: Mutex<Vec<(SubscriberId, Subscriber)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionStatus {
    pub active: bool,
    pub scenario_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct ExecutionRegistry {
    executions: DashMap<String, Arc<Entry>>,
    next_subscriber_id: AtomicU64,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        ExecutionRegistry { executions: DashMap::new(), next_subscriber_id: AtomicU64::new(1) }
    }

    /// Registers a new execution and, if `initial_subscriber` is given,
    /// attaches it before anything can be broadcast (spec §4.2 step 6).
    pub fn register(
        &self,
        execution_id: &str,
        scenario_id: &str,
        initial_subscriber: Option<Subscriber>,
    ) {
        let subscribers = match initial_subscriber {
            Some(sub) => vec![(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed), sub)],
            None => Vec::new(),
        };
        self.executions.insert(
            execution_id.to_string(),
            Arc::new(Entry {
                scenario_id: scenario_id.to_string(),
                started_at: Utc::now(),
                subscribers: Mutex::new(subscribers),
            }),
        );
    }

    /// Attaches `subscriber` to a live execution. Returns `None` if no such
    /// execution is active (spec §4.2: "Subscribe ... false if no such live
    /// execution"). An `Option<SubscriberId>` carries that boolean plus the
    /// handle the caller needs for `unsubscribe`.
    pub fn subscribe(&self, execution_id: &str, subscriber: Subscriber) -> Option<SubscriberId> {
        let entry = self.executions.get(execution_id)?;
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        entry.subscribers.lock().push((id, subscriber));
        Some(id)
    }

    pub fn unsubscribe(&self, execution_id: &str, subscriber_id: SubscriberId) {
        if let Some(entry) = self.executions.get(execution_id) {
            entry.subscribers.lock().retain(|(id, _)| *id != subscriber_id);
        }
    }

    pub fn broadcast(&self, execution_id: &str, event: ExecutionEvent) {
        if let Some(entry) = self.executions.get(execution_id) {
            for (_, subscriber) in entry.subscribers.lock().iter() {
                send_silently(subscriber, event.clone());
            }
        }
    }

    pub fn status(&self, execution_id: &str) -> ExecutionStatus {
        match self.executions.get(execution_id) {
            Some(entry) => ExecutionStatus {
                active: true,
                scenario_id: Some(entry.scenario_id.clone()),
                started_at: Some(entry.started_at),
            },
            None => ExecutionStatus { active: false, scenario_id: None, started_at: None },
        }
    }

    pub fn remove(&self, execution_id: &str) {
        self.executions.remove(execution_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_to_unknown_execution_returns_none() {
        let registry = ExecutionRegistry::new();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        assert!(registry.subscribe("exec-missing", tx).is_none());
    }

    #[test]
    fn status_reflects_registration_and_removal() {
        let registry = ExecutionRegistry::new();
        registry.register("exec-1", "scn-1", None);
        assert!(registry.status("exec-1").active);
        registry.remove("exec-1");
        assert!(!registry.status("exec-1").active);
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribed_but_not_unsubscribed() {
        let registry = ExecutionRegistry::new();
        registry.register("exec-1", "scn-1", None);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let id = registry.subscribe("exec-1", tx).unwrap();
        registry.broadcast(
            "exec-1",
            ExecutionEvent::Started {
                execution_id: "exec-1".into(),
                scenario_id: "scn-1".into(),
                total_steps: 1,
            },
        );
        assert!(rx.recv().await.is_some());

        registry.unsubscribe("exec-1", id);
        registry.broadcast(
            "exec-1",
            ExecutionEvent::Completed {
                execution_id: "exec-1".into(),
                result: sample_result(),
            },
        );
        assert!(rx.try_recv().is_err());
    }

    fn sample_result() -> flow_core::ScenarioExecutionResult {
        flow_core::ScenarioExecutionResult {
            status: flow_core::RunStatus::Passed,
            total_steps: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            duration_ms: 0,
            step_results: vec![],
            api_calls: vec![],
            environment: None,
            executed_at: Utc::now(),
        }
    }
}
