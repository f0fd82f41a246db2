//! Naming pipeline counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, shared behind an `Arc`
#[derive(Debug, Default)]
pub struct Metrics {
    decisions: AtomicU64,
    ai_named: AtomicU64,
    ai_disabled: AtomicU64,
    ai_timeouts: AtomicU64,
    ai_errors: AtomicU64,
    batches_started: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision(&self) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "decisions", "Metric incremented");
    }

    pub fn ai_named(&self) {
        self.ai_named.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "ai_named", "Metric incremented");
    }

    pub fn ai_disabled(&self) {
        self.ai_disabled.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "ai_disabled", "Metric incremented");
    }

    pub fn ai_timeout(&self) {
        self.ai_timeouts.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "ai_timeouts", "Metric incremented");
    }

    pub fn ai_error(&self) {
        self.ai_errors.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "ai_errors", "Metric incremented");
    }

    pub fn batch_started(&self) {
        self.batches_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "batches_started", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            decisions: self.decisions.load(Ordering::Relaxed),
            ai_named: self.ai_named.load(Ordering::Relaxed),
            ai_disabled: self.ai_disabled.load(Ordering::Relaxed),
            ai_timeouts: self.ai_timeouts.load(Ordering::Relaxed),
            ai_errors: self.ai_errors.load(Ordering::Relaxed),
            batches_started: self.batches_started.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub decisions: u64,
    pub ai_named: u64,
    pub ai_disabled: u64,
    pub ai_timeouts: u64,
    pub ai_errors: u64,
    pub batches_started: u64,
}
