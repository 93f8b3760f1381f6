use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{core::Collector, Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};
use tracing::error;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayMetricsSnapshot {
    pub prompts_dispatched: u64,
    pub dispatch_failures: u64,
    pub replies_collected: u64,
    pub replies_missing: u64,
    pub cache_hits: u64,
}

static PROMPTS_DISPATCHED: AtomicU64 = AtomicU64::new(0);
static DISPATCH_FAILURES: AtomicU64 = AtomicU64::new(0);
static REPLIES_COLLECTED: AtomicU64 = AtomicU64::new(0);
static REPLIES_MISSING: AtomicU64 = AtomicU64::new(0);
static CACHE_HITS: AtomicU64 = AtomicU64::new(0);

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

lazy_static! {
    static ref PROMPTS_DISPATCHED_TOTAL: IntCounter = IntCounter::new(
        "chatrelay_prompts_dispatched_total",
        "Prompts submitted with a confirmed thread link",
    )
    .unwrap();
    static ref DISPATCH_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "chatrelay_dispatch_failures_total",
        "Prompts whose submission raised an error",
    )
    .unwrap();
    static ref REPLIES_COLLECTED_TOTAL: IntCounter = IntCounter::new(
        "chatrelay_replies_collected_total",
        "Replies extracted after the completion affordance appeared",
    )
    .unwrap();
    static ref REPLIES_MISSING_TOTAL: IntCounter = IntCounter::new(
        "chatrelay_replies_missing_total",
        "Visited links that produced no reply",
    )
    .unwrap();
    static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "chatrelay_cache_hits_total",
            "Operations served from the fingerprint cache"
        ),
        &["op"]
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register chatrelay metric");
        }
    }
}

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        let registry = global_registry();
        register(registry, PROMPTS_DISPATCHED_TOTAL.clone());
        register(registry, DISPATCH_FAILURES_TOTAL.clone());
        register(registry, REPLIES_COLLECTED_TOTAL.clone());
        register(registry, REPLIES_MISSING_TOTAL.clone());
        register(registry, CACHE_HITS_TOTAL.clone());
    });
}

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn record_dispatched() {
    PROMPTS_DISPATCHED.fetch_add(1, Ordering::Relaxed);
    PROMPTS_DISPATCHED_TOTAL.inc();
}

pub fn record_dispatch_failure() {
    DISPATCH_FAILURES.fetch_add(1, Ordering::Relaxed);
    DISPATCH_FAILURES_TOTAL.inc();
}

pub fn record_reply_collected() {
    REPLIES_COLLECTED.fetch_add(1, Ordering::Relaxed);
    REPLIES_COLLECTED_TOTAL.inc();
}

pub fn record_reply_missing() {
    REPLIES_MISSING.fetch_add(1, Ordering::Relaxed);
    REPLIES_MISSING_TOTAL.inc();
}

pub fn record_cache_hit(op: &str) {
    CACHE_HITS.fetch_add(1, Ordering::Relaxed);
    CACHE_HITS_TOTAL.with_label_values(&[op]).inc();
}

pub fn snapshot() -> RelayMetricsSnapshot {
    RelayMetricsSnapshot {
        prompts_dispatched: PROMPTS_DISPATCHED.load(Ordering::Relaxed),
        dispatch_failures: DISPATCH_FAILURES.load(Ordering::Relaxed),
        replies_collected: REPLIES_COLLECTED.load(Ordering::Relaxed),
        replies_missing: REPLIES_MISSING.load(Ordering::Relaxed),
        cache_hits: CACHE_HITS.load(Ordering::Relaxed),
    }
}

/// Prometheus text exposition of every registered chatrelay metric.
pub fn render() -> String {
    register_metrics();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&global_registry().gather(), &mut buffer) {
        error!(?err, "failed to encode prometheus metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_feed_snapshot_and_exposition() {
        let before = snapshot();
        record_dispatched();
        record_cache_hit("dispatch.submit");
        let after = snapshot();

        assert!(after.prompts_dispatched > before.prompts_dispatched);
        assert!(after.cache_hits > before.cache_hits);

        let text = render();
        assert!(text.contains("chatrelay_prompts_dispatched_total"));
        assert!(text.contains("op=\"dispatch.submit\""));
    }
}
