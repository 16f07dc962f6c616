//! Tests for exported metrics.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use tokio_util::sync::CancellationToken;

use switchyard::cache::{CacheConfig, CacheKey, ResponseCache};
use switchyard::limiter::{RateLimitConfig, RateLimiter};
use switchyard::providers::{Provider, ProviderRegistry};
use switchyard::telemetry;
use switchyard::types::{Completion, ProviderId, Request, Response, Usage};
use switchyard::{Gateway, GatewayError, Result};

// ============================================================================
// Mock providers
// ============================================================================

struct MockProvider;

#[async_trait]
impl Provider for MockProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    async fn call(&self, _request: &Request) -> Result<Completion> {
        Ok(Completion::new("ok").with_usage(Usage {
            prompt_tokens: 3,
            completion_tokens: 4,
            total_tokens: 7,
        }))
    }
}

struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    async fn call(&self, _request: &Request) -> Result<Completion> {
        Err(GatewayError::ProviderFailure("boom".to_string()))
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for `name` carrying `label = value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn response(text: &str) -> Response {
    Response {
        provider: ProviderId::OpenAI,
        model: "gpt-4".to_string(),
        response: text.to_string(),
        tokens_used: 1,
        response_time_ms: 1.0,
        cached: false,
    }
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` keeps the sync `with_local_recorder` closure on the
/// current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn successful_dispatch_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let mut registry = ProviderRegistry::new();
                registry.register(Arc::new(MockProvider));
                registry.dispatch(&Request::new("openai", "gpt-4", "hi")).await
            })
        })
    });
    assert_eq!(result.unwrap().tokens_used, 7);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "ok"),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::TOKENS_TOTAL), 7);
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn failed_dispatch_records_error_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let mut registry = ProviderRegistry::new();
                registry.register(Arc::new(FailingProvider));
                registry.dispatch(&Request::new("google", "gemini", "hi")).await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "error"),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::TOKENS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn unsupported_provider_records_nothing() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let _result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let registry = ProviderRegistry::new();
                registry.dispatch(&Request::new("openai", "gpt-4", "hi")).await
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn gateway_records_cache_lookups() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let gateway = Gateway::builder()
                    .provider(Arc::new(MockProvider))
                    .build()
                    .unwrap();
                let cancel = CancellationToken::new();
                for _ in 0..3 {
                    gateway
                        .handle("c", Request::new("openai", "gpt-4", "hi"), &cancel)
                        .await
                        .unwrap();
                }
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_HITS_TOTAL, "provider", "openai"),
        2
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_MISSES_TOTAL, "provider", "openai"),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 1);
}

#[test]
fn eviction_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let cache = ResponseCache::new(&CacheConfig::new().max_entries(2));
        for prompt in ["a", "b", "c", "d"] {
            let key = CacheKey::new(ProviderId::OpenAI, &Request::new("openai", "gpt-4", prompt));
            cache.put(key, response(prompt), Duration::from_secs(60));
        }
        assert_eq!(cache.len(), 2);
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_EVICTIONS_TOTAL), 2);
}

#[test]
fn rejection_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let limiter = RateLimiter::new(&RateLimitConfig::new().limit(1));
        assert!(limiter.allow("c"));
        assert!(!limiter.allow("c"));
        assert!(!limiter.allow("c"));
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::RATE_LIMITED_TOTAL), 2);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // No recorder installed; emission must not panic.
    let gateway = Gateway::builder()
        .provider(Arc::new(MockProvider))
        .build()
        .unwrap();
    gateway
        .handle(
            "c",
            Request::new("openai", "gpt-4", "hi"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
}
