//! Bounded response cache with per-entry TTL.
//!
//! [`ResponseCache`] deduplicates identical requests. Entries are keyed on a
//! [`CacheKey`] built from every request field that can change the answer,
//! so two requests that differ only in `temperature` or `max_tokens` never
//! share an entry.
//!
//! # Expiry
//!
//! Staleness is decided lazily: [`ResponseCache::get`] treats an entry older
//! than its TTL as absent but leaves it in place. There is no background
//! sweep; a stale entry occupies capacity until it is overwritten or evicted.
//!
//! # Eviction
//!
//! Inserting a new key into a full cache first removes exactly one entry:
//! the one with the oldest creation time. Ties on creation time go to the
//! lowest insertion sequence number. An ordered index over
//! `(created_at, seq)` keeps this O(log n) instead of a full scan.
//! Overwriting a key that is already present does not grow the store and
//! therefore evicts nothing.
//!
//! # Concurrency
//!
//! One `RwLock` guards the store. Lookups share the read side; inserts and
//! evictions take the write side. The lock is never held across an `.await`.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::{ProviderId, Request, Response};

/// Configuration for the response cache.
///
/// ```rust
/// # use switchyard::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 1,000.
    pub max_entries: usize,
    /// Time-to-live applied to entries stored by the gateway. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Identity of a cacheable request.
///
/// Holds the full request fingerprint rather than a hash of it, so distinct
/// requests can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: ProviderId,
    model: String,
    prompt: String,
    max_tokens: Option<u32>,
    /// `f32` bit pattern; `-0.0` is folded into `0.0`.
    temperature: Option<u32>,
}

impl CacheKey {
    /// Build the key for `request` once its provider has been resolved.
    pub fn new(provider: ProviderId, request: &Request) -> Self {
        Self {
            provider,
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature.map(|t| {
                if t == 0.0 {
                    0.0f32.to_bits()
                } else {
                    t.to_bits()
                }
            }),
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Short, process-local digest for log lines. Never used for lookups.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// A stored response together with its age bookkeeping.
///
/// Handed out by value; the cache never exposes its own copy.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: Response,
    pub created_at: Instant,
    pub ttl: Duration,
    seq: u64,
}

impl CacheEntry {
    /// Whether the entry is past its TTL at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }
}

#[derive(Default)]
struct Store {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Eviction order: oldest `(created_at, seq)` first.
    order: BTreeMap<(Instant, u64), CacheKey>,
    next_seq: u64,
}

/// In-memory response cache. See module docs for expiry and eviction rules.
pub struct ResponseCache {
    store: RwLock<Store>,
    max_entries: usize,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            max_entries: config.max_entries,
            ttl: config.ttl,
        }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Configured default TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live response.
    ///
    /// Returns `None` when the key is absent or its entry has expired.
    /// Expired entries are left in place. Emits cache hit/miss metrics.
    pub fn get(&self, key: &CacheKey) -> Option<Response> {
        let found = self.get_entry(key).map(|entry| entry.response);
        if found.is_some() {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "provider" => key.provider.as_str())
                .increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "provider" => key.provider.as_str())
                .increment(1);
        }
        found
    }

    /// Like [`get`](Self::get) but returns the whole entry and emits no metrics.
    pub fn get_entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let entry = store.entries.get(key)?;
        if entry.is_expired_at(Instant::now()) {
            debug!(key = key.fingerprint(), "cache entry expired");
            return None;
        }
        Some(entry.clone())
    }

    /// Store `response` under `key` for `ttl`.
    ///
    /// A new key arriving at capacity evicts the oldest entry first.
    /// A zero-capacity cache stores nothing.
    pub fn put(&self, key: CacheKey, mut response: Response, ttl: Duration) {
        if self.max_entries == 0 {
            return;
        }
        response.cached = false;

        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = store.entries.remove(&key) {
            store.order.remove(&(previous.created_at, previous.seq));
        } else if store.entries.len() >= self.max_entries
            && let Some((_, oldest)) = store.order.pop_first()
        {
            store.entries.remove(&oldest);
            debug!(evicted = oldest.fingerprint(), "cache full, evicted oldest entry");
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
        }

        let seq = store.next_seq;
        store.next_seq += 1;
        let created_at = Instant::now();
        store.order.insert((created_at, seq), key.clone());
        store.entries.insert(
            key,
            CacheEntry {
                response,
                created_at,
                ttl,
                seq,
            },
        );
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
