//! Read-through caching of generated calendar URLs.
//!
//! Stores are pluggable through `CacheStore`. ICS output is never cached since
//! every call must produce a fresh DTSTAMP and UIDs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{trace, warn};

use crate::clock::GenerateContext;
use crate::config::CalInviteConfig;
use crate::error::CalInviteResult;
use crate::event::Event;
use crate::provider::{Provider, generate_with};

/// Key/value store with per-entry expiry.
pub trait CacheStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;

    fn write(&self, key: &str, value: &str, ttl: Duration);

    fn delete(&self, key: &str);

    /// Delete every key starting with `prefix`. Returns false when the store
    /// cannot delete by pattern.
    fn delete_matching(&self, _prefix: &str) -> bool {
        false
    }
}

/// In-process store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => {
                return Some(value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        None
    }

    /// Expired entries are pruned on every write.
    fn write(&self, key: &str, value: &str, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    fn delete_matching(&self, prefix: &str) -> bool {
        self.lock().retain(|key, _| !key.starts_with(prefix));
        true
    }
}

/// Store that never keeps anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl CacheStore for NullStore {
    fn read(&self, _key: &str) -> Option<String> {
        None
    }

    fn write(&self, _key: &str, _value: &str, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}

    fn delete_matching(&self, _prefix: &str) -> bool {
        true
    }
}

/// `{prefix}:providers:{provider}:{sha256}`, where the digest covers the
/// event's canonical fingerprint and the provider id.
pub fn cache_key(prefix: &str, event: &Event, provider: Provider) -> CalInviteResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(event.cache_fingerprint()?.as_bytes());
    hasher.update(b":");
    hasher.update(provider.id().as_bytes());
    let digest = hex::encode(hasher.finalize());

    Ok(format!("{}:{}", provider_prefix(prefix, provider), digest))
}

fn provider_prefix(prefix: &str, provider: Provider) -> String {
    format!("{}:providers:{}", prefix, provider.id())
}

/// Wraps generation with a cache store.
pub struct CachedGenerator<S: CacheStore> {
    store: S,
    prefix: String,
    ttl: Duration,
    ctx: GenerateContext,
}

impl<S: CacheStore> CachedGenerator<S> {
    pub fn new(store: S, prefix: impl Into<String>, ttl: Duration, ctx: GenerateContext) -> Self {
        CachedGenerator {
            store,
            prefix: prefix.into(),
            ttl,
            ctx,
        }
    }

    /// Prefix and TTL taken from `config`.
    pub fn from_config(
        store: S,
        config: &CalInviteConfig,
        ctx: GenerateContext,
    ) -> CalInviteResult<Self> {
        Ok(Self::new(store, config.cache_prefix.clone(), config.cache_ttl()?, ctx))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the cached output for `event`/`provider`, generating and storing
    /// it on a miss.
    pub fn fetch(&self, event: &Event, provider: Provider) -> CalInviteResult<String> {
        if !is_cacheable(event, provider) {
            trace!(provider = %provider, "output not cacheable, generating");
            return generate_with(event, provider, &self.ctx);
        }

        let key = cache_key(&self.prefix, event, provider)?;

        if let Some(hit) = self.store.read(&key) {
            trace!(key = %key, "cache hit");
            return Ok(hit);
        }

        trace!(key = %key, "cache miss");
        let output = generate_with(event, provider, &self.ctx)?;
        self.store.write(&key, &output, self.ttl);
        Ok(output)
    }

    /// Drop every cached entry for `provider`.
    pub fn clear_provider(&self, provider: Provider) -> bool {
        let prefix = format!("{}:", provider_prefix(&self.prefix, provider));
        self.clear_matching(&prefix)
    }

    /// Drop every entry under this generator's prefix.
    pub fn clear_all(&self) -> bool {
        let prefix = format!("{}:", self.prefix);
        self.clear_matching(&prefix)
    }

    fn clear_matching(&self, prefix: &str) -> bool {
        let cleared = self.store.delete_matching(prefix);
        if !cleared {
            warn!(prefix = %prefix, "cache store does not support pattern deletion");
        }
        cleared
    }
}

/// ICS output carries a fresh DTSTAMP/UID per call, and all-day events with
/// a defaulted date depend on the current day.
fn is_cacheable(event: &Event, provider: Provider) -> bool {
    if !provider.is_web() {
        return false;
    }
    if event.is_all_day() && (event.start_time().is_none() || event.end_time().is_none()) {
        return false;
    }
    true
}
