//! Explicit cache for derived results (reports, AI insights).
//!
//! Callers own a [`ReportCache`] and pass it in; nothing here is global. An entry
//! is reused only while it is younger than the policy's max age and was computed
//! from the same task snapshot (same [`snapshot_fingerprint`]).

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(24),
        }
    }
}

impl CachePolicy {
    pub fn is_fresh<V>(&self, entry: &CacheEntry<V>, fingerprint: &str, now: DateTime<Utc>) -> bool {
        entry.fingerprint == fingerprint && now - entry.stored_at < self.max_age && entry.stored_at <= now
    }
}

pub trait ReportCache<V> {
    fn load(&self, key: &str) -> Option<CacheEntry<V>>;
    fn store(&mut self, key: &str, entry: CacheEntry<V>) -> Result<()>;
    fn evict(&mut self, key: &str) -> Result<()>;
}

/// In-process cache, mostly for servers and tests.
#[derive(Debug, Clone)]
pub struct MemoryCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> ReportCache<V> for MemoryCache<V> {
    fn load(&self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, entry: CacheEntry<V>) -> Result<()> {
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn evict(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Stable hash of everything the analytics read from a snapshot.
/// Input order does not matter.
pub fn snapshot_fingerprint(tasks: &[Task]) -> String {
    let mut rows: Vec<String> = tasks
        .iter()
        .map(|t| {
            let ts = |d: Option<DateTime<Utc>>| d.map(|d| d.timestamp_millis().to_string()).unwrap_or_default();
            let cats: Vec<&str> = t.categories.iter().map(|c| c.as_str()).collect();
            format!(
                "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
                t.id,
                t.priority,
                cats.join("\u{1e}"),
                ts(t.due_date),
                t.completed,
                ts(t.created_at),
                ts(t.completed_at),
                t.postponement_count,
                t.reopen_count,
                ts(t.first_action_at),
                t.title,
            )
        })
        .collect();
    rows.sort();

    let mut hasher = blake3::Hasher::new();
    for row in &rows {
        hasher.update(row.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Return the cached value when fresh; otherwise compute, store and return it.
/// The boolean is `true` on a cache hit.
pub fn cached_or_compute<V, C, F>(
    cache: &mut C,
    key: &str,
    fingerprint: &str,
    policy: CachePolicy,
    now: DateTime<Utc>,
    compute: F,
) -> Result<(V, bool)>
where
    V: Clone,
    C: ReportCache<V> + ?Sized,
    F: FnOnce() -> Result<V>,
{
    if let Some(entry) = cache.load(key) {
        if policy.is_fresh(&entry, fingerprint, now) {
            info!(key, "cache hit");
            return Ok((entry.value, true));
        }
        debug!(key, stored_at = %entry.stored_at, "cache entry stale; recomputing");
    }

    let value = compute()?;
    cache.store(
        key,
        CacheEntry {
            value: value.clone(),
            stored_at: now,
            fingerprint: fingerprint.to_string(),
        },
    )?;
    info!(key, "cache miss; stored fresh entry");
    Ok((value, false))
}
