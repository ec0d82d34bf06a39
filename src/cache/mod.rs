//! Result caching keyed by request content

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::debug;

use crate::models::AnalysisResult;

/// Store for finished analysis results
pub trait ResultCache: Send + Sync {
    /// Fetch a live entry, None on miss or expiry
    fn get(&self, key: &str) -> Option<AnalysisResult>;

    /// Store a result under the key for the given lifetime
    fn put(&self, key: &str, result: &AnalysisResult, ttl: Duration);
}

/// Caches share naturally through Arc
impl<T: ResultCache + ?Sized> ResultCache for Arc<T> {
    fn get(&self, key: &str) -> Option<AnalysisResult> {
        (**self).get(key)
    }

    fn put(&self, key: &str, result: &AnalysisResult, ttl: Duration) {
        (**self).put(key, result, ttl)
    }
}

struct CacheEntry {
    result: AnalysisResult,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry.
///
/// Expired entries are dropped lazily on lookup; there is no sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, counting expired ones not yet dropped
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<AnalysisResult> {
        if let Ok(mut entries) = self.entries.lock() {
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.result.clone());
                }
                Some(_) => {
                    debug!("Cache entry expired: {key}");
                    entries.remove(key);
                }
                None => {}
            }
        }
        None
    }

    fn put(&self, key: &str, result: &AnalysisResult, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    result: result.clone(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }
}
