//! Tests for the result cache and the rate limiter

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sibyl::cache::{MemoryCache, ResultCache};
use sibyl::limiter::{FixedWindowLimiter, RateLimiter, Unlimited};
use sibyl::models::{AnalysisResult, AnalysisType};

fn sample_result(summary: &str) -> AnalysisResult {
    AnalysisResult::new(
        AnalysisType::CodeQuality,
        summary,
        Vec::new(),
        Vec::new(),
        BTreeMap::new(),
        0.9,
    )
}

#[test]
fn test_put_then_get_round_trips() {
    let cache = MemoryCache::new();
    let result = sample_result("stored");

    cache.put("key", &result, Duration::from_secs(60));

    let fetched = cache.get("key").expect("live entry");
    assert_eq!(fetched, result);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_miss_on_unknown_key() {
    let cache = MemoryCache::new();
    assert!(cache.get("never-stored").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_entries_expire_after_their_ttl() {
    let cache = MemoryCache::new();
    cache.put("short", &sample_result("gone soon"), Duration::from_millis(10));

    thread::sleep(Duration::from_millis(30));

    assert!(cache.get("short").is_none());
    // Expired entries are dropped on lookup
    assert!(cache.is_empty());
}

#[test]
fn test_zero_ttl_entries_never_come_back() {
    let cache = MemoryCache::new();
    cache.put("instant", &sample_result("dead on arrival"), Duration::ZERO);
    assert!(cache.get("instant").is_none());
}

#[test]
fn test_overwriting_a_key_replaces_the_entry() {
    let cache = MemoryCache::new();
    cache.put("key", &sample_result("first"), Duration::from_secs(60));
    cache.put("key", &sample_result("second"), Duration::from_secs(60));

    assert_eq!(cache.get("key").expect("entry").summary, "second");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_clear_drops_everything() {
    let cache = MemoryCache::new();
    cache.put("a", &sample_result("a"), Duration::from_secs(60));
    cache.put("b", &sample_result("b"), Duration::from_secs(60));

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_concurrent_access_is_safe() {
    let cache = Arc::new(MemoryCache::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for round in 0..50 {
                    let key = format!("worker-{worker}-{round}");
                    cache.put(&key, &sample_result(&key), Duration::from_secs(60));
                    assert!(cache.get(&key).is_some());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread");
    }
    assert_eq!(cache.len(), 8 * 50);
}

#[test]
fn test_unlimited_never_refuses() {
    let limiter = Unlimited;
    for _ in 0..1000 {
        assert!(limiter.try_consume(1));
    }
}

#[test]
fn test_fixed_window_enforces_its_budget() {
    let limiter = FixedWindowLimiter::per_minute(3);

    assert!(limiter.try_consume(1));
    assert!(limiter.try_consume(1));
    assert!(limiter.try_consume(1));
    assert!(!limiter.try_consume(1), "fourth permit exceeds the window");
}

#[test]
fn test_fixed_window_resets_when_a_new_window_begins() {
    let limiter = FixedWindowLimiter::new(1, Duration::from_millis(20));

    assert!(limiter.try_consume(1));
    assert!(!limiter.try_consume(1));

    thread::sleep(Duration::from_millis(40));
    assert!(limiter.try_consume(1), "a fresh window has fresh permits");
}

#[test]
fn test_multi_permit_requests_count_fully() {
    let limiter = FixedWindowLimiter::per_minute(5);

    assert!(limiter.try_consume(4));
    assert!(!limiter.try_consume(2), "only one permit remains");
    assert!(limiter.try_consume(1));
}

#[test]
fn test_zero_capacity_disables_limiting() {
    let limiter = FixedWindowLimiter::per_minute(0);
    for _ in 0..100 {
        assert!(limiter.try_consume(1));
    }
}
