//! Integration tests for the message cache: persistence across handles,
//! expiration, maintenance operations.

mod common;

use chrono::{Duration, Utc};
use scriba::cache::{CacheEntry, Fingerprint, MessageCache, TTL_HOURS};

use common::temp_test_dir;

/// Write an entry file directly with a chosen timestamp, bypassing store().
fn write_entry_with_age(cache: &MessageCache, fingerprint: &Fingerprint, message: &str, age_hours: i64) {
    let entry = CacheEntry {
        fingerprint: fingerprint.to_string(),
        message: message.to_string(),
        created_at: Utc::now() - Duration::hours(age_hours),
        preset: "light".to_string(),
        diff_size: message.len(),
    };
    std::fs::write(
        cache.entries_dir().join(format!("{fingerprint}.json")),
        serde_json::to_string_pretty(&entry).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_cache_persists_across_handles() {
    let dir = temp_test_dir();
    let fingerprint = Fingerprint::compute("model:tinyllama", "+fn new() {}");

    {
        let cache = MessageCache::open(dir.path().join("cache")).unwrap();
        cache.store(&fingerprint, "Add constructor", "light", 12);
    }

    // A fresh handle over the same directory sees the entry.
    let cache = MessageCache::open(dir.path().join("cache")).unwrap();
    assert_eq!(cache.lookup(&fingerprint).as_deref(), Some("Add constructor"));
}

#[test]
fn test_entry_just_under_ttl_is_returned() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();
    let fingerprint = Fingerprint::compute("rules", "+line");

    write_entry_with_age(&cache, &fingerprint, "Still fresh", TTL_HOURS - 1);
    assert_eq!(cache.lookup(&fingerprint).as_deref(), Some("Still fresh"));
}

#[test]
fn test_entry_past_ttl_is_not_returned() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();
    let fingerprint = Fingerprint::compute("rules", "+line");

    write_entry_with_age(&cache, &fingerprint, "Too old", TTL_HOURS + 1);
    assert_eq!(cache.lookup(&fingerprint), None);
}

#[test]
fn test_clear_default_removes_everything() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();

    for i in 0..5 {
        let fp = Fingerprint::compute("rules", &format!("+change {i}"));
        cache.store(&fp, &format!("message {i}"), "ultra-fast", 10);
    }
    assert_eq!(cache.stats().unwrap().entries, 5);

    let removed = cache.clear(None).unwrap();
    assert_eq!(removed, 5);

    let stats = cache.stats().unwrap();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.total_size_bytes, 0);
    assert!(stats.oldest.is_none());
    assert!(stats.newest.is_none());
}

#[test]
fn test_clear_by_age_is_selective() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();

    let old = Fingerprint::compute("rules", "+old");
    write_entry_with_age(&cache, &old, "old entry", 24 * 10);

    let recent = Fingerprint::compute("rules", "+recent");
    cache.store(&recent, "recent entry", "ultra-fast", 7);

    let removed = cache.clear(Some(Duration::days(7))).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(cache.lookup(&recent).as_deref(), Some("recent entry"));
    assert_eq!(cache.stats().unwrap().entries, 1);
}

#[test]
fn test_expired_entries_are_reclaimed_by_clear_not_lookup() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();
    let fingerprint = Fingerprint::compute("rules", "+line");

    write_entry_with_age(&cache, &fingerprint, "expired", TTL_HOURS + 2);

    // Lookup misses but the file survives...
    assert_eq!(cache.lookup(&fingerprint), None);
    assert_eq!(cache.stats().unwrap().entries, 1);

    // ...until maintenance deletes it.
    let removed = cache.clear(Some(Duration::hours(TTL_HOURS))).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(cache.stats().unwrap().entries, 0);
}

#[test]
fn test_lookup_ignores_foreign_fingerprint() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();

    cache.store(&Fingerprint::compute("rules", "+a"), "message a", "ultra-fast", 2);
    assert_eq!(cache.lookup(&Fingerprint::compute("rules", "+b")), None);
}

#[test]
fn test_stats_on_empty_cache() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();

    let stats = cache.stats().unwrap();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.total_size_bytes, 0);
    assert!(stats.oldest.is_none());
    assert!(stats.newest.is_none());
    assert!(stats.presets.is_empty());
}

#[test]
fn test_index_survives_and_counts_presets() {
    let dir = temp_test_dir();
    let cache = MessageCache::open(dir.path()).unwrap();

    cache.store(&Fingerprint::compute("rules", "+a"), "a", "ultra-fast", 2);
    cache.store(&Fingerprint::compute("model:tinyllama", "+a"), "a", "light", 2);

    let index_path = cache.root().join("index.json");
    assert!(index_path.exists());

    let stats = cache.stats().unwrap();
    assert_eq!(stats.presets.get("ultra-fast"), Some(&1));
    assert_eq!(stats.presets.get("light"), Some(&1));
}
