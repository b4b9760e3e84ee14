//! Unit tests for the cache-backed OTP store

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use eo_core::domain::{Clock, ExpiryPolicy, ManualClock, StorageBackend, VerificationOutcome};
use eo_core::errors::OtpError;
use eo_core::services::OtpStore;
use eo_shared::config::MismatchPolicy;

use crate::cache::{CacheConfig, CacheOtpStore, CachedOtp, KeyValueCache, MemoryCache};

const ID: &str = "a@x.com";

fn store_with(policy: ExpiryPolicy) -> (CacheOtpStore<MemoryCache>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let store = CacheOtpStore::new(MemoryCache::new(), CacheConfig::default(), clock.clone(), policy);
    (store, clock)
}

fn store() -> (CacheOtpStore<MemoryCache>, Arc<ManualClock>) {
    store_with(ExpiryPolicy::default())
}

#[tokio::test]
async fn test_put_writes_json_under_prefixed_key() {
    let (store, clock) = store();
    store.put(ID, "482913").await.unwrap();

    let raw = store.cache().get("otp:a@x.com").await.unwrap().unwrap();
    let cached: CachedOtp = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached.code, "482913");
    assert_eq!(cached.issued_at, clock.now());
}

#[tokio::test]
async fn test_verify_lifecycle() {
    let (store, _) = store();

    assert_eq!(store.verify(ID, "482913").await.unwrap(), VerificationOutcome::NotFound);

    store.put(ID, "482913").await.unwrap();
    assert_eq!(store.verify(ID, "482913").await.unwrap(), VerificationOutcome::Verified);
    assert_eq!(store.verify(ID, "482913").await.unwrap(), VerificationOutcome::NotFound);
    assert!(store.cache().is_empty().await);
}

#[tokio::test]
async fn test_mismatch_retains_record_by_default() {
    let (store, _) = store();
    store.put(ID, "482913").await.unwrap();

    assert_eq!(store.verify(ID, "000000").await.unwrap(), VerificationOutcome::Mismatch);
    assert_eq!(store.verify(ID, "482913").await.unwrap(), VerificationOutcome::Verified);
}

#[tokio::test]
async fn test_mismatch_invalidates_when_configured() {
    let (store, _) = store_with(ExpiryPolicy::new(Duration::seconds(300), MismatchPolicy::Invalidate));
    store.put(ID, "482913").await.unwrap();

    assert_eq!(store.verify(ID, "000000").await.unwrap(), VerificationOutcome::Mismatch);
    assert_eq!(store.verify(ID, "482913").await.unwrap(), VerificationOutcome::NotFound);
}

#[tokio::test]
async fn test_expiry_boundary() {
    let (store, clock) = store();
    store.put(ID, "482913").await.unwrap();

    clock.advance_secs(300);
    assert_eq!(store.verify(ID, "000000").await.unwrap(), VerificationOutcome::Mismatch);

    clock.advance(Duration::milliseconds(1));
    assert_eq!(store.verify(ID, "482913").await.unwrap(), VerificationOutcome::Expired);
    // Lazy expiry leaves the record in place
    assert_eq!(store.cache().len().await, 1);
}

#[tokio::test]
async fn test_put_replaces_previous_code() {
    let (store, clock) = store();
    store.put(ID, "111111").await.unwrap();
    clock.advance_secs(250);
    store.put(ID, "222222").await.unwrap();
    clock.advance_secs(250);

    assert_eq!(store.verify(ID, "111111").await.unwrap(), VerificationOutcome::Mismatch);
    assert_eq!(store.verify(ID, "222222").await.unwrap(), VerificationOutcome::Verified);
}

#[tokio::test]
async fn test_corrupt_record_is_store_error() {
    let (store, _) = store();
    store.cache().set("otp:a@x.com", "{not json").await.unwrap();

    let err = store.verify(ID, "482913").await.unwrap_err();
    assert!(matches!(err, OtpError::StoreOperation { .. }));
}

#[tokio::test]
async fn test_remove() {
    let (store, _) = store();
    store.put(ID, "482913").await.unwrap();

    assert!(store.remove(ID).await.unwrap());
    assert!(!store.remove(ID).await.unwrap());
}

#[tokio::test]
async fn test_purge_expired_keeps_live_and_foreign_keys() {
    let (store, clock) = store();
    store.put("old@x.com", "111111").await.unwrap();
    clock.advance_secs(200);
    store.put("new@x.com", "222222").await.unwrap();
    store.cache().set("session:abc", "unrelated").await.unwrap();
    store.cache().set("otp:broken@x.com", "garbage").await.unwrap();
    clock.advance_secs(150);

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.verify("old@x.com", "111111").await.unwrap(), VerificationOutcome::NotFound);
    assert_eq!(store.verify("new@x.com", "222222").await.unwrap(), VerificationOutcome::Verified);
    assert!(store.cache().get("session:abc").await.unwrap().is_some());
    assert!(store.cache().get("otp:broken@x.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_backend_kind() {
    let (store, _) = store();
    assert_eq!(store.backend(), StorageBackend::Cache);
}

#[tokio::test]
async fn test_custom_prefix() {
    let clock = Arc::new(ManualClock::starting_now());
    let store = CacheOtpStore::new(
        MemoryCache::new(),
        CacheConfig::default().with_prefix("login-otp"),
        clock,
        ExpiryPolicy::default(),
    );
    store.put(ID, "482913").await.unwrap();
    assert!(store.cache().get("login-otp:a@x.com").await.unwrap().is_some());
}
