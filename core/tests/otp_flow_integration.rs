//! Integration tests for the email OTP flow across generator, facade and store

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tokio::sync::{Mutex, RwLock};

    use eo_core::{
        Clock, EmailOtpAuth, ExpiryPolicy, MailDispatcher, ManualClock, OtpError, OtpGenerator,
        OtpRecord, OtpResult, OtpServiceConfig, OtpStore, StorageBackend, VerificationOutcome,
    };

    // Mailer that keeps an outbox per recipient
    struct Outbox {
        messages: Mutex<HashMap<String, Vec<String>>>,
    }

    impl Outbox {
        fn new() -> Self {
            Self {
                messages: Mutex::new(HashMap::new()),
            }
        }

        async fn latest(&self, recipient: &str) -> Option<String> {
            self.messages
                .lock()
                .await
                .get(recipient)
                .and_then(|codes| codes.last().cloned())
        }
    }

    #[async_trait]
    impl MailDispatcher for Outbox {
        async fn send_otp(&self, recipient: &str, code: &str) -> OtpResult<()> {
            self.messages
                .lock()
                .await
                .entry(recipient.to_string())
                .or_default()
                .push(code.to_string());
            Ok(())
        }
    }

    // Store guarded by an RwLock with a write-locked consume step
    struct LockedStore {
        records: RwLock<HashMap<String, OtpRecord>>,
        clock: Arc<ManualClock>,
        policy: ExpiryPolicy,
    }

    impl LockedStore {
        fn new(clock: Arc<ManualClock>) -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
                clock,
                policy: ExpiryPolicy::default(),
            }
        }
    }

    #[async_trait]
    impl OtpStore for LockedStore {
        async fn put(&self, identity: &str, code: &str) -> OtpResult<()> {
            let record = OtpRecord::new(identity, code, self.clock.now());
            self.records.write().await.insert(identity.to_string(), record);
            Ok(())
        }

        async fn verify(&self, identity: &str, code: &str) -> OtpResult<VerificationOutcome> {
            let outcome = match self.records.read().await.get(identity) {
                Some(record) => record.evaluate(code, self.clock.now(), &self.policy),
                None => return Ok(VerificationOutcome::NotFound),
            };

            if outcome.is_verified() && self.records.write().await.remove(identity).is_none() {
                return Ok(VerificationOutcome::NotFound);
            }
            Ok(outcome)
        }

        async fn remove(&self, identity: &str) -> OtpResult<bool> {
            Ok(self.records.write().await.remove(identity).is_some())
        }

        async fn purge_expired(&self) -> OtpResult<u64> {
            let now = self.clock.now();
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|_, r| !r.is_expired_at(now, &self.policy));
            Ok((before - records.len()) as u64)
        }

        fn backend(&self) -> StorageBackend {
            StorageBackend::Relational
        }
    }

    fn facade() -> (EmailOtpAuth<Outbox, LockedStore>, Arc<Outbox>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let outbox = Arc::new(Outbox::new());
        let store = Arc::new(LockedStore::new(clock.clone()));
        let auth = EmailOtpAuth::new(outbox.clone(), store, OtpServiceConfig::default()).unwrap();
        (auth, outbox, clock)
    }

    #[test]
    fn test_generator_shape_over_many_samples() {
        let generator = OtpGenerator::default();
        let mut distinct = HashSet::new();

        for _ in 0..10_000 {
            let code = generator.generate();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
            distinct.insert(code);
        }

        // 10k draws from a million values collide only rarely
        assert!(distinct.len() > 9_900);
    }

    #[tokio::test]
    async fn test_independent_identities() {
        let (auth, outbox, _) = facade();

        auth.generate_otp("a@example.com").await.unwrap();
        auth.generate_otp("b@example.com").await.unwrap();
        let code_a = outbox.latest("a@example.com").await.unwrap();
        let code_b = outbox.latest("b@example.com").await.unwrap();

        assert!(auth.is_valid_otp("a@example.com", &code_a).await.unwrap());
        // a's verification leaves b's code alone
        assert!(auth.is_valid_otp("b@example.com", &code_b).await.unwrap());
    }

    #[tokio::test]
    async fn test_full_lifecycle_with_expiry() {
        let (auth, outbox, clock) = facade();

        auth.generate_otp("user@example.com").await.unwrap();
        let first = outbox.latest("user@example.com").await.unwrap();

        clock.advance_secs(301);
        assert_eq!(
            auth.verify_otp("user@example.com", &first).await.unwrap(),
            VerificationOutcome::Expired
        );

        // Expired records stay until replaced or purged
        assert_eq!(
            auth.verify_otp("user@example.com", &first).await.unwrap(),
            VerificationOutcome::Expired
        );

        auth.generate_otp("user@example.com").await.unwrap();
        let second = outbox.latest("user@example.com").await.unwrap();
        auth.verify_otp_strict("user@example.com", &second).await.unwrap();

        assert!(matches!(
            auth.verify_otp_strict("user@example.com", &second).await,
            Err(OtpError::NotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_verification_succeeds_once() {
        let (auth, outbox, _) = facade();
        let auth = Arc::new(auth);

        auth.generate_otp("race@example.com").await.unwrap();
        let code = outbox.latest("race@example.com").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let auth = auth.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                auth.verify_otp("race@example.com", &code).await.unwrap()
            }));
        }

        let mut verified = 0;
        for handle in handles {
            match handle.await.unwrap() {
                VerificationOutcome::Verified => verified += 1,
                VerificationOutcome::NotFound => {}
                other => panic!("unexpected outcome {other}"),
            }
        }
        assert_eq!(verified, 1);
    }
}
