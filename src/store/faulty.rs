//! Counter store wrapper with outage injection
//!
//! Wraps another store and fails or delays operations on demand, so callers
//! can be tested against a store that goes away or stalls mid-request.

use super::{CounterStore, StoreError, StoreFuture};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Statistics for fault injection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultyStoreStats {
    pub attempts: u64,
    pub failures: u64,
}

/// Store wrapper that can simulate an outage
pub struct FaultyCounterStore {
    inner: Arc<dyn CounterStore>,
    down: AtomicBool,
    /// Operations left before the store goes down (u64::MAX = never)
    remaining_ok: AtomicU64,
    /// Delay added before every operation, in microseconds
    latency_us: AtomicU64,
    attempts: AtomicU64,
    failures: AtomicU64,
}

impl FaultyCounterStore {
    /// Wrap a healthy store
    pub fn new(inner: Arc<dyn CounterStore>) -> Self {
        FaultyCounterStore {
            inner,
            down: AtomicBool::new(false),
            remaining_ok: AtomicU64::new(u64::MAX),
            latency_us: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Take the store down (true) or bring it back (false)
    ///
    /// A pending `fail_after` budget survives the outage.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Let `n` more operations succeed, then fail everything after
    pub fn fail_after(&self, n: u64) {
        self.remaining_ok.store(n, Ordering::SeqCst);
    }

    /// Delay every later operation by `latency` (zero turns it off)
    pub fn set_latency(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.latency_us.store(micros, Ordering::SeqCst);
    }

    async fn delay(&self) {
        let micros = self.latency_us.load(Ordering::SeqCst);
        if micros > 0 {
            tokio::time::sleep(Duration::from_micros(micros)).await;
        }
    }

    /// Current statistics
    pub fn stats(&self) -> FaultyStoreStats {
        FaultyStoreStats {
            attempts: self.attempts.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
        }
    }

    fn check(&self, op: &str) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        // An outage does not spend the fail_after budget
        let failed = self.down.load(Ordering::SeqCst)
            || self
                .remaining_ok
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                    u64::MAX => Some(u64::MAX),
                    0 => None,
                    n => Some(n - 1),
                })
                .is_err();

        if failed {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Unavailable(format!(
                "simulated outage during {}",
                op
            )));
        }
        Ok(())
    }
}

impl CounterStore for FaultyCounterStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, i64> {
        Box::pin(async move {
            self.delay().await;
            self.check("GET")?;
            self.inner.get(key).await
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.delay().await;
            self.check("SET")?;
            self.inner.set(key, value).await
        })
    }

    fn set_if_absent<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.delay().await;
            self.check("SETNX")?;
            self.inner.set_if_absent(key, value).await
        })
    }

    fn increment<'a>(&'a self, key: &'a str, amount: i64) -> StoreFuture<'a, i64> {
        Box::pin(async move {
            self.delay().await;
            self.check("INCRBY")?;
            self.inner.increment(key, amount).await
        })
    }

    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.delay().await;
            self.check("EXISTS")?;
            self.inner.exists(key).await
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.delay().await;
            self.check("PING")?;
            self.inner.ping().await
        })
    }
}
