//! Timeout wrapper for any counter store

use super::{with_timeout, CounterStore, StoreFuture};
use std::sync::Arc;
use std::time::Duration;

/// Bounds every operation of the wrapped store by a fixed timeout
pub struct TimeoutCounterStore {
    inner: Arc<dyn CounterStore>,
    timeout: Duration,
}

impl TimeoutCounterStore {
    pub fn new(inner: Arc<dyn CounterStore>, timeout: Duration) -> Self {
        TimeoutCounterStore { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CounterStore for TimeoutCounterStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, i64> {
        Box::pin(with_timeout(self.timeout, self.inner.get(key)))
    }

    fn set<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, ()> {
        Box::pin(with_timeout(self.timeout, self.inner.set(key, value)))
    }

    fn set_if_absent<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, bool> {
        Box::pin(with_timeout(self.timeout, self.inner.set_if_absent(key, value)))
    }

    fn increment<'a>(&'a self, key: &'a str, amount: i64) -> StoreFuture<'a, i64> {
        Box::pin(with_timeout(self.timeout, self.inner.increment(key, amount)))
    }

    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(with_timeout(self.timeout, self.inner.exists(key)))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(with_timeout(self.timeout, self.inner.ping()))
    }
}
