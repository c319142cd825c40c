//! Counter Store Abstraction
//!
//! A trait-based abstraction over an atomic integer key-value service.
//! The counter store is the system of record for every statistic; the
//! aggregation engine only ever talks to it through [`CounterStore`].
//!
//! Implementations:
//! - `InMemoryCounterStore`: For unit tests, demos and `memory://` URLs
//! - `RedisCounterStore`: For production, every command bounded by a timeout
//! - `FaultyCounterStore`: Wrapper that simulates store outages and latency in tests
//! - `TimeoutCounterStore`: Wrapper that bounds every operation of another store

mod config;
mod faulty;
mod memory;
mod redis_store;
mod timeout;

pub use config::StoreConfig;
pub use faulty::FaultyCounterStore;
pub use memory::InMemoryCounterStore;
pub use redis_store::RedisCounterStore;
pub use timeout::TimeoutCounterStore;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Error type for counter store operations
///
/// A missing key is never an error (it reads as zero). Every variant here
/// means the store could not answer the request.
#[derive(Debug)]
pub enum StoreError {
    /// Store could not be reached (connection refused, dropped, etc.)
    Unavailable(String),
    /// Command did not complete within the configured timeout
    Timeout(Duration),
    /// Key holds a value that is not an integer counter
    CorruptValue { key: String, detail: String },
    /// Store URL could not be understood
    InvalidUrl(String),
    /// Increment would leave the i64 range; the counter is unchanged
    Overflow { key: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Counter store unavailable: {}", msg),
            StoreError::Timeout(timeout) => {
                write!(f, "Counter store timed out after {}ms", timeout.as_millis())
            }
            StoreError::CorruptValue { key, detail } => {
                write!(f, "Counter at '{}' is not an integer: {}", key, detail)
            }
            StoreError::InvalidUrl(msg) => write!(f, "Invalid counter store URL: {}", msg),
            StoreError::Overflow { key } => {
                write!(f, "Increment of '{}' would overflow", key)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Boxed future returned by every store operation
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Counter store abstraction trait
///
/// `increment` must be atomic with respect to concurrent callers; nothing
/// else in the system provides locking.
pub trait CounterStore: Send + Sync + 'static {
    /// Read a counter, 0 when the key is absent
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, i64>;

    /// Unconditionally overwrite a counter
    fn set<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, ()>;

    /// Write only if the key does not exist; returns whether it wrote
    fn set_if_absent<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, bool>;

    /// Atomically add `amount` (may be negative) and return the new value
    fn increment<'a>(&'a self, key: &'a str, amount: i64) -> StoreFuture<'a, i64>;

    /// Check if a key exists
    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;

    /// Round-trip to the store to verify connectivity
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Run one store operation under `timeout`
///
/// Expiry drops the operation and yields `StoreError::Timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!("Counter store operation exceeded {:?}", timeout);
            Err(StoreError::Timeout(timeout))
        }
    }
}

/// Open a store from a URL
///
/// `memory://` gives a process-local store, anything else is handed to Redis.
/// Both bound every operation by `command_timeout`.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
    if config.is_in_memory() {
        let store = Arc::new(InMemoryCounterStore::new());
        return Ok(Arc::new(TimeoutCounterStore::new(
            store,
            config.command_timeout,
        )));
    }
    let store = RedisCounterStore::connect(config).await?;
    Ok(Arc::new(store))
}
