//! Redis Counter Store Implementation
//!
//! Backs the counter store with Redis using a multiplexed async connection.
//! Counters map one-to-one onto Redis string keys:
//!
//! - `get` → `GET` (nil reads as 0)
//! - `set` → `SET`
//! - `set_if_absent` → `SETNX`
//! - `increment` → `INCRBY` (atomic on the server; overflow is `StoreError::Overflow`)
//! - `exists` → `EXISTS`
//!
//! Each command is bounded by `command_timeout`. No retries happen here;
//! a failed or timed-out command surfaces as a `StoreError` immediately.

use super::{with_timeout, CounterStore, StoreConfig, StoreError, StoreFuture};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::time::Duration;
use tracing::info;

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Redis-backed counter store
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: MultiplexedConnection,
    command_timeout: Duration,
}

impl RedisCounterStore {
    /// Connect to Redis
    ///
    /// Fails with `StoreError::Unavailable` or `StoreError::Timeout` when the
    /// server cannot be reached within `connection_timeout`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", config.redacted_url(), e)))?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| StoreError::Timeout(config.connection_timeout))??;

        info!("Connected to counter store at {}", config.redacted_url());

        Ok(RedisCounterStore {
            connection,
            command_timeout: config.command_timeout,
        })
    }

    /// Run one command under the command timeout
    async fn run<T, F>(&self, command: F) -> Result<T, StoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        with_timeout(self.command_timeout, async {
            command.await.map_err(StoreError::from)
        })
        .await
    }
}

/// Parse a raw Redis string value as a counter
fn parse_counter(key: &str, raw: Option<String>) -> Result<i64, StoreError> {
    match raw {
        None => Ok(0),
        Some(text) => text.trim().parse().map_err(|_| StoreError::CorruptValue {
            key: key.to_string(),
            detail: format!("found {:?}", text),
        }),
    }
}

/// Map INCRBY rejections onto the same errors the in-memory store returns
fn classify_increment_error(key: &str, error: StoreError) -> StoreError {
    match error {
        StoreError::Unavailable(msg) if msg.contains("would overflow") => StoreError::Overflow {
            key: key.to_string(),
        },
        StoreError::Unavailable(msg) if msg.contains("not an integer") => {
            StoreError::CorruptValue {
                key: key.to_string(),
                detail: msg,
            }
        }
        other => other,
    }
}

impl CounterStore for RedisCounterStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, i64> {
        Box::pin(async move {
            let mut conn = self.connection.clone();
            let raw = self
                .run(async move {
                    let value: Option<String> = conn.get(key).await?;
                    Ok(value)
                })
                .await?;
            parse_counter(key, raw)
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut conn = self.connection.clone();
            self.run(async move {
                let _: () = conn.set(key, value).await?;
                Ok(())
            })
            .await
        })
    }

    fn set_if_absent<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut conn = self.connection.clone();
            self.run(async move {
                let written: bool = conn.set_nx(key, value).await?;
                Ok(written)
            })
            .await
        })
    }

    fn increment<'a>(&'a self, key: &'a str, amount: i64) -> StoreFuture<'a, i64> {
        Box::pin(async move {
            let mut conn = self.connection.clone();
            self.run(async move {
                let value: i64 = conn.incr(key, amount).await?;
                Ok(value)
            })
            .await
            .map_err(|e| classify_increment_error(key, e))
        })
    }

    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut conn = self.connection.clone();
            self.run(async move {
                let present: bool = conn.exists(key).await?;
                Ok(present)
            })
            .await
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut conn = self.connection.clone();
            self.run(async move {
                let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                Ok(())
            })
            .await
        })
    }
}
