pub mod catalog;
pub mod config;
pub mod server;
pub mod stats;
pub mod store;

pub use catalog::ReferenceCatalog;
pub use config::{ConfigError, LogFormat, ServiceConfig};
pub use stats::{AggregationEngine, Bootstrap, ResetPolicy, StatsError, StatsResult};
pub use store::{CounterStore, StoreConfig, StoreError};
