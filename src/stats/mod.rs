//! Platform statistics
//!
//! Counter-backed statistics for the platform as a whole, per region and per
//! organization. Counters live in a [`CounterStore`](crate::store::CounterStore);
//! this module encodes their keys, reads them back into entities, derives
//! ratios and rankings, and seeds baseline values.
//!
//! ## Key Format
//!
//! - `stats:<metric>` for platform-wide counters
//! - `stats:region:<code>:<metric>` for region counters
//! - `stats:org:<name>:<metric>` for organization counters
//!
//! ## Example
//!
//! ```text
//! INCRREGION CAI users 1
//! REGION CAI
//! TOPORGS 5
//! ```

pub mod bootstrap;
pub mod commands;
pub mod engine;
pub mod error;
pub mod keys;
pub mod ranking;
pub mod types;

pub use bootstrap::{baseline, Bootstrap, ResetPolicy, SeedReport};
pub use commands::{render_reply, CatalogTable, StatsCommand, StatsCommandExecutor};
pub use engine::AggregationEngine;
pub use error::{StatsError, StatsResult};
pub use keys::{DecodedKey, Scope, StatsKeyEncoder};
pub use types::{
    GlobalMetric, OrganizationMetric, OrganizationReport, OrganizationStatistics,
    PlatformActivity, PlatformStatistics, RatingCategory, RegionMetric, RegionReport,
    RegionStatistics, StatisticsSummary,
};
