//! Seeding and resetting the global counters
//!
//! Seeding writes baseline values only where no counter exists yet, so it is
//! safe to run on every startup. Resetting is destructive and refuses to run
//! unless the bootstrap was built with [`ResetPolicy::Enabled`].

use super::keys::StatsKeyEncoder;
use super::types::GlobalMetric;
use super::{StatsError, StatsResult};
use crate::store::CounterStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Baseline value written by `seed_defaults` for each global counter
pub fn baseline(metric: GlobalMetric) -> i64 {
    match metric {
        GlobalMetric::TotalUsers => 1500,
        GlobalMetric::TotalCitizens => 1200,
        GlobalMetric::TotalCandidates => 200,
        GlobalMetric::TotalMembers => 100,
        GlobalMetric::TotalMessages => 5000,
        GlobalMetric::TotalComplaints => 800,
        GlobalMetric::TotalRatings => 2500,
        GlobalMetric::ResolvedComplaints => 600,
        GlobalMetric::PendingComplaints => 200,
    }
}

/// Whether `reset_all` may run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetPolicy {
    #[default]
    Disabled,
    Enabled,
}

impl ResetPolicy {
    pub fn from_flag(allowed: bool) -> Self {
        if allowed {
            ResetPolicy::Enabled
        } else {
            ResetPolicy::Disabled
        }
    }
}

/// Outcome of a seeding pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Counters that did not exist and were written
    pub written: usize,
    /// Counters that already existed and were left alone
    pub skipped: usize,
}

pub struct Bootstrap {
    store: Arc<dyn CounterStore>,
    policy: ResetPolicy,
}

impl Bootstrap {
    pub fn new(store: Arc<dyn CounterStore>, policy: ResetPolicy) -> Self {
        Bootstrap { store, policy }
    }

    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    /// Write the baseline for every global counter that is absent
    pub async fn seed_defaults(&self) -> StatsResult<SeedReport> {
        let mut report = SeedReport::default();
        for metric in GlobalMetric::ALL {
            let key = StatsKeyEncoder::global(metric);
            if self.store.set_if_absent(&key, baseline(metric)).await? {
                report.written += 1;
            } else {
                report.skipped += 1;
            }
        }
        info!(
            written = report.written,
            skipped = report.skipped,
            "Seeded global statistics"
        );
        Ok(report)
    }

    /// Set every global counter to zero
    ///
    /// Scoped counters are left untouched.
    pub async fn reset_all(&self) -> StatsResult<()> {
        if self.policy == ResetPolicy::Disabled {
            warn!("Rejected statistics reset: reset is disabled");
            return Err(StatsError::ResetDisabled);
        }

        for metric in GlobalMetric::ALL {
            self.store.set(&StatsKeyEncoder::global(metric), 0).await?;
        }
        warn!("Reset all global statistics to zero");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCounterStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = Arc::new(InMemoryCounterStore::new());
        let bootstrap = Bootstrap::new(store.clone(), ResetPolicy::Disabled);

        let first = bootstrap.seed_defaults().await.unwrap();
        assert_eq!(first, SeedReport { written: 9, skipped: 0 });

        store.increment("stats:total_users", 7).await.unwrap();
        let second = bootstrap.seed_defaults().await.unwrap();
        assert_eq!(second, SeedReport { written: 0, skipped: 9 });
        assert_eq!(store.get("stats:total_users").await.unwrap(), 1507);
    }

    #[tokio::test]
    async fn test_seed_keeps_existing_zero() {
        let store = Arc::new(InMemoryCounterStore::new());
        store.set("stats:total_messages", 0).await.unwrap();

        let report = Bootstrap::new(store.clone(), ResetPolicy::default())
            .seed_defaults()
            .await
            .unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(store.get("stats:total_messages").await.unwrap(), 0);
        assert_eq!(store.get("stats:total_ratings").await.unwrap(), 2500);
    }

    #[tokio::test]
    async fn test_reset_disabled_by_default() {
        let store = Arc::new(InMemoryCounterStore::new());
        let bootstrap = Bootstrap::new(store.clone(), ResetPolicy::default());
        bootstrap.seed_defaults().await.unwrap();

        let err = bootstrap.reset_all().await.unwrap_err();
        assert!(matches!(err, StatsError::ResetDisabled));
        assert_eq!(store.get("stats:total_users").await.unwrap(), 1500);
    }

    #[tokio::test]
    async fn test_reset_enabled_zeroes_globals_only() {
        let store = Arc::new(InMemoryCounterStore::new());
        store.increment("stats:region:CAI:users", 3).await.unwrap();
        let bootstrap = Bootstrap::new(store.clone(), ResetPolicy::from_flag(true));
        bootstrap.seed_defaults().await.unwrap();

        bootstrap.reset_all().await.unwrap();
        for metric in GlobalMetric::ALL {
            let key = StatsKeyEncoder::global(metric);
            assert_eq!(store.get(&key).await.unwrap(), 0);
        }
        assert_eq!(store.get("stats:region:CAI:users").await.unwrap(), 3);
    }
}
