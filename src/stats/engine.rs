//! Aggregation engine
//!
//! Reads counters through the key encoder and the counter store, assembles
//! them into statistic entities and ranks them.
//!
//! The engine is stateless: it holds only the store handle and the
//! immutable catalog, both fixed at construction. Composite reads issue one
//! `get` per counter without any lock, so a concurrent writer can land
//! between two reads of the same entity; callers get a best-effort snapshot.
//! Store failures abort the current operation, including batch operations,
//! and are returned untranslated.

use super::keys::StatsKeyEncoder;
use super::ranking::{rank_by_count, rank_by_score, take_top};
use super::types::{
    GlobalMetric, OrganizationMetric, OrganizationStatistics, PlatformStatistics, RegionMetric,
    RegionStatistics, StatisticsSummary,
};
use super::{StatsError, StatsResult};
use crate::catalog::{ReferenceCatalog, Region};
use crate::store::CounterStore;
use std::sync::Arc;
use tracing::debug;

/// Lowest and highest score `record_rating` accepts
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Aggregation engine over a counter store
#[derive(Clone)]
pub struct AggregationEngine {
    store: Arc<dyn CounterStore>,
    catalog: Arc<ReferenceCatalog>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn CounterStore>, catalog: Arc<ReferenceCatalog>) -> Self {
        AggregationEngine { store, catalog }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Platform-wide statistics from the nine global counters
    pub async fn platform_statistics(&self) -> StatsResult<PlatformStatistics> {
        let mut stats = PlatformStatistics::default();
        for metric in GlobalMetric::ALL {
            let value = self.store.get(&StatsKeyEncoder::global(metric)).await?;
            stats.set(metric, value);
        }
        debug!(total_users = stats.total_users, "Read platform statistics");
        Ok(stats)
    }

    /// Condensed dashboard view of the platform statistics
    pub async fn statistics_summary(&self) -> StatsResult<StatisticsSummary> {
        Ok(self.platform_statistics().await?.summary())
    }

    /// Statistics for one region
    ///
    /// Fails with `EntityNotFound` when the code is not in the catalog. A
    /// known region with no recorded activity reads as all zeros.
    pub async fn region_statistics(&self, code: &str) -> StatsResult<RegionStatistics> {
        let region = self.catalog.find_region(code)?;
        self.read_region(region).await
    }

    async fn read_region(&self, region: &Region) -> StatsResult<RegionStatistics> {
        let mut stats = RegionStatistics::empty(&region.code, &region.name);
        for metric in RegionMetric::ALL {
            let key = StatsKeyEncoder::region(&region.code, metric);
            stats.set(metric, self.store.get(&key).await?);
        }
        Ok(stats)
    }

    /// Statistics for one organization; any name is accepted
    pub async fn organization_statistics(
        &self,
        name: &str,
    ) -> StatsResult<OrganizationStatistics> {
        let read = |metric| {
            let key = StatsKeyEncoder::organization(name, metric);
            async move { self.store.get(&key).await }
        };

        let candidates = read(OrganizationMetric::Candidates).await?;
        let members = read(OrganizationMetric::Members).await?;
        let ratings_sum = read(OrganizationMetric::RatingsSum).await?;
        let ratings_count = read(OrganizationMetric::RatingsCount).await?;

        Ok(OrganizationStatistics::from_counters(
            name,
            candidates,
            members,
            ratings_sum,
            ratings_count,
        ))
    }

    /// Statistics for every catalog region, in catalog order
    ///
    /// Regions without counters are included with zero counts. The first
    /// store failure aborts the whole batch.
    pub async fn all_region_statistics(&self) -> StatsResult<Vec<RegionStatistics>> {
        let mut all = Vec::with_capacity(self.catalog.regions().len());
        for region in self.catalog.regions() {
            all.push(self.read_region(region).await?);
        }
        debug!(regions = all.len(), "Read all region statistics");
        Ok(all)
    }

    /// Every region, most active first; ties keep catalog order
    pub async fn ranked_region_statistics(&self) -> StatsResult<Vec<RegionStatistics>> {
        let mut all = self.all_region_statistics().await?;
        rank_by_score(&mut all, RegionStatistics::activity_score);
        Ok(all)
    }

    /// Rank `candidates` by total representation and keep the top `limit`
    ///
    /// Ties keep input order. A zero or negative limit yields an empty list
    /// without touching the store; a limit above the candidate count yields
    /// every candidate.
    pub async fn top_organizations<S: AsRef<str>>(
        &self,
        candidates: &[S],
        limit: i64,
    ) -> StatsResult<Vec<OrganizationStatistics>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let mut all = Vec::with_capacity(candidates.len());
        for name in candidates {
            all.push(self.organization_statistics(name.as_ref()).await?);
        }
        rank_by_count(&mut all, OrganizationStatistics::total_representation);
        debug!(
            candidates = candidates.len(),
            limit, "Ranked organizations by representation"
        );
        Ok(take_top(all, limit))
    }

    /// Top organizations drawn from the catalog, in catalog order before ranking
    pub async fn top_catalog_organizations(
        &self,
        limit: i64,
    ) -> StatsResult<Vec<OrganizationStatistics>> {
        let names = self.catalog.organization_names();
        self.top_organizations(&names, limit).await
    }

    /// Atomically add to a global counter, returning the new value
    pub async fn increment_global(&self, metric: GlobalMetric, amount: i64) -> StatsResult<i64> {
        let value = self
            .store
            .increment(&StatsKeyEncoder::global(metric), amount)
            .await?;
        Ok(value)
    }

    /// Overwrite a global counter
    pub async fn set_global(&self, metric: GlobalMetric, value: i64) -> StatsResult<()> {
        self.store
            .set(&StatsKeyEncoder::global(metric), value)
            .await?;
        Ok(())
    }

    /// Atomically add to a region counter; the code must be in the catalog
    pub async fn increment_region(
        &self,
        code: &str,
        metric: RegionMetric,
        amount: i64,
    ) -> StatsResult<i64> {
        let region = self.catalog.find_region(code)?;
        let key = StatsKeyEncoder::region(&region.code, metric);
        Ok(self.store.increment(&key, amount).await?)
    }

    /// Atomically add to an organization counter
    pub async fn increment_organization(
        &self,
        name: &str,
        metric: OrganizationMetric,
        amount: i64,
    ) -> StatsResult<i64> {
        let key = StatsKeyEncoder::organization(name, metric);
        Ok(self.store.increment(&key, amount).await?)
    }

    /// Record one rating for an organization and return the running average
    ///
    /// The sum and the count are two separate atomic increments; a reader
    /// between them may see the new sum with the old count.
    pub async fn record_rating(&self, name: &str, score: i64) -> StatsResult<f64> {
        if !RATING_RANGE.contains(&score) {
            return Err(StatsError::InvalidArgument(format!(
                "rating {} outside {}..={}",
                score,
                RATING_RANGE.start(),
                RATING_RANGE.end()
            )));
        }

        let sum = self
            .increment_organization(name, OrganizationMetric::RatingsSum, score)
            .await?;
        let count = self
            .increment_organization(name, OrganizationMetric::RatingsCount, 1)
            .await?;

        Ok(OrganizationStatistics::from_counters(name, 0, 0, sum, count).ratings_average)
    }

    /// Verify the counter store answers
    pub async fn ping_store(&self) -> StatsResult<()> {
        self.store.ping().await?;
        Ok(())
    }
}
