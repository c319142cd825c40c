//! Statistic entities and the counters they are built from

use serde::{Deserialize, Serialize};

/// Platform-wide counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalMetric {
    TotalUsers,
    TotalCitizens,
    TotalCandidates,
    TotalMembers,
    TotalMessages,
    TotalComplaints,
    TotalRatings,
    ResolvedComplaints,
    PendingComplaints,
}

impl GlobalMetric {
    /// Every global counter, in the order they are read
    pub const ALL: [GlobalMetric; 9] = [
        GlobalMetric::TotalUsers,
        GlobalMetric::TotalCitizens,
        GlobalMetric::TotalCandidates,
        GlobalMetric::TotalMembers,
        GlobalMetric::TotalMessages,
        GlobalMetric::TotalComplaints,
        GlobalMetric::TotalRatings,
        GlobalMetric::ResolvedComplaints,
        GlobalMetric::PendingComplaints,
    ];

    /// Name used in store keys
    pub fn name(&self) -> &'static str {
        match self {
            GlobalMetric::TotalUsers => "total_users",
            GlobalMetric::TotalCitizens => "total_citizens",
            GlobalMetric::TotalCandidates => "total_candidates",
            GlobalMetric::TotalMembers => "total_members",
            GlobalMetric::TotalMessages => "total_messages",
            GlobalMetric::TotalComplaints => "total_complaints",
            GlobalMetric::TotalRatings => "total_ratings",
            GlobalMetric::ResolvedComplaints => "resolved_complaints",
            GlobalMetric::PendingComplaints => "pending_complaints",
        }
    }

    pub fn from_name(name: &str) -> Option<GlobalMetric> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Counter partitioned by region code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionMetric {
    Users,
    Complaints,
    Messages,
}

impl RegionMetric {
    pub const ALL: [RegionMetric; 3] = [
        RegionMetric::Users,
        RegionMetric::Complaints,
        RegionMetric::Messages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RegionMetric::Users => "users",
            RegionMetric::Complaints => "complaints",
            RegionMetric::Messages => "messages",
        }
    }

    pub fn from_name(name: &str) -> Option<RegionMetric> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Counter partitioned by organization name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationMetric {
    Candidates,
    Members,
    /// Running sum of all rating scores received
    RatingsSum,
    /// Running count of ratings received
    RatingsCount,
}

impl OrganizationMetric {
    pub const ALL: [OrganizationMetric; 4] = [
        OrganizationMetric::Candidates,
        OrganizationMetric::Members,
        OrganizationMetric::RatingsSum,
        OrganizationMetric::RatingsCount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OrganizationMetric::Candidates => "candidates",
            OrganizationMetric::Members => "members",
            OrganizationMetric::RatingsSum => "ratings_sum",
            OrganizationMetric::RatingsCount => "ratings_count",
        }
    }

    pub fn from_name(name: &str) -> Option<OrganizationMetric> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// `numerator / denominator`, 0.0 when the denominator is zero
fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Round to a fixed number of decimal places for display
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Platform-wide statistics
///
/// Rebuilt from the nine global counters on every read. The complaint
/// counters are maintained independently upstream, so
/// `resolved + pending <= total` is not guaranteed and is left as read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStatistics {
    pub total_users: i64,
    pub total_citizens: i64,
    pub total_candidates: i64,
    pub total_members: i64,
    pub total_messages: i64,
    pub total_complaints: i64,
    pub total_ratings: i64,
    pub resolved_complaints: i64,
    pub pending_complaints: i64,
}

impl PlatformStatistics {
    /// Assign the value read for one counter
    pub fn set(&mut self, metric: GlobalMetric, value: i64) {
        let slot = match metric {
            GlobalMetric::TotalUsers => &mut self.total_users,
            GlobalMetric::TotalCitizens => &mut self.total_citizens,
            GlobalMetric::TotalCandidates => &mut self.total_candidates,
            GlobalMetric::TotalMembers => &mut self.total_members,
            GlobalMetric::TotalMessages => &mut self.total_messages,
            GlobalMetric::TotalComplaints => &mut self.total_complaints,
            GlobalMetric::TotalRatings => &mut self.total_ratings,
            GlobalMetric::ResolvedComplaints => &mut self.resolved_complaints,
            GlobalMetric::PendingComplaints => &mut self.pending_complaints,
        };
        *slot = value;
    }

    pub fn get(&self, metric: GlobalMetric) -> i64 {
        match metric {
            GlobalMetric::TotalUsers => self.total_users,
            GlobalMetric::TotalCitizens => self.total_citizens,
            GlobalMetric::TotalCandidates => self.total_candidates,
            GlobalMetric::TotalMembers => self.total_members,
            GlobalMetric::TotalMessages => self.total_messages,
            GlobalMetric::TotalComplaints => self.total_complaints,
            GlobalMetric::TotalRatings => self.total_ratings,
            GlobalMetric::ResolvedComplaints => self.resolved_complaints,
            GlobalMetric::PendingComplaints => self.pending_complaints,
        }
    }

    /// Resolved complaints as a percentage of all complaints (0-100)
    pub fn complaint_resolution_rate(&self) -> f64 {
        ratio(self.resolved_complaints, self.total_complaints) * 100.0
    }

    /// Messages and ratings per user
    pub fn user_engagement_score(&self) -> f64 {
        ratio(
            self.total_messages.saturating_add(self.total_ratings),
            self.total_users,
        )
    }

    /// Condensed dashboard view
    pub fn summary(&self) -> StatisticsSummary {
        StatisticsSummary {
            total_users: self.total_users,
            total_complaints: self.total_complaints,
            complaint_resolution_rate: round_to(self.complaint_resolution_rate(), 1),
            user_engagement_score: round_to(self.user_engagement_score(), 1),
            active_candidates: self.total_candidates,
            platform_activity: PlatformActivity {
                messages: self.total_messages,
                ratings: self.total_ratings,
            },
        }
    }
}

/// Key platform metrics for quick dashboard displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_users: i64,
    pub total_complaints: i64,
    pub complaint_resolution_rate: f64,
    pub user_engagement_score: f64,
    pub active_candidates: i64,
    pub platform_activity: PlatformActivity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformActivity {
    pub messages: i64,
    pub ratings: i64,
}

/// Statistics for one region of the reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStatistics {
    pub region_code: String,
    pub region_name: String,
    pub users_count: i64,
    pub complaints_count: i64,
    pub messages_count: i64,
}

impl RegionStatistics {
    /// Zero-filled statistics for a region with no recorded activity
    pub fn empty(region_code: impl Into<String>, region_name: impl Into<String>) -> Self {
        RegionStatistics {
            region_code: region_code.into(),
            region_name: region_name.into(),
            users_count: 0,
            complaints_count: 0,
            messages_count: 0,
        }
    }

    pub fn set(&mut self, metric: RegionMetric, value: i64) {
        match metric {
            RegionMetric::Users => self.users_count = value,
            RegionMetric::Complaints => self.complaints_count = value,
            RegionMetric::Messages => self.messages_count = value,
        }
    }

    pub fn complaints_per_user(&self) -> f64 {
        ratio(self.complaints_count, self.users_count)
    }

    /// (messages + complaints) per user
    pub fn activity_score(&self) -> f64 {
        ratio(
            self.messages_count.saturating_add(self.complaints_count),
            self.users_count,
        )
    }

    /// Flat view with derived metrics rounded to two places
    pub fn to_report(&self) -> RegionReport {
        RegionReport {
            region_code: self.region_code.clone(),
            region_name: self.region_name.clone(),
            users_count: self.users_count,
            complaints_count: self.complaints_count,
            messages_count: self.messages_count,
            complaints_per_user: round_to(self.complaints_per_user(), 2),
            activity_score: round_to(self.activity_score(), 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionReport {
    pub region_code: String,
    pub region_name: String,
    pub users_count: i64,
    pub complaints_count: i64,
    pub messages_count: i64,
    pub complaints_per_user: f64,
    pub activity_score: f64,
}

/// Rating bands, closed below
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingCategory {
    Excellent,
    Good,
    Average,
    Poor,
}

impl RatingCategory {
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            RatingCategory::Excellent
        } else if average >= 3.5 {
            RatingCategory::Good
        } else if average >= 2.5 {
            RatingCategory::Average
        } else {
            RatingCategory::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingCategory::Excellent => "excellent",
            RatingCategory::Good => "good",
            RatingCategory::Average => "average",
            RatingCategory::Poor => "poor",
        }
    }
}

impl std::fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics for one organization
///
/// Organizations are not validated against the catalog; an unknown name
/// simply reads as all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationStatistics {
    pub organization_name: String,
    pub candidates_count: i64,
    pub members_count: i64,
    pub ratings_average: f64,
}

impl OrganizationStatistics {
    /// Build from raw counters; the average is `sum / count`, 0.0 with no ratings
    pub fn from_counters(
        organization_name: impl Into<String>,
        candidates_count: i64,
        members_count: i64,
        ratings_sum: i64,
        ratings_count: i64,
    ) -> Self {
        OrganizationStatistics {
            organization_name: organization_name.into(),
            candidates_count,
            members_count,
            ratings_average: ratio(ratings_sum, ratings_count),
        }
    }

    pub fn total_representation(&self) -> i64 {
        self.candidates_count.saturating_add(self.members_count)
    }

    pub fn rating_category(&self) -> RatingCategory {
        RatingCategory::from_average(self.ratings_average)
    }

    pub fn to_report(&self) -> OrganizationReport {
        OrganizationReport {
            organization_name: self.organization_name.clone(),
            candidates_count: self.candidates_count,
            members_count: self.members_count,
            ratings_average: round_to(self.ratings_average, 2),
            total_representation: self.total_representation(),
            rating_category: self.rating_category(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationReport {
    pub organization_name: String,
    pub candidates_count: i64,
    pub members_count: i64,
    pub ratings_average: f64,
    pub total_representation: i64,
    pub rating_category: RatingCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_roundtrip() {
        for metric in GlobalMetric::ALL {
            assert_eq!(GlobalMetric::from_name(metric.name()), Some(metric));
        }
        for metric in RegionMetric::ALL {
            assert_eq!(RegionMetric::from_name(metric.name()), Some(metric));
        }
        for metric in OrganizationMetric::ALL {
            assert_eq!(OrganizationMetric::from_name(metric.name()), Some(metric));
        }
        assert_eq!(GlobalMetric::from_name("total_visitors"), None);
    }

    #[test]
    fn test_region_ratios_zero_users() {
        let mut stats = RegionStatistics::empty("CAI", "Cairo");
        stats.set(RegionMetric::Complaints, 40);
        stats.set(RegionMetric::Messages, 60);
        assert_eq!(stats.complaints_per_user(), 0.0);
        assert_eq!(stats.activity_score(), 0.0);

        stats.set(RegionMetric::Users, 20);
        assert_eq!(stats.complaints_per_user(), 2.0);
        assert_eq!(stats.activity_score(), 5.0);
    }

    #[test]
    fn test_rating_category_boundaries() {
        assert_eq!(RatingCategory::from_average(5.0), RatingCategory::Excellent);
        assert_eq!(RatingCategory::from_average(4.5), RatingCategory::Excellent);
        assert_eq!(RatingCategory::from_average(4.49999), RatingCategory::Good);
        assert_eq!(RatingCategory::from_average(3.5), RatingCategory::Good);
        assert_eq!(RatingCategory::from_average(2.5), RatingCategory::Average);
        assert_eq!(RatingCategory::from_average(2.49999), RatingCategory::Poor);
        assert_eq!(RatingCategory::from_average(0.0), RatingCategory::Poor);
    }

    #[test]
    fn test_organization_average() {
        let stats = OrganizationStatistics::from_counters("Independent", 3, 4, 18, 4);
        assert_eq!(stats.ratings_average, 4.5);
        assert_eq!(stats.total_representation(), 7);
        assert_eq!(stats.rating_category(), RatingCategory::Excellent);

        let unrated = OrganizationStatistics::from_counters("Independent", 0, 0, 0, 0);
        assert_eq!(unrated.ratings_average, 0.0);
        assert_eq!(unrated.rating_category(), RatingCategory::Poor);
    }

    #[test]
    fn test_platform_derived_metrics() {
        let mut stats = PlatformStatistics::default();
        assert_eq!(stats.complaint_resolution_rate(), 0.0);
        assert_eq!(stats.user_engagement_score(), 0.0);

        stats.set(GlobalMetric::TotalUsers, 1500);
        stats.set(GlobalMetric::TotalMessages, 5000);
        stats.set(GlobalMetric::TotalRatings, 2500);
        stats.set(GlobalMetric::TotalComplaints, 800);
        stats.set(GlobalMetric::ResolvedComplaints, 600);
        assert_eq!(stats.user_engagement_score(), 5.0);
        assert_eq!(stats.complaint_resolution_rate(), 75.0);
        assert_eq!(stats.get(GlobalMetric::TotalUsers), 1500);
    }

    #[test]
    fn test_inconsistent_complaints_left_alone() {
        let mut stats = PlatformStatistics::default();
        stats.set(GlobalMetric::TotalComplaints, 10);
        stats.set(GlobalMetric::ResolvedComplaints, 8);
        stats.set(GlobalMetric::PendingComplaints, 8);
        assert_eq!(stats.resolved_complaints + stats.pending_complaints, 16);
        assert_eq!(stats.complaint_resolution_rate(), 80.0);
    }

    #[test]
    fn test_report_serialization() {
        let mut stats = RegionStatistics::empty("GIZ", "Giza");
        stats.set(RegionMetric::Users, 3);
        stats.set(RegionMetric::Complaints, 1);
        let json = serde_json::to_value(stats.to_report()).unwrap();
        assert_eq!(json["region_code"], "GIZ");
        assert_eq!(json["complaints_per_user"], 0.33);

        let org = OrganizationStatistics::from_counters("Al-Wafd Party", 1, 2, 7, 2);
        let json = serde_json::to_value(org.to_report()).unwrap();
        assert_eq!(json["rating_category"], "good");
        assert_eq!(json["total_representation"], 3);
    }

    #[test]
    fn test_summary_rounding() {
        let stats = PlatformStatistics {
            total_users: 3,
            total_messages: 1,
            total_complaints: 3,
            resolved_complaints: 1,
            ..Default::default()
        };
        let summary = stats.summary();
        assert_eq!(summary.user_engagement_score, 0.3);
        assert_eq!(summary.complaint_resolution_rate, 33.3);
    }
}
