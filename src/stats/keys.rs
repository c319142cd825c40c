//! Key encoding for statistics counters
//!
//! Maps (metric, scope) pairs onto counter store keys.
//!
//! Key formats:
//! - `stats:<metric>` (global, e.g. `stats:total_users`)
//! - `stats:region:<code>:<metric>` (e.g. `stats:region:CAI:users`)
//! - `stats:org:<name>:<metric>` (e.g. `stats:org:Al-Wafd%20Party:members`)
//!
//! Scope identifiers are percent-encoded: everything except ASCII
//! alphanumerics and `-_.~` is escaped, so the `:` delimiter can never appear
//! inside an embedded scope and two different names never share a key.
//! Codes made of plain alphanumerics are embedded unchanged.

use super::types::{GlobalMetric, OrganizationMetric, RegionMetric};

const PREFIX: &str = "stats";
const REGION_SEGMENT: &str = "region";
const ORG_SEGMENT: &str = "org";

/// Dimension a counter is partitioned by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Region(String),
    Organization(String),
}

/// A key taken apart by [`StatsKeyEncoder::decode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub scope: Scope,
    pub metric: String,
}

/// Encodes and decodes statistics keys
pub struct StatsKeyEncoder;

impl StatsKeyEncoder {
    /// Format: `stats:<metric>`
    pub fn global(metric: GlobalMetric) -> String {
        format!("{}:{}", PREFIX, metric.name())
    }

    /// Format: `stats:region:<code>:<metric>`
    pub fn region(code: &str, metric: RegionMetric) -> String {
        format!(
            "{}:{}:{}:{}",
            PREFIX,
            REGION_SEGMENT,
            urlencoding::encode(code),
            metric.name()
        )
    }

    /// Format: `stats:org:<name>:<metric>`
    pub fn organization(name: &str, metric: OrganizationMetric) -> String {
        format!(
            "{}:{}:{}:{}",
            PREFIX,
            ORG_SEGMENT,
            urlencoding::encode(name),
            metric.name()
        )
    }

    /// Decode a key back to its scope and metric name
    ///
    /// Returns None for keys this encoder could not have produced.
    pub fn decode(key: &str) -> Option<DecodedKey> {
        let rest = key.strip_prefix(PREFIX)?.strip_prefix(':')?;
        let parts: Vec<&str> = rest.split(':').collect();

        match parts.as_slice() {
            [metric] if !metric.is_empty() => Some(DecodedKey {
                scope: Scope::Global,
                metric: metric.to_string(),
            }),
            [segment, scope, metric] if !metric.is_empty() => {
                let id = urlencoding::decode(scope).ok()?.into_owned();
                let scope = match *segment {
                    REGION_SEGMENT => Scope::Region(id),
                    ORG_SEGMENT => Scope::Organization(id),
                    _ => return None,
                };
                Some(DecodedKey {
                    scope,
                    metric: metric.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Check if a key belongs to the statistics namespace
    pub fn is_stats_key(key: &str) -> bool {
        key.starts_with("stats:")
    }

    /// Pattern matching every counter of one region
    ///
    /// Returns: `stats:region:<code>:*`
    pub fn region_pattern(code: &str) -> String {
        format!(
            "{}:{}:{}:*",
            PREFIX,
            REGION_SEGMENT,
            urlencoding::encode(code)
        )
    }

    /// Pattern matching every counter of one organization
    ///
    /// Returns: `stats:org:<name>:*`
    pub fn organization_pattern(name: &str) -> String {
        format!("{}:{}:{}:*", PREFIX, ORG_SEGMENT, urlencoding::encode(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_global_keys() {
        assert_eq!(
            StatsKeyEncoder::global(GlobalMetric::TotalUsers),
            "stats:total_users"
        );
        assert_eq!(
            StatsKeyEncoder::global(GlobalMetric::PendingComplaints),
            "stats:pending_complaints"
        );
    }

    #[test]
    fn test_region_key() {
        assert_eq!(
            StatsKeyEncoder::region("CAI", RegionMetric::Users),
            "stats:region:CAI:users"
        );
    }

    #[test]
    fn test_organization_key_escapes_delimiter() {
        let key = StatsKeyEncoder::organization("a:b", OrganizationMetric::Members);
        assert_eq!(key, "stats:org:a%3Ab:members");
    }

    #[test]
    fn test_delimiter_names_do_not_collide() {
        // With raw interpolation both of these become "stats:org:a:b:members"
        // style keys that overlap with other (name, metric) pairs.
        let names = [
            "a",
            "a:b",
            "a:members",
            "a%3Ab",
            "a b",
            "a+b",
            "حزب الوفد",
            "",
            ":",
            "%",
        ];
        let mut keys = HashSet::new();
        for name in names {
            for metric in OrganizationMetric::ALL {
                assert!(
                    keys.insert(StatsKeyEncoder::organization(name, metric)),
                    "collision for {:?} {:?}",
                    name,
                    metric
                );
            }
        }
        assert_eq!(keys.len(), names.len() * OrganizationMetric::ALL.len());
    }

    #[test]
    fn test_decode_organization() {
        let name = "Building: and Development %";
        let key = StatsKeyEncoder::organization(name, OrganizationMetric::RatingsSum);
        let decoded = StatsKeyEncoder::decode(&key).unwrap();
        assert_eq!(decoded.scope, Scope::Organization(name.to_string()));
        assert_eq!(decoded.metric, "ratings_sum");
    }

    #[test]
    fn test_decode_arabic_name() {
        let name = "حزب مستقبل وطن";
        let key = StatsKeyEncoder::organization(name, OrganizationMetric::Candidates);
        assert!(key.is_ascii());
        let decoded = StatsKeyEncoder::decode(&key).unwrap();
        assert_eq!(decoded.scope, Scope::Organization(name.to_string()));
    }

    #[test]
    fn test_decode_global_and_region() {
        let decoded = StatsKeyEncoder::decode("stats:total_users").unwrap();
        assert_eq!(decoded.scope, Scope::Global);
        assert_eq!(decoded.metric, "total_users");

        let decoded = StatsKeyEncoder::decode("stats:region:GIZ:messages").unwrap();
        assert_eq!(decoded.scope, Scope::Region("GIZ".to_string()));
        assert_eq!(decoded.metric, "messages");
    }

    #[test]
    fn test_decode_invalid_key() {
        assert!(StatsKeyEncoder::decode("invalid").is_none());
        assert!(StatsKeyEncoder::decode("metric:c:name:0000").is_none());
        assert!(StatsKeyEncoder::decode("stats:").is_none());
        assert!(StatsKeyEncoder::decode("stats:party:x:members").is_none());
        assert!(StatsKeyEncoder::decode("stats:org:a:b:members").is_none());
    }

    #[test]
    fn test_patterns() {
        assert_eq!(StatsKeyEncoder::region_pattern("CAI"), "stats:region:CAI:*");
        assert_eq!(
            StatsKeyEncoder::organization_pattern("a:b"),
            "stats:org:a%3Ab:*"
        );
        assert!(StatsKeyEncoder::is_stats_key("stats:total_users"));
        assert!(!StatsKeyEncoder::is_stats_key("metric:c:x"));
    }
}
