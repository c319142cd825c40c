//! Statistics command handling
//!
//! Text commands understood by the statistics server:
//! - Reads: PING, HEALTH, OVERALL, SUMMARY, REGION, REGIONS, ORG, TOPORGS
//! - Reference data: CATALOG <table>
//! - Writes: INCR, INCRREGION, INCRORG, RATE
//! - Admin: SEED, RESET, CONFIG
//!
//! Every reply is a single JSON document.

use super::bootstrap::Bootstrap;
use super::engine::AggregationEngine;
use super::types::{round_to, GlobalMetric, OrganizationMetric, RegionMetric};
use super::{StatsError, StatsResult};
use serde_json::{json, Value};
use tracing::debug;

/// Reference table selectable with `CATALOG`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Regions,
    Organizations,
    UserTypes,
    Councils,
    ComplaintCategories,
    ComplaintStatuses,
    NotificationTypes,
}

impl CatalogTable {
    pub fn from_name(name: &str) -> Option<CatalogTable> {
        match name.to_lowercase().as_str() {
            "regions" => Some(CatalogTable::Regions),
            "organizations" | "orgs" => Some(CatalogTable::Organizations),
            "user-types" => Some(CatalogTable::UserTypes),
            "councils" => Some(CatalogTable::Councils),
            "complaint-categories" => Some(CatalogTable::ComplaintCategories),
            "complaint-statuses" => Some(CatalogTable::ComplaintStatuses),
            "notification-types" => Some(CatalogTable::NotificationTypes),
            _ => None,
        }
    }
}

/// Statistics command types
#[derive(Debug, Clone, PartialEq)]
pub enum StatsCommand {
    /// PING
    Ping,
    /// HEALTH: store round-trip
    Health,
    /// OVERALL: platform statistics with derived metrics
    Overall,
    /// SUMMARY: condensed dashboard view
    Summary,
    /// REGION <code>
    Region { code: String },
    /// REGIONS [RANKED]
    Regions { ranked: bool },
    /// ORG <name...>
    Organization { name: String },
    /// TOPORGS [limit]
    TopOrganizations { limit: Option<i64> },
    /// CATALOG <table>
    Catalog { table: CatalogTable },
    /// INCR <metric> [amount]
    Increment { metric: GlobalMetric, amount: i64 },
    /// INCRREGION <code> <metric> [amount]
    IncrementRegion {
        code: String,
        metric: RegionMetric,
        amount: i64,
    },
    /// INCRORG <name...> <metric> [amount]
    IncrementOrganization {
        name: String,
        metric: OrganizationMetric,
        amount: i64,
    },
    /// RATE <name...> <score>
    Rate { name: String, score: i64 },
    /// SEED
    Seed,
    /// RESET
    Reset,
    /// CONFIG
    Config,
}

fn invalid(msg: impl Into<String>) -> StatsError {
    StatsError::InvalidArgument(msg.into())
}

fn parse_integer(value: &str, what: &str) -> StatsResult<i64> {
    value
        .parse()
        .map_err(|_| invalid(format!("{} must be an integer, got '{}'", what, value)))
}

/// Optional trailing amount, 1 when absent
fn parse_amount(arg: Option<&String>) -> StatsResult<i64> {
    arg.map_or(Ok(1), |a| parse_integer(a, "amount"))
}

impl StatsCommand {
    /// Parse command from RESP-style arguments
    pub fn parse(args: &[String]) -> StatsResult<StatsCommand> {
        if args.is_empty() {
            return Err(invalid("No command provided"));
        }

        let cmd = args[0].to_uppercase();
        let args = &args[1..];

        match cmd.as_str() {
            "PING" => Ok(StatsCommand::Ping),
            "HEALTH" => Ok(StatsCommand::Health),
            "OVERALL" => Ok(StatsCommand::Overall),
            "SUMMARY" => Ok(StatsCommand::Summary),
            "REGION" => {
                let code = args.first().ok_or_else(|| invalid("REGION requires a code"))?;
                Ok(StatsCommand::Region {
                    code: code.to_uppercase(),
                })
            }
            "REGIONS" => Self::parse_regions(args),
            "ORG" => {
                if args.is_empty() {
                    return Err(invalid("ORG requires an organization name"));
                }
                Ok(StatsCommand::Organization {
                    name: args.join(" "),
                })
            }
            "TOPORGS" => {
                let limit = args
                    .first()
                    .map(|l| parse_integer(l, "limit"))
                    .transpose()?;
                Ok(StatsCommand::TopOrganizations { limit })
            }
            "CATALOG" => {
                let name = args
                    .first()
                    .ok_or_else(|| invalid("CATALOG requires a table name"))?;
                let table = CatalogTable::from_name(name)
                    .ok_or_else(|| invalid(format!("Unknown catalog table: {}", name)))?;
                Ok(StatsCommand::Catalog { table })
            }
            "INCR" => Self::parse_increment(args),
            "INCRREGION" => Self::parse_increment_region(args),
            "INCRORG" => Self::parse_increment_organization(args),
            "RATE" => Self::parse_rate(args),
            "SEED" => Ok(StatsCommand::Seed),
            "RESET" => Ok(StatsCommand::Reset),
            "CONFIG" => Ok(StatsCommand::Config),
            _ => Err(invalid(format!("Unknown command: {}", cmd))),
        }
    }

    fn parse_regions(args: &[String]) -> StatsResult<StatsCommand> {
        match args.first().map(|a| a.to_uppercase()) {
            None => Ok(StatsCommand::Regions { ranked: false }),
            Some(flag) if flag == "RANKED" => Ok(StatsCommand::Regions { ranked: true }),
            Some(flag) => Err(invalid(format!("Unknown REGIONS option: {}", flag))),
        }
    }

    fn parse_increment(args: &[String]) -> StatsResult<StatsCommand> {
        let name = args.first().ok_or_else(|| invalid("INCR requires a metric"))?;
        let metric = GlobalMetric::from_name(name)
            .ok_or_else(|| invalid(format!("Unknown global metric: {}", name)))?;
        let amount = parse_amount(args.get(1))?;
        Ok(StatsCommand::Increment { metric, amount })
    }

    fn parse_increment_region(args: &[String]) -> StatsResult<StatsCommand> {
        if args.len() < 2 {
            return Err(invalid("INCRREGION requires a region code and metric"));
        }
        let metric = RegionMetric::from_name(&args[1])
            .ok_or_else(|| invalid(format!("Unknown region metric: {}", args[1])))?;
        let amount = parse_amount(args.get(2))?;
        Ok(StatsCommand::IncrementRegion {
            code: args[0].to_uppercase(),
            metric,
            amount,
        })
    }

    /// `INCRORG <name...> <metric> [amount]`
    ///
    /// The name may span several words; metric and amount are taken from
    /// the end of the arguments.
    fn parse_increment_organization(args: &[String]) -> StatsResult<StatsCommand> {
        let (metric, amount, name) = match args {
            [name @ .., metric]
                if !name.is_empty() && OrganizationMetric::from_name(metric).is_some() =>
            {
                (metric, None, name)
            }
            [name @ .., metric, amount] if !name.is_empty() => (metric, Some(amount), name),
            _ => return Err(invalid("INCRORG requires an organization name and metric")),
        };
        let metric = OrganizationMetric::from_name(metric)
            .ok_or_else(|| invalid(format!("Unknown organization metric: {}", metric)))?;
        Ok(StatsCommand::IncrementOrganization {
            name: name.join(" "),
            metric,
            amount: parse_amount(amount)?,
        })
    }

    fn parse_rate(args: &[String]) -> StatsResult<StatsCommand> {
        let (score, name) = match args.split_last() {
            Some((score, name)) if !name.is_empty() => (score, name),
            _ => return Err(invalid("RATE requires an organization name and score")),
        };
        Ok(StatsCommand::Rate {
            name: name.join(" "),
            score: parse_integer(score, "score")?,
        })
    }

    /// Whether the command changes counters
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StatsCommand::Increment { .. }
                | StatsCommand::IncrementRegion { .. }
                | StatsCommand::IncrementOrganization { .. }
                | StatsCommand::Rate { .. }
                | StatsCommand::Seed
                | StatsCommand::Reset
        )
    }
}

/// Render a command outcome as one JSON line (without the newline)
///
/// Errors become `{"error": <message>, "kind": <kind>}`.
pub fn render_reply(result: &StatsResult<Value>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => json!({ "error": e.to_string(), "kind": e.kind() }).to_string(),
    }
}

/// Executor for statistics commands
pub struct StatsCommandExecutor {
    engine: AggregationEngine,
    bootstrap: Bootstrap,
    default_top_limit: i64,
    config_report: Value,
}

impl StatsCommandExecutor {
    pub fn new(engine: AggregationEngine, bootstrap: Bootstrap, default_top_limit: i64) -> Self {
        StatsCommandExecutor {
            engine,
            bootstrap,
            default_top_limit,
            config_report: Value::Null,
        }
    }

    /// Set the document returned by CONFIG
    pub fn with_config_report(mut self, report: Value) -> Self {
        self.config_report = report;
        self
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    /// Execute a statistics command
    pub async fn execute(&self, cmd: StatsCommand) -> StatsResult<Value> {
        debug!(command = ?cmd, "Executing statistics command");

        match cmd {
            StatsCommand::Ping => Ok(json!("PONG")),

            StatsCommand::Health => Ok(match self.engine.ping_store().await {
                Ok(()) => json!({ "status": "healthy", "store": "ok" }),
                Err(e) => json!({ "status": "unhealthy", "store": e.to_string() }),
            }),

            StatsCommand::Overall => {
                let stats = self.engine.platform_statistics().await?;
                let mut value = json!(stats);
                if let Value::Object(ref mut map) = value {
                    map.insert(
                        "complaint_resolution_rate".to_string(),
                        json!(round_to(stats.complaint_resolution_rate(), 1)),
                    );
                    map.insert(
                        "user_engagement_score".to_string(),
                        json!(round_to(stats.user_engagement_score(), 1)),
                    );
                }
                Ok(value)
            }

            StatsCommand::Summary => Ok(json!(self.engine.statistics_summary().await?)),

            StatsCommand::Region { code } => {
                let stats = self.engine.region_statistics(&code).await?;
                Ok(json!(stats.to_report()))
            }

            StatsCommand::Regions { ranked } => {
                let all = if ranked {
                    self.engine.ranked_region_statistics().await?
                } else {
                    self.engine.all_region_statistics().await?
                };
                let reports: Vec<_> = all.iter().map(|s| s.to_report()).collect();
                Ok(json!(reports))
            }

            StatsCommand::Organization { name } => {
                let stats = self.engine.organization_statistics(&name).await?;
                Ok(json!(stats.to_report()))
            }

            StatsCommand::TopOrganizations { limit } => {
                let limit = limit.unwrap_or(self.default_top_limit);
                let top = self.engine.top_catalog_organizations(limit).await?;
                let reports: Vec<_> = top.iter().map(|s| s.to_report()).collect();
                Ok(json!(reports))
            }

            StatsCommand::Catalog { table } => Ok(self.catalog_table(table)),

            StatsCommand::Increment { metric, amount } => {
                let value = self.engine.increment_global(metric, amount).await?;
                Ok(json!({ "metric": metric.name(), "value": value }))
            }

            StatsCommand::IncrementRegion {
                code,
                metric,
                amount,
            } => {
                let value = self.engine.increment_region(&code, metric, amount).await?;
                Ok(json!({ "region_code": code, "metric": metric.name(), "value": value }))
            }

            StatsCommand::IncrementOrganization {
                name,
                metric,
                amount,
            } => {
                let value = self
                    .engine
                    .increment_organization(&name, metric, amount)
                    .await?;
                Ok(json!({ "organization_name": name, "metric": metric.name(), "value": value }))
            }

            StatsCommand::Rate { name, score } => {
                let average = self.engine.record_rating(&name, score).await?;
                Ok(json!({
                    "organization_name": name,
                    "ratings_average": round_to(average, 2),
                }))
            }

            StatsCommand::Seed => Ok(json!(self.bootstrap.seed_defaults().await?)),

            StatsCommand::Reset => {
                self.bootstrap.reset_all().await?;
                Ok(json!({ "reset": true }))
            }

            StatsCommand::Config => Ok(self.config_report.clone()),
        }
    }

    fn catalog_table(&self, table: CatalogTable) -> Value {
        let catalog = self.engine.catalog();
        match table {
            CatalogTable::Regions => json!(catalog.regions()),
            CatalogTable::Organizations => json!(catalog.organizations()),
            CatalogTable::UserTypes => json!(catalog.user_types()),
            CatalogTable::Councils => json!(catalog.council_types()),
            CatalogTable::ComplaintCategories => json!(catalog.complaint_categories()),
            CatalogTable::ComplaintStatuses => json!(catalog.complaint_statuses()),
            CatalogTable::NotificationTypes => json!(catalog.notification_types()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceCatalog;
    use crate::stats::ResetPolicy;
    use crate::store::{CounterStore, InMemoryCounterStore};
    use std::sync::Arc;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn executor(policy: ResetPolicy) -> StatsCommandExecutor {
        let store: Arc<dyn CounterStore> = Arc::new(InMemoryCounterStore::new());
        let catalog = Arc::new(ReferenceCatalog::builtin().unwrap());
        let engine = AggregationEngine::new(store.clone(), catalog);
        StatsCommandExecutor::new(engine, Bootstrap::new(store, policy), 3)
    }

    #[test]
    fn test_parse_increment() {
        let cmd = StatsCommand::parse(&args("incr total_users 5")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::Increment {
                metric: GlobalMetric::TotalUsers,
                amount: 5
            }
        );

        let cmd = StatsCommand::parse(&args("INCR total_messages")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::Increment {
                metric: GlobalMetric::TotalMessages,
                amount: 1
            }
        );
        assert!(cmd.is_write());
    }

    #[test]
    fn test_parse_errors() {
        assert!(StatsCommand::parse(&[]).is_err());
        assert!(StatsCommand::parse(&args("INCR total_visitors")).is_err());
        assert!(StatsCommand::parse(&args("INCR total_users many")).is_err());
        assert!(StatsCommand::parse(&args("INCRREGION CAI")).is_err());
        assert!(StatsCommand::parse(&args("CATALOG planets")).is_err());
        assert!(StatsCommand::parse(&args("RATE 5")).is_err());
        assert!(StatsCommand::parse(&args("FLUSHALL")).is_err());

        let err = StatsCommand::parse(&args("TOPORGS ten")).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn test_parse_multi_word_names() {
        let cmd = StatsCommand::parse(&args("ORG Al Wafd Party")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::Organization {
                name: "Al Wafd Party".to_string()
            }
        );

        let cmd = StatsCommand::parse(&args("RATE Al Wafd Party 4")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::Rate {
                name: "Al Wafd Party".to_string(),
                score: 4
            }
        );
    }

    #[test]
    fn test_parse_increment_organization_multi_word() {
        let cmd = StatsCommand::parse(&args("INCRORG Al Wafd Party members")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::IncrementOrganization {
                name: "Al Wafd Party".to_string(),
                metric: OrganizationMetric::Members,
                amount: 1
            }
        );

        let cmd = StatsCommand::parse(&args("INCRORG Al Wafd Party candidates 3")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::IncrementOrganization {
                name: "Al Wafd Party".to_string(),
                metric: OrganizationMetric::Candidates,
                amount: 3
            }
        );

        let cmd = StatsCommand::parse(&args("INCRORG Independent members 2")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::IncrementOrganization {
                name: "Independent".to_string(),
                metric: OrganizationMetric::Members,
                amount: 2
            }
        );

        assert!(StatsCommand::parse(&args("INCRORG members")).is_err());
        assert!(StatsCommand::parse(&args("INCRORG Al Wafd Party")).is_err());
        assert!(StatsCommand::parse(&args("INCRORG Al Wafd members x")).is_err());
    }

    #[test]
    fn test_parse_region_code_normalized() {
        let cmd = StatsCommand::parse(&args("region cai")).unwrap();
        assert_eq!(
            cmd,
            StatsCommand::Region {
                code: "CAI".to_string()
            }
        );
        assert!(!cmd.is_write());
    }

    #[test]
    fn test_render_error_reply() {
        let reply = render_reply(&Err(StatsError::region_not_found("ZZZ")));
        let value: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["kind"], "not_found");
        assert_eq!(value["error"], "region not found: ZZZ");
    }

    #[tokio::test]
    async fn test_execute_overall_after_seed() {
        let executor = executor(ResetPolicy::Disabled);
        executor.execute(StatsCommand::Seed).await.unwrap();

        let value = executor.execute(StatsCommand::Overall).await.unwrap();
        assert_eq!(value["total_users"], 1500);
        assert_eq!(value["user_engagement_score"], 5.0);
        assert_eq!(value["complaint_resolution_rate"], 75.0);
    }

    #[tokio::test]
    async fn test_execute_top_orgs_default_limit() {
        let executor = executor(ResetPolicy::Disabled);
        let value = executor
            .execute(StatsCommand::TopOrganizations { limit: None })
            .await
            .unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);

        let value = executor
            .execute(StatsCommand::TopOrganizations { limit: Some(-1) })
            .await
            .unwrap();
        assert!(value.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_reset_disabled() {
        let executor = executor(ResetPolicy::Disabled);
        let err = executor.execute(StatsCommand::Reset).await.unwrap_err();
        assert_eq!(err.kind(), "reset_disabled");
    }

    #[tokio::test]
    async fn test_execute_catalog() {
        let executor = executor(ResetPolicy::Disabled);
        let value = executor
            .execute(StatsCommand::Catalog {
                table: CatalogTable::Councils,
            })
            .await
            .unwrap();
        assert_eq!(value[1]["total_seats"], 300);
    }

    #[tokio::test]
    async fn test_execute_health() {
        let executor = executor(ResetPolicy::Disabled);
        let value = executor.execute(StatsCommand::Health).await.unwrap();
        assert_eq!(value["status"], "healthy");
    }
}
