//! Statistics errors
//!
//! Three outcomes reach callers: success, `EntityNotFound` for an unknown
//! scope identifier, and `StoreUnavailable` when the counter store fails.

use crate::store::StoreError;

/// Error returned by the aggregation engine and bootstrap operations
#[derive(Debug)]
pub enum StatsError {
    /// Scope identifier is not in the reference catalog
    EntityNotFound { kind: &'static str, id: String },
    /// Counter store could not answer; carried through untranslated
    StoreUnavailable(StoreError),
    /// Malformed input (catalog file, metric name, command argument)
    InvalidArgument(String),
    /// `reset_all` was called without the reset opt-in
    ResetDisabled,
}

impl StatsError {
    /// Not-found error for a region code
    pub fn region_not_found(code: &str) -> Self {
        StatsError::EntityNotFound {
            kind: "region",
            id: code.to_string(),
        }
    }

    /// Stable machine-readable name for callers mapping to status codes
    pub fn kind(&self) -> &'static str {
        match self {
            StatsError::EntityNotFound { .. } => "not_found",
            StatsError::StoreUnavailable(_) => "store_unavailable",
            StatsError::InvalidArgument(_) => "invalid_argument",
            StatsError::ResetDisabled => "reset_disabled",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StatsError::EntityNotFound { .. })
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, StatsError::StoreUnavailable(_))
    }
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::EntityNotFound { kind, id } => write!(f, "{} not found: {}", kind, id),
            StatsError::StoreUnavailable(e) => write!(f, "{}", e),
            StatsError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            StatsError::ResetDisabled => write!(
                f,
                "Statistics reset is disabled (set ALLOW_STATS_RESET=true to enable)"
            ),
        }
    }
}

impl std::error::Error for StatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatsError::StoreUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for StatsError {
    fn from(e: StoreError) -> Self {
        StatsError::StoreUnavailable(e)
    }
}

impl From<toml::de::Error> for StatsError {
    fn from(e: toml::de::Error) -> Self {
        StatsError::InvalidArgument(format!("catalog parse error: {}", e))
    }
}

pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(StatsError::region_not_found("ZZZ").kind(), "not_found");
        assert_eq!(
            StatsError::from(StoreError::Unavailable("down".into())).kind(),
            "store_unavailable"
        );
        assert_eq!(StatsError::ResetDisabled.kind(), "reset_disabled");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StatsError::region_not_found("ZZZ").to_string(),
            "region not found: ZZZ"
        );
    }
}
