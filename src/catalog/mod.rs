//! Reference Catalog
//!
//! Immutable lookup tables loaded once at startup: regions, organizations
//! and the enumerations frontends use for dropdowns (user types, councils,
//! complaint categories and statuses, notification types).
//!
//! The catalog is a TOML document. A default one is compiled into the
//! binary; deployments can point `CATALOG_PATH` at their own file.

use crate::stats::{StatsError, StatsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("default_catalog.toml");

/// A region (governorate) counters can be partitioned by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub name_en: String,
}

/// An organization (political party) known to the deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub name_en: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserType {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub name_en: String,
    pub description: String,
    #[serde(default)]
    pub required_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilType {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub name_en: String,
    pub description: String,
    /// Term length in years
    pub term_duration: u32,
    pub total_seats: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintCategory {
    pub name: String,
    pub name_en: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintStatus {
    pub status: String,
    pub name: String,
    pub name_en: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationType {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub name_en: String,
    pub icon: String,
}

/// On-disk layout of a catalog file
#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    regions: Vec<Region>,
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    user_types: Vec<UserType>,
    #[serde(default)]
    council_types: Vec<CouncilType>,
    #[serde(default)]
    complaint_categories: Vec<ComplaintCategory>,
    #[serde(default)]
    complaint_statuses: Vec<ComplaintStatus>,
    #[serde(default)]
    notification_types: Vec<NotificationType>,
}

/// Read-only reference tables with indexed lookups
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    regions: Vec<Region>,
    region_index: HashMap<String, usize>,
    organizations: Vec<Organization>,
    organization_index: HashMap<String, usize>,
    user_types: Vec<UserType>,
    council_types: Vec<CouncilType>,
    complaint_categories: Vec<ComplaintCategory>,
    complaint_statuses: Vec<ComplaintStatus>,
    notification_types: Vec<NotificationType>,
}

impl ReferenceCatalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> StatsResult<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Load a catalog file
    pub fn from_path(path: impl AsRef<Path>) -> StatsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StatsError::InvalidArgument(format!("cannot read catalog {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a catalog document
    pub fn from_toml(text: &str) -> StatsResult<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::build(file)
    }

    /// Build a catalog holding only regions and organizations
    pub fn from_parts(regions: Vec<Region>, organizations: Vec<Organization>) -> StatsResult<Self> {
        Self::build(CatalogFile {
            regions,
            organizations,
            ..Default::default()
        })
    }

    fn build(file: CatalogFile) -> StatsResult<Self> {
        let mut region_index = HashMap::with_capacity(file.regions.len());
        for (i, region) in file.regions.iter().enumerate() {
            if region.code.trim().is_empty() {
                return Err(StatsError::InvalidArgument(format!(
                    "region #{} has an empty code",
                    i + 1
                )));
            }
            if region_index.insert(region.code.clone(), i).is_some() {
                return Err(StatsError::InvalidArgument(format!(
                    "duplicate region code: {}",
                    region.code
                )));
            }
        }

        let mut organization_index = HashMap::with_capacity(file.organizations.len());
        for (i, organization) in file.organizations.iter().enumerate() {
            if organization_index
                .insert(organization.name.clone(), i)
                .is_some()
            {
                return Err(StatsError::InvalidArgument(format!(
                    "duplicate organization: {}",
                    organization.name
                )));
            }
        }

        Ok(ReferenceCatalog {
            regions: file.regions,
            region_index,
            organizations: file.organizations,
            organization_index,
            user_types: file.user_types,
            council_types: file.council_types,
            complaint_categories: file.complaint_categories,
            complaint_statuses: file.complaint_statuses,
            notification_types: file.notification_types,
        })
    }

    /// Look up a region by code
    pub fn find_region(&self, code: &str) -> StatsResult<&Region> {
        self.region_index
            .get(code)
            .map(|&i| &self.regions[i])
            .ok_or_else(|| StatsError::region_not_found(code))
    }

    /// Look up an organization by its exact name
    pub fn find_organization(&self, name: &str) -> Option<&Organization> {
        self.organization_index
            .get(name)
            .map(|&i| &self.organizations[i])
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    /// Organization names in catalog order
    pub fn organization_names(&self) -> Vec<String> {
        self.organizations.iter().map(|o| o.name.clone()).collect()
    }

    pub fn user_types(&self) -> &[UserType] {
        &self.user_types
    }

    pub fn council_types(&self) -> &[CouncilType] {
        &self.council_types
    }

    pub fn complaint_categories(&self) -> &[ComplaintCategory] {
        &self.complaint_categories
    }

    pub fn complaint_statuses(&self) -> &[ComplaintStatus] {
        &self.complaint_statuses
    }

    pub fn notification_types(&self) -> &[NotificationType] {
        &self.notification_types
    }
}
