// crates/types/src/site.rs
//! Sites a report belongs to, and the parsing of the allowed-site list the
//! login endpoint hands back.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidValue;

/// One of the report sites. Ordering follows the site picker layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    Personal,
    Shared,
    Admin,
}

impl SiteId {
    pub const ALL: [SiteId; 3] = [SiteId::Personal, SiteId::Shared, SiteId::Admin];

    /// Lowercase identifier used in paths and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            SiteId::Personal => "personal",
            SiteId::Shared => "shared",
            SiteId::Admin => "admin",
        }
    }

    /// Human label shown on the site picker.
    pub fn label(self) -> &'static str {
        match self {
            SiteId::Personal => "Personal",
            SiteId::Shared => "Shared",
            SiteId::Admin => "Admin",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SiteId::Personal => "Access your personal reports and data.",
            SiteId::Shared => "Access shared reports and collaborative data.",
            SiteId::Admin => "Manage uploads and all reports.",
        }
    }

    /// Only the administrative site exposes the upload form.
    pub fn is_admin(self) -> bool {
        matches!(self, SiteId::Admin)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteId {
    type Err = InvalidValue;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(SiteId::Personal),
            "shared" => Ok(SiteId::Shared),
            "admin" => Ok(SiteId::Admin),
            _ => Err(InvalidValue::Site(s.to_string())),
        }
    }
}

/// The `allowed_sites` field of a login response.
///
/// The backend sends either a single site string, a comma-separated string,
/// or (from older persisted sessions) a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedSites {
    Delimited(String),
    List(Vec<String>),
}

impl Default for AllowedSites {
    fn default() -> Self {
        AllowedSites::List(Vec::new())
    }
}

impl AllowedSites {
    /// Normalize into a set. Blank entries are skipped; unknown site names
    /// are dropped with a warning rather than failing the login.
    pub fn to_set(&self) -> BTreeSet<SiteId> {
        let raw: Vec<&str> = match self {
            AllowedSites::Delimited(s) => s.split(',').collect(),
            AllowedSites::List(items) => items.iter().flat_map(|s| s.split(',')).collect(),
        };

        let mut sites = BTreeSet::new();
        for entry in raw {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.parse::<SiteId>() {
                Ok(site) => {
                    sites.insert(site);
                }
                Err(_) => tracing::warn!(site = %entry, "Ignoring unknown site in allowed_sites"),
            }
        }
        sites
    }
}
