// crates/types/src/report.rs
//! Reports, the dates they are filed under, and their listing key.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::category::Category;
use crate::error::InvalidValue;
use crate::site::SiteId;

/// Backend-assigned report identifier.
pub type ReportId = i64;

/// A calendar date with no time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `dd/mm/yyyy`, the way date cards are labelled.
    pub fn display_label(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for ReportDate {
    type Err = InvalidValue;

    /// Accepts `YYYY-MM-DD`, or a full timestamp (`2024-01-05T00:00:00`,
    /// `2024-01-05 13:45:00`, RFC 3339) as sent for dates stored as
    /// timestamps; the time is then discarded. Anything else after the date
    /// is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(stamp.date_naive()));
        }
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(|stamp| Self(stamp.date()))
            .ok_or_else(|| InvalidValue::Date(s.to_string()))
    }
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

impl Serialize for ReportDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The (site, category, date) triple reports are filed under. More than one
/// report may share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub site: SiteId,
    pub category: Category,
    pub date: ReportDate,
}

impl ReportKey {
    pub fn new(site: SiteId, category: Category, date: ReportDate) -> Self {
        Self { site, category, date }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.site, self.category, self.date)
    }
}

/// One entry of `GET /reports/{site}/{category}/{date}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: ReportId,
    pub file_name: String,
    pub file_type: String,
}

/// A report as held by the client: the backend summary plus the key it was
/// listed under. Read-only; the backend owns the real record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub file_name: String,
    pub file_type: String,
    pub site: SiteId,
    pub category: Category,
    pub date: ReportDate,
}

impl Report {
    pub fn from_summary(summary: ReportSummary, key: &ReportKey) -> Self {
        Self {
            id: summary.id,
            file_name: summary.file_name,
            file_type: summary.file_type,
            site: key.site,
            category: key.category,
            date: key.date,
        }
    }

    pub fn key(&self) -> ReportKey {
        ReportKey::new(self.site, self.category, self.date)
    }

    /// PDFs are shown inline; everything else is offered as a download.
    pub fn is_inline_viewable(&self) -> bool {
        self.file_type.eq_ignore_ascii_case("pdf")
    }

    /// Location of the stored file relative to the backend base URL.
    pub fn content_path(&self) -> String {
        format!("/uploaded_reports/{}", self.file_name)
    }
}
