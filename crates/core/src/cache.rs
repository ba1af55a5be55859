// crates/core/src/cache.rs
//! Read-only cached copies of report listings, keyed by (site, category, date).

use std::collections::HashMap;
use std::sync::RwLock;

use report_portal_types::{Report, ReportId, ReportKey, UploadMode, UploadedReport};

/// Listing cache shared between the report views and the upload workflow.
///
/// The backend owns the records; entries here are display copies that
/// uploads and deletions patch so a view does not show stale rows.
#[derive(Debug, Default)]
pub struct ReportCache {
    listings: RwLock<HashMap<ReportKey, Vec<Report>>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ReportKey) -> Option<Vec<Report>> {
        match self.listings.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading report cache: {e}");
                None
            }
        }
    }

    /// Replace the listing for `key` with a fresh query result.
    pub fn store(&self, key: ReportKey, reports: Vec<Report>) {
        self.write(|listings| {
            listings.insert(key, reports);
        });
    }

    /// Patch the cached listing for `key` after a successful upload.
    /// `Override` replaces whatever was cached; the other modes append. A key
    /// that was never listed stays uncached, since the new row alone would
    /// misstate what the backend holds. Without an id the new row cannot be
    /// represented, so the listing is dropped and the next view refetches it.
    pub fn record_upload(&self, key: &ReportKey, uploaded: &UploadedReport, mode: UploadMode) {
        let Some(id) = uploaded.id else {
            self.invalidate(key);
            return;
        };
        let report = Report {
            id,
            file_name: uploaded.file_name.clone(),
            file_type: uploaded
                .file_type
                .clone()
                .unwrap_or_else(|| file_type_from_name(&uploaded.file_name)),
            site: key.site,
            category: key.category,
            date: key.date,
        };
        self.write(|listings| {
            let Some(entry) = listings.get_mut(key) else {
                return;
            };
            if mode.override_existing() {
                entry.clear();
            }
            entry.retain(|r| r.id != id);
            entry.push(report);
        });
    }

    /// Remove a deleted report from every listing. Returns whether it was
    /// cached anywhere.
    pub fn remove(&self, id: ReportId) -> bool {
        let mut removed = false;
        self.write(|listings| {
            for reports in listings.values_mut() {
                let before = reports.len();
                reports.retain(|r| r.id != id);
                removed |= reports.len() != before;
            }
        });
        removed
    }

    pub fn invalidate(&self, key: &ReportKey) {
        self.write(|listings| {
            listings.remove(key);
        });
    }

    pub fn clear(&self) {
        self.write(|listings| listings.clear());
    }

    fn write(&self, f: impl FnOnce(&mut HashMap<ReportKey, Vec<Report>>)) {
        match self.listings.write() {
            Ok(mut guard) => f(&mut guard),
            Err(e) => tracing::error!("RwLock poisoned writing report cache: {e}"),
        }
    }
}

/// Extension of `file_name`, lowercased; empty when there is none.
fn file_type_from_name(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
