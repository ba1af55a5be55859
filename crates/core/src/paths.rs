//! Centralized path functions for client storage locations.

use std::path::PathBuf;

/// Environment override for the persisted session file.
pub const SESSION_FILE_ENV: &str = "REPORT_PORTAL_SESSION";

/// App data root: `~/Library/Application Support/report-portal/` (macOS) or
/// `~/.local/share/report-portal/` (Linux).
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("report-portal"))
}

/// Persisted session file: `$REPORT_PORTAL_SESSION`, else
/// `<app_data_dir>/session.json`.
pub fn session_file() -> Option<PathBuf> {
    std::env::var_os(SESSION_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| app_data_dir().map(|d| d.join("session.json")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_data_dir_ends_with_app_name() {
        if let Some(dir) = app_data_dir() {
            assert!(dir.ends_with("report-portal"));
        }
    }

    #[test]
    fn test_default_session_file_lives_in_data_dir() {
        if std::env::var_os(SESSION_FILE_ENV).is_none() {
            if let (Some(file), Some(dir)) = (session_file(), app_data_dir()) {
                assert_eq!(file, dir.join("session.json"));
            }
        }
    }
}
