// crates/core/src/navigation.rs
//! Route parsing and the access guards every site-scoped view goes through.
//!
//! Paths are the only way into a view, whether reached by clicking through
//! the menus or typed directly, so the guards run on every transition:
//!
//! ```text
//! /                                              Login
//! /sites                                         SitePicker
//! /{site}/dashboard                              Dashboard
//! /{site}/dashboard/reports/{category}/dates     CategoryDates
//! /{site}/dashboard/reports/{category}/{date}/view   ReportsForDate
//! /{site}/dashboard/upload                       UploadForm (admin only)
//! ```

use std::fmt;

use report_portal_types::{Category, ReportDate, ReportKey, SiteId};
use tracing::debug;

use crate::session::Session;

/// A view the client can be in. Every site-scoped variant carries its site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    SitePicker,
    Dashboard(SiteId),
    CategoryDates(SiteId, Category),
    ReportsForDate(ReportKey),
    UploadForm(SiteId),
}

impl Route {
    pub fn site(&self) -> Option<SiteId> {
        match self {
            Route::Login | Route::SitePicker => None,
            Route::Dashboard(site) | Route::CategoryDates(site, _) | Route::UploadForm(site) => {
                Some(*site)
            }
            Route::ReportsForDate(key) => Some(key.site),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::SitePicker => "/sites".to_string(),
            Route::Dashboard(site) => format!("/{site}/dashboard"),
            Route::CategoryDates(site, category) => {
                format!("/{site}/dashboard/reports/{}/dates", category.path_segment())
            }
            Route::ReportsForDate(key) => format!(
                "/{}/dashboard/reports/{}/{}/view",
                key.site,
                key.category.path_segment(),
                key.date
            ),
            Route::UploadForm(site) => format!("/{site}/dashboard/upload"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Why a transition ended somewhere other than where it was aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No session; everything but Login requires one.
    NotLoggedIn,
    /// The site is unknown or not in the session's allowed set.
    SiteNotAllowed,
    /// Upload was requested on a non-administrative site.
    AdminOnly,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RedirectReason::NotLoggedIn => "not logged in",
            RedirectReason::SiteNotAllowed => "site not available to this account",
            RedirectReason::AdminOnly => "uploads are only available on the admin site",
        })
    }
}

/// Outcome of running a path through the guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Enter(Route),
    Redirect { to: Route, reason: RedirectReason },
    NotFound { path: String },
}

/// The raw segments of a recognised path shape, before any validation.
#[derive(Debug, PartialEq, Eq)]
enum PathShape {
    Login,
    Sites,
    Site { site: String, view: SiteView },
}

#[derive(Debug, PartialEq, Eq)]
enum SiteView {
    Dashboard,
    Dates { category: String },
    Reports { category: String, date: String },
    Upload,
}

fn parse_shape(path: &str) -> Option<PathShape> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect();
    let parts: Vec<&str> = segments.iter().map(String::as_str).collect();

    let (site, view) = match parts.as_slice() {
        [] => return Some(PathShape::Login),
        ["sites"] => return Some(PathShape::Sites),
        [site, "dashboard"] => (site, SiteView::Dashboard),
        [site, "dashboard", "upload"] => (site, SiteView::Upload),
        [site, "dashboard", "reports", category, "dates"] => (
            site,
            SiteView::Dates {
                category: category.to_string(),
            },
        ),
        [site, "dashboard", "reports", category, date, "view"] => (
            site,
            SiteView::Reports {
                category: category.to_string(),
                date: date.to_string(),
            },
        ),
        _ => return None,
    };
    Some(PathShape::Site {
        site: site.to_string(),
        view,
    })
}

/// Run `path` through the guards against `session`. Pure: no I/O, so a
/// failing guard can never have issued a report query.
///
/// Guard order: shape, session, site authorization, category and date
/// validity, then the admin-only upload check.
pub fn resolve(session: Option<&Session>, path: &str) -> Resolution {
    let Some(shape) = parse_shape(path) else {
        return Resolution::NotFound {
            path: path.to_string(),
        };
    };

    let (session, site_segment, view) = match (session, shape) {
        (_, PathShape::Login) => return Resolution::Enter(Route::Login),
        (None, _) => {
            return Resolution::Redirect {
                to: Route::Login,
                reason: RedirectReason::NotLoggedIn,
            }
        }
        (Some(_), PathShape::Sites) => return Resolution::Enter(Route::SitePicker),
        (Some(session), PathShape::Site { site, view }) => (session, site, view),
    };

    let site = match site_segment.parse::<SiteId>() {
        Ok(site) if session.is_authorized(site) => site,
        _ => {
            debug!(site = %site_segment, "Site not allowed; redirecting to site picker");
            return Resolution::Redirect {
                to: Route::SitePicker,
                reason: RedirectReason::SiteNotAllowed,
            };
        }
    };

    let not_found = || Resolution::NotFound {
        path: path.to_string(),
    };

    match view {
        SiteView::Dashboard => Resolution::Enter(Route::Dashboard(site)),
        SiteView::Dates { category } => match category.parse::<Category>() {
            Ok(category) => Resolution::Enter(Route::CategoryDates(site, category)),
            Err(_) => not_found(),
        },
        SiteView::Reports { category, date } => {
            match (category.parse::<Category>(), date.parse::<ReportDate>()) {
                (Ok(category), Ok(date)) => {
                    Resolution::Enter(Route::ReportsForDate(ReportKey::new(site, category, date)))
                }
                _ => not_found(),
            }
        }
        SiteView::Upload if site.is_admin() => Resolution::Enter(Route::UploadForm(site)),
        SiteView::Upload => {
            debug!(%site, "Upload requested on non-admin site; redirecting to dashboard");
            Resolution::Redirect {
                to: Route::Dashboard(site),
                reason: RedirectReason::AdminOnly,
            }
        }
    }
}

/// Re-check an already-built route against the session. Used when
/// re-entering a route from history.
pub fn recheck(session: Option<&Session>, route: &Route) -> Resolution {
    resolve(session, &route.path())
}

/// The sites the picker offers: exactly the session's allowed sites.
pub fn site_options(session: &Session) -> Vec<SiteId> {
    session.allowed_sites().collect()
}

/// A selectable card on a site's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEntry {
    Category(Category),
    Upload,
}

impl DashboardEntry {
    pub fn label(&self) -> &'static str {
        match self {
            DashboardEntry::Category(c) => c.as_str(),
            DashboardEntry::Upload => "Upload Report",
        }
    }

    pub fn route(&self, site: SiteId) -> Route {
        match self {
            DashboardEntry::Category(c) => Route::CategoryDates(site, *c),
            DashboardEntry::Upload => Route::UploadForm(site),
        }
    }
}

/// Categories in declared order; the upload entry only on the admin site.
pub fn dashboard_entries(site: SiteId) -> Vec<DashboardEntry> {
    let mut entries: Vec<DashboardEntry> =
        Category::ALL.into_iter().map(DashboardEntry::Category).collect();
    if site.is_admin() {
        entries.push(DashboardEntry::Upload);
    }
    entries
}

/// Current route plus the forward history, for `back()`.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Route,
    history: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Route::Login,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Resolve `path` and move there (or to the redirect target). A
    /// `NotFound` leaves the current route unchanged.
    pub fn navigate(&mut self, session: Option<&Session>, path: &str) -> Resolution {
        let resolution = resolve(session, path);
        match &resolution {
            Resolution::Enter(route) | Resolution::Redirect { to: route, .. } => {
                self.move_to(*route)
            }
            Resolution::NotFound { .. } => {}
        }
        resolution
    }

    /// Return to the previous route, re-validated against the in-memory
    /// session. Routes that no longer pass are skipped.
    pub fn back(&mut self, session: Option<&Session>) -> Option<Route> {
        while let Some(previous) = self.history.pop() {
            if let Resolution::Enter(route) = recheck(session, &previous) {
                self.current = route;
                return Some(route);
            }
        }
        None
    }

    /// Drop all history and return to Login.
    pub fn reset(&mut self) {
        self.current = Route::Login;
        self.history.clear();
    }

    fn move_to(&mut self, route: Route) {
        if route != self.current {
            self.history.push(self.current);
            self.current = route;
        }
    }
}
