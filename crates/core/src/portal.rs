// crates/core/src/portal.rs
//! The client application: session, navigation, report views and the upload
//! workflow wired together.
//!
//! Every view is entered through [`Portal::open`], which runs the path
//! through the navigation guards before any report query is issued.
//!
//! All operations take `&self`. Navigation state and the session sit behind
//! short-lived locks that are never held across a network call, so the user
//! can navigate (and thereby abandon an upload) while a query or upload is
//! still outstanding.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info};

use report_portal_types::{
    AccessToken, Category, Report, ReportDate, ReportId, ReportKey, SiteId, UploadDecision,
};

use crate::cache::ReportCache;
use crate::error::PortalError;
use crate::gateway::{AuthGateway, ReportGateway};
use crate::navigation::{
    dashboard_entries, recheck, site_options, DashboardEntry, Navigator, RedirectReason,
    Resolution, Route,
};
use crate::resolver::{UploadForm, UploadOutcome, UploadResolver, UploadStatus};
use crate::session::{Session, SessionStore};

/// What a view shows once its data is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Login,
    SitePicker {
        sites: Vec<SiteId>,
    },
    Dashboard {
        site: SiteId,
        entries: Vec<DashboardEntry>,
    },
    CategoryDates {
        site: SiteId,
        category: Category,
        dates: Vec<ReportDate>,
    },
    Reports {
        key: ReportKey,
        reports: Vec<Report>,
    },
    UploadForm {
        site: SiteId,
        categories: Vec<Category>,
        status: UploadStatus,
    },
    NotFound {
        path: String,
    },
}

/// The page reached by a transition, and why it differs from the target
/// when a guard redirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub route: Route,
    pub page: Page,
    pub redirect: Option<RedirectReason>,
}

pub struct Portal {
    session: RwLock<SessionStore>,
    auth: Arc<dyn AuthGateway>,
    reports: Arc<dyn ReportGateway>,
    cache: Arc<ReportCache>,
    resolver: Arc<UploadResolver>,
    navigator: Mutex<Navigator>,
}

impl Portal {
    pub fn new(
        session: SessionStore,
        auth: Arc<dyn AuthGateway>,
        reports: Arc<dyn ReportGateway>,
    ) -> Self {
        let cache = Arc::new(ReportCache::new());
        let resolver = Arc::new(UploadResolver::new(reports.clone(), cache.clone()));
        Self {
            session: RwLock::new(session),
            auth,
            reports,
            cache,
            resolver,
            navigator: Mutex::new(Navigator::new()),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Option<Session> {
        self.session_store().current().cloned()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session_store().is_logged_in()
    }

    pub fn current_route(&self) -> Route {
        self.navigator().current()
    }

    /// Shared handle to the upload workflow, for reading its status.
    pub fn resolver(&self) -> Arc<UploadResolver> {
        self.resolver.clone()
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// Log in and land on the site picker.
    pub async fn login(&self, email: &str, password: &str) -> Result<Visit, PortalError> {
        let session = SessionStore::authenticate(self.auth.as_ref(), email, password).await?;
        self.session_store_mut().install(session)?;
        self.cache.clear();
        self.open(&Route::SitePicker.path()).await
    }

    /// Tear down the session. Safe to call repeatedly.
    pub fn logout(&self) -> Result<(), PortalError> {
        self.resolver.abandon();
        self.cache.clear();
        self.navigator().reset();
        self.session_store_mut().logout()?;
        Ok(())
    }

    /// Navigate to `path`. Guards run first; a failed guard redirects to a
    /// view that needs no report query.
    pub async fn open(&self, path: &str) -> Result<Visit, PortalError> {
        let session = self.session();
        let (previous, resolution, current) = {
            let mut navigator = self.navigator();
            let previous = navigator.current();
            let resolution = navigator.navigate(session.as_ref(), path);
            (previous, resolution, navigator.current())
        };
        self.leave(previous, current);

        match resolution {
            Resolution::Enter(route) => self.visit(route, None, Listing::Fetch).await,
            Resolution::Redirect { to, reason } => {
                info!(path, target = %to, ?reason, "Navigation redirected");
                self.visit(to, Some(reason), Listing::Fetch).await
            }
            Resolution::NotFound { path } => {
                debug!(%path, "No such view");
                Ok(Visit {
                    route: current,
                    page: Page::NotFound { path },
                    redirect: None,
                })
            }
        }
    }

    /// Return to the previous still-permitted view. No session data is
    /// refetched; the guard re-runs against the session in memory, and a
    /// report listing still in the cache is shown without a new query.
    pub async fn back(&self) -> Result<Option<Visit>, PortalError> {
        let session = self.session();
        let (previous, route) = {
            let mut navigator = self.navigator();
            let previous = navigator.current();
            (previous, navigator.back(session.as_ref()))
        };
        let Some(route) = route else {
            return Ok(None);
        };
        self.leave(previous, route);
        self.visit(route, None, Listing::Cached).await.map(Some)
    }

    /// Reload the current view from the backend.
    pub async fn refresh(&self) -> Result<Visit, PortalError> {
        let route = self.current_route();
        self.visit(route, None, Listing::Fetch).await
    }

    /// Submit the upload form of the current view. The admin guard is checked
    /// again here, not only when the form was opened.
    pub async fn submit_upload(&self, form: &UploadForm) -> Result<UploadOutcome, PortalError> {
        let site = self.upload_site()?;
        let token = self.token()?;
        Ok(self.resolver.submit(&token, site, form).await?)
    }

    /// Answer a pending conflict.
    pub async fn decide_upload(&self, decision: UploadDecision) -> Result<UploadOutcome, PortalError> {
        self.upload_site()?;
        let token = self.token()?;
        Ok(self.resolver.decide(&token, decision).await?)
    }

    /// Resubmit the form kept from the last failed attempt.
    pub async fn retry_upload(&self) -> Result<UploadOutcome, PortalError> {
        let form = self.resolver.retained_form().ok_or(PortalError::NothingToRetry)?;
        self.submit_upload(&form).await
    }

    /// Delete a report and drop it from cached listings.
    pub async fn delete_report(&self, id: ReportId) -> Result<(), PortalError> {
        let token = self.token()?;
        debug!(report_id = id, "Deleting report");
        self.reports.delete_report(&token, id).await?;
        self.cache.remove(id);
        info!(report_id = id, "Report deleted");
        Ok(())
    }

    fn token(&self) -> Result<AccessToken, PortalError> {
        self.session_store()
            .current()
            .map(|s| s.token().clone())
            .ok_or(PortalError::NotLoggedIn)
    }

    fn upload_site(&self) -> Result<SiteId, PortalError> {
        let route = self.current_route();
        match (route, recheck(self.session().as_ref(), &route)) {
            (Route::UploadForm(site), Resolution::Enter(Route::UploadForm(_))) => Ok(site),
            _ => Err(PortalError::NotOnUploadForm),
        }
    }

    /// Leaving the upload form discards whatever it had in progress.
    fn leave(&self, previous: Route, current: Route) {
        if matches!(previous, Route::UploadForm(_)) && current != previous {
            debug!(from = %previous, "Left upload form; abandoning upload workflow");
            self.resolver.abandon();
        }
    }

    async fn visit(
        &self,
        route: Route,
        redirect: Option<RedirectReason>,
        listing: Listing,
    ) -> Result<Visit, PortalError> {
        let page = self.load(route, listing).await?;
        Ok(Visit {
            route,
            page,
            redirect,
        })
    }

    async fn load(&self, route: Route, listing: Listing) -> Result<Page, PortalError> {
        let page = match route {
            Route::Login => Page::Login,
            Route::SitePicker => {
                let session = self.session().ok_or(PortalError::NotLoggedIn)?;
                Page::SitePicker {
                    sites: site_options(&session),
                }
            }
            Route::Dashboard(site) => Page::Dashboard {
                site,
                entries: dashboard_entries(site),
            },
            Route::CategoryDates(site, category) => {
                let token = self.token()?;
                debug!(%site, %category, "Listing report dates");
                let dates = self.reports.list_dates(&token, site, category).await?;
                Page::CategoryDates {
                    site,
                    category,
                    dates: dedup_dates(dates),
                }
            }
            Route::ReportsForDate(key) => {
                let cached = match listing {
                    Listing::Cached => self.cache.get(&key),
                    Listing::Fetch => None,
                };
                let reports = match cached {
                    Some(reports) => {
                        debug!(%key, "Showing cached listing");
                        reports
                    }
                    None => self.fetch_reports(key).await?,
                };
                Page::Reports { key, reports }
            }
            Route::UploadForm(site) => Page::UploadForm {
                site,
                categories: Category::ALL.to_vec(),
                status: self.resolver.status(),
            },
        };
        Ok(page)
    }

    async fn fetch_reports(&self, key: ReportKey) -> Result<Vec<Report>, PortalError> {
        let token = self.token()?;
        debug!(%key, "Listing reports");
        let reports: Vec<Report> = self
            .reports
            .list_reports(&token, &key)
            .await?
            .into_iter()
            .map(|summary| Report::from_summary(summary, &key))
            .collect();
        self.cache.store(key, reports.clone());
        Ok(reports)
    }

    fn navigator(&self) -> MutexGuard<'_, Navigator> {
        self.navigator.lock().unwrap_or_else(|poisoned| {
            error!("Navigator mutex poisoned; recovering state");
            poisoned.into_inner()
        })
    }

    fn session_store(&self) -> RwLockReadGuard<'_, SessionStore> {
        self.session.read().unwrap_or_else(|poisoned| {
            error!("Session RwLock poisoned; recovering state");
            poisoned.into_inner()
        })
    }

    fn session_store_mut(&self) -> RwLockWriteGuard<'_, SessionStore> {
        self.session.write().unwrap_or_else(|poisoned| {
            error!("Session RwLock poisoned; recovering state");
            poisoned.into_inner()
        })
    }
}

/// Where a report listing may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Fetch,
    Cached,
}

/// Drop repeated dates, keeping the first occurrence's position.
fn dedup_dates(dates: Vec<ReportDate>) -> Vec<ReportDate> {
    let mut seen = HashSet::with_capacity(dates.len());
    dates.into_iter().filter(|d| seen.insert(*d)).collect()
}
