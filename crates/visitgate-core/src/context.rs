// ── Application context ──
//
// Composition root: one client, one filter bus, the dashboard panels,
// the scan disambiguator and the check-in desk, wired together once at
// start-up.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::NaiveDate;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use visitgate_api::{DashboardClient, TlsMode, TransportConfig};

use crate::bus::FilterBus;
use crate::chart::{ChartKind, ChartRenderer};
use crate::checkin::CheckinDesk;
use crate::config::{DashboardConfig, TlsVerification};
use crate::dashboard::Dashboard;
use crate::error::CoreError;
use crate::filter::{DateRangeFilter, FilterControl};
use crate::lock;
use crate::notify::Notifier;
use crate::scanner::{Focus, Key, ScanAction, ScanDisambiguator};

pub struct AppContext {
    config: DashboardConfig,
    client: Arc<DashboardClient>,
    bus: FilterBus,
    dashboard: Dashboard,
    control: Mutex<FilterControl>,
    scanner: Mutex<ScanDisambiguator>,
    desk: Arc<CheckinDesk>,
    tasks: TaskTracker,
    runtime: Handle,
}

impl AppContext {
    /// Build the client from `config` and wire everything up.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: DashboardConfig,
        renderer: Arc<dyn ChartRenderer>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_mode(&config.tls),
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let client = DashboardClient::new(config.url.clone(), &transport)?;
        Self::with_client(config, client, renderer, notifier)
    }

    /// Wire up around an already built client. Session material from
    /// `config` is still installed.
    pub fn with_client(
        config: DashboardConfig,
        client: DashboardClient,
        renderer: Arc<dyn ChartRenderer>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let runtime = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;

        if let Some(token) = &config.csrf_token {
            client.set_csrf_token(token.clone());
        }
        if !client.has_csrf_token() {
            warn!(url = %config.url, "no CSRF token configured; check-ins may be refused");
        }
        if let Some(cookie) = &config.session_cookie {
            if !client.set_session_cookie(cookie) {
                return Err(CoreError::Config {
                    message: "session cookie given but the client has no cookie store".into(),
                });
            }
        }

        let client = Arc::new(client);
        let bus = FilterBus::new("date-filter");
        let dashboard = Dashboard::attach(
            &bus,
            Arc::clone(&client),
            renderer,
            &ChartKind::all(),
        )?;
        let desk = Arc::new(CheckinDesk::new(
            Arc::clone(&client),
            config.checkin.clone(),
            notifier,
        ));
        let scanner = Mutex::new(ScanDisambiguator::new(config.scanner.clone()));

        Ok(Self {
            config,
            client,
            bus,
            dashboard,
            control: Mutex::new(FilterControl::new()),
            scanner,
            desk,
            tasks: TaskTracker::new(),
            runtime,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<DashboardClient> {
        &self.client
    }

    pub fn bus(&self) -> &FilterBus {
        &self.bus
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn desk(&self) -> &Arc<CheckinDesk> {
        &self.desk
    }

    pub fn filter_control(&self) -> FilterControl {
        lock(&self.control).clone()
    }

    // ── Date filter ──────────────────────────────────────────────────

    /// Broadcast the configured default quick range.
    pub fn start(&self, today: NaiveDate) -> Result<DateRangeFilter, CoreError> {
        info!(url = %self.config.url, "starting dashboard");
        self.select_quick_range(self.config.default_range_days, today)
    }

    pub fn select_quick_range(
        &self,
        days: u32,
        today: NaiveDate,
    ) -> Result<DateRangeFilter, CoreError> {
        let days = NonZeroU32::new(days)
            .ok_or_else(|| CoreError::validation("quick range must cover at least one day"))?;
        let filter = lock(&self.control).select_quick_range(days, today);
        self.publish(&filter);
        Ok(filter)
    }

    /// Apply explicit inputs. Nothing is broadcast when they are invalid.
    pub fn apply_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRangeFilter, CoreError> {
        let filter = lock(&self.control).apply(start, end)?;
        self.publish(&filter);
        Ok(filter)
    }

    /// Broadcast a filter as-is.
    pub fn publish(&self, filter: &DateRangeFilter) -> usize {
        debug!(filter = %filter, "broadcasting filter");
        self.bus.publish(filter)
    }

    // ── Scanner ──────────────────────────────────────────────────────

    /// Feed one key. A completed scan is submitted in the background;
    /// its outcome arrives through the desk's notifier and outcome feed.
    pub fn handle_key(&self, key: &Key, focus: Focus, now: Instant) -> ScanAction {
        let action = lock(&self.scanner).feed(key, focus, now);
        if let ScanAction::Submit(code) = &action {
            let desk = Arc::clone(&self.desk);
            let code = code.clone();
            self.tasks.spawn_on(
                async move {
                    desk.submit_scan(&code).await;
                },
                &self.runtime,
            );
        }
        action
    }

    /// Discard an unfinished burst whose idle deadline has passed.
    pub fn expire_scan(&self, now: Instant) -> bool {
        lock(&self.scanner).expire(now)
    }

    pub fn scan_deadline(&self) -> Option<Instant> {
        lock(&self.scanner).deadline()
    }

    /// Wait for every chart load and scan submission started so far.
    pub async fn settle(&self) {
        self.dashboard.settle().await;
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.dashboard.detach(&self.bus);
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("url", &self.config.url.as_str())
            .field("bus", &self.bus)
            .field("dashboard", &self.dashboard)
            .finish_non_exhaustive()
    }
}

fn tls_mode(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
