//! State and behaviour behind the visitor check-in dashboard, independent
//! of any UI toolkit.
//!
//! - **[`AppContext`]**: composition root. Owns the [`DashboardClient`],
//!   the [`FilterBus`], the six-chart [`Dashboard`], the scan
//!   disambiguator and the [`CheckinDesk`].
//!
//! - **[`Publisher<T>`]**: typed in-process pub/sub. Listeners run
//!   synchronously in registration order; nothing is replayed to late
//!   subscribers. [`FilterBus`] carries [`DateRangeFilter`] broadcasts.
//!
//! - **[`ScanDisambiguator`]**: tells scanner bursts from human typing.
//!   Time is passed in explicitly, so callers own the idle timer.
//!
//! - **[`ChartSlot`]**: one rendered chart per slot, with stale responses
//!   dropped by request ticket. Drawing is delegated to a
//!   [`ChartRenderer`].
//!
//! - **[`CheckinDesk`]**: scan and manual submission paths, the manual
//!   cooldown and the [`ConfirmationModal`].
//!
//! [`DashboardClient`]: visitgate_api::DashboardClient

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod bus;
pub mod chart;
pub mod checkin;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod notify;
pub mod scanner;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bus::{FilterBus, Publisher, SubscriptionId};
pub use chart::{
    ChartData, ChartKind, ChartRenderer, ChartSlot, ChartSnapshot, ChartView, RenderedChart,
    RequestTicket, SlotUpdate,
};
pub use checkin::{
    CheckinDesk, CheckinOutcome, CheckinSubmission, ConfirmationModal, PurposeChoice,
};
pub use config::{
    CheckinConfig, DashboardConfig, OTHER_PURPOSE, ScannerConfig, TlsVerification,
};
pub use context::AppContext;
pub use dashboard::{ChartPanel, Dashboard};
pub use error::CoreError;
pub use filter::{DateRangeFilter, FilterControl};
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier};
pub use scanner::{Focus, Key, ScanAction, ScanDisambiguator, ScanState};

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
