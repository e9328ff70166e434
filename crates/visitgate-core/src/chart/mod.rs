// ── Analytics charts ──
//
// The six chart kinds and how each turns its endpoint payload into a
// labels/series pair.

mod slot;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::warn;
use visitgate_api::analytics::{
    DESTINATION_DISTRIBUTION_PATH, PURPOSE_DISTRIBUTION_PATH, REQUEST_STATUS_DISTRIBUTION_PATH,
    TOP_VISITORS_PATH, VISIT_DURATIONS_PATH, VISITOR_TREND_PATH,
};
use visitgate_api::{
    AnalyticsQuery, DashboardClient, DestinationCount, DurationsPayload, NamedCount, PurposeCount,
    StatusCount, TrendPoint,
};

use crate::filter::format_date;

pub use slot::{ChartRenderer, ChartSlot, ChartSnapshot, RenderedChart, RequestTicket, SlotUpdate};

/// Histogram bucket width for visit durations, in minutes.
pub const DURATION_BIN_MINUTES: u64 = 5;

/// Placeholder shown when a range has nothing to plot.
pub const NO_DATA_MESSAGE: &str = "No data for selected range.";

/// Label used for rows whose category column is null.
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    VisitorTrend,
    TopVisitors,
    VisitDurations,
    PurposeDistribution,
    DestinationDistribution,
    RequestStatus,
}

impl ChartKind {
    /// Every chart, in dashboard order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Backend path for this chart's data.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::VisitorTrend => VISITOR_TREND_PATH,
            Self::TopVisitors => TOP_VISITORS_PATH,
            Self::VisitDurations => VISIT_DURATIONS_PATH,
            Self::PurposeDistribution => PURPOSE_DISTRIBUTION_PATH,
            Self::DestinationDistribution => DESTINATION_DISTRIBUTION_PATH,
            Self::RequestStatus => REQUEST_STATUS_DISTRIBUTION_PATH,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::VisitorTrend => "Visitor Trend Over Time",
            Self::TopVisitors => "Top Visitors",
            Self::VisitDurations => "Visitor Duration",
            Self::PurposeDistribution => "Purpose Distribution",
            Self::DestinationDistribution => "Destination Distribution",
            Self::RequestStatus => "Approved and Rejected Requests",
        }
    }

    /// Name of the plotted series.
    pub fn series_name(self) -> &'static str {
        match self {
            Self::VisitorTrend | Self::TopVisitors => "Check-Ins",
            Self::VisitDurations => "Visitor Count",
            Self::PurposeDistribution | Self::DestinationDistribution => "Visits",
            Self::RequestStatus => "Requests",
        }
    }

    /// Caption shown in place of the chart when its fetch fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::VisitorTrend => "Failed to load visitor trend.",
            Self::TopVisitors => "Failed to load top visitors.",
            Self::VisitDurations => "Failed to load durations.",
            Self::PurposeDistribution => "Failed to load purpose distribution.",
            Self::DestinationDistribution => "Failed to load destination distribution.",
            Self::RequestStatus => "Failed to load request status distribution.",
        }
    }

    /// File name used when exporting this chart.
    pub fn export_file_name(self) -> String {
        format!("{}.json", self.as_ref())
    }
}

// ── Chart data ───────────────────────────────────────────────────────

/// A labels/series pair, the only thing the renderer is handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<u64>,
}

impl ChartData {
    fn from_pairs(pairs: impl IntoIterator<Item = (String, u64)>) -> Self {
        let (labels, series) = pairs.into_iter().unzip();
        Self { labels, series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Trend dates formatted `Mon D, YYYY`; unparseable dates pass through.
    pub fn trend(points: &[TrendPoint]) -> Self {
        Self::from_pairs(points.iter().map(|p| {
            let label = NaiveDate::parse_from_str(&p.date, "%Y-%m-%d")
                .map_or_else(|_| p.date.clone(), format_date);
            (label, p.count)
        }))
    }

    pub fn top_visitors(rows: &[NamedCount]) -> Self {
        Self::from_pairs(rows.iter().map(|r| (r.name.clone(), r.count)))
    }

    pub fn purposes(rows: &[PurposeCount]) -> Self {
        Self::from_pairs(rows.iter().map(|r| (label_or_unspecified(r.purpose.as_deref()), r.count)))
    }

    pub fn destinations(rows: &[DestinationCount]) -> Self {
        Self::from_pairs(
            rows.iter()
                .map(|r| (label_or_unspecified(r.destination.as_deref()), r.count)),
        )
    }

    pub fn statuses(rows: &[StatusCount]) -> Self {
        Self::from_pairs(rows.iter().map(|r| (r.status.clone(), r.count)))
    }

    /// Histogram of rounded visit minutes in 5-minute buckets
    /// (`"0-5 min"`, `"5-10 min"`, ...). Empty buckets are dropped, as are
    /// negative and non-finite samples.
    pub fn duration_histogram(payload: &DurationsPayload) -> Self {
        let mut buckets: BTreeMap<u64, u64> = BTreeMap::new();
        for minutes in payload
            .durations
            .iter()
            .filter_map(|d| round_minutes(d.duration_minutes))
        {
            *buckets.entry(minutes / DURATION_BIN_MINUTES).or_default() += 1;
        }

        Self::from_pairs(buckets.into_iter().map(|(i, count)| {
            let start = i * DURATION_BIN_MINUTES;
            let end = start.saturating_add(DURATION_BIN_MINUTES);
            (format!("{start}-{end} min"), count)
        }))
    }
}

fn label_or_unspecified(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_owned(),
        _ => UNSPECIFIED_LABEL.to_owned(),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn round_minutes(minutes: f64) -> Option<u64> {
    let rounded = minutes.round();
    // `as` saturates at u64::MAX for huge values.
    (rounded.is_finite() && rounded >= 0.0).then_some(rounded as u64)
}

// ── Chart view ───────────────────────────────────────────────────────

/// What a chart slot displays after a load completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartView {
    Ready(ChartData),
    NoData { message: String },
    Failed { message: String },
}

impl ChartView {
    fn from_data(data: ChartData) -> Self {
        if data.is_empty() {
            Self::NoData {
                message: NO_DATA_MESSAGE.to_owned(),
            }
        } else {
            Self::Ready(data)
        }
    }

    pub fn data(&self) -> Option<&ChartData> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Fetch one chart's payload and turn it into a view.
///
/// Never fails: a transport or backend error becomes
/// [`ChartView::Failed`] scoped to this chart alone.
pub async fn load_view(
    client: &DashboardClient,
    kind: ChartKind,
    query: &AnalyticsQuery,
) -> ChartView {
    let result = match kind {
        ChartKind::VisitorTrend => client.visitor_trend(query).await.map(|p| ChartData::trend(&p)),
        ChartKind::TopVisitors => client
            .top_visitors(query)
            .await
            .map(|r| ChartData::top_visitors(&r)),
        ChartKind::VisitDurations => client
            .visit_durations(query)
            .await
            .map(|p| ChartData::duration_histogram(&p)),
        ChartKind::PurposeDistribution => client
            .purpose_distribution(query)
            .await
            .map(|r| ChartData::purposes(&r)),
        ChartKind::DestinationDistribution => client
            .destination_distribution(query)
            .await
            .map(|r| ChartData::destinations(&r)),
        ChartKind::RequestStatus => client
            .request_status_distribution(query)
            .await
            .map(|r| ChartData::statuses(&r)),
    };

    match result {
        Ok(data) => ChartView::from_data(data),
        Err(e) => {
            warn!(chart = %kind, error = %e, "chart load failed");
            ChartView::Failed {
                message: kind.failure_message().to_owned(),
            }
        }
    }
}
