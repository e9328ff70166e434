// Analytics endpoints
//
// One GET per chart. Every endpoint accepts the same `days` /
// `start_date` + `end_date` query parameters.

use tracing::debug;

use crate::client::DashboardClient;
use crate::error::Error;
use crate::models::{
    AnalyticsQuery, DestinationCount, DurationsPayload, NamedCount, PurposeCount, StatusCount,
    TrendPoint,
};

pub const VISITOR_TREND_PATH: &str = "api/visitor_trend";
pub const TOP_VISITORS_PATH: &str = "api/top_visitors";
pub const VISIT_DURATIONS_PATH: &str = "api/visit_durations";
pub const PURPOSE_DISTRIBUTION_PATH: &str = "api/purpose_distribution";
pub const DESTINATION_DISTRIBUTION_PATH: &str = "api/destination_distribution";
pub const REQUEST_STATUS_DISTRIBUTION_PATH: &str = "api/request_status_distribution";

impl DashboardClient {
    /// Daily check-in counts.
    ///
    /// `GET /api/visitor_trend`
    pub async fn visitor_trend(&self, query: &AnalyticsQuery) -> Result<Vec<TrendPoint>, Error> {
        debug!("fetching visitor trend");
        self.get_json(VISITOR_TREND_PATH, query).await
    }

    /// Most frequent visitors.
    ///
    /// `GET /api/top_visitors`
    pub async fn top_visitors(&self, query: &AnalyticsQuery) -> Result<Vec<NamedCount>, Error> {
        debug!("fetching top visitors");
        self.get_json(TOP_VISITORS_PATH, query).await
    }

    /// Minutes between check-in and check-out per visit.
    ///
    /// `GET /api/visit_durations`
    pub async fn visit_durations(&self, query: &AnalyticsQuery) -> Result<DurationsPayload, Error> {
        debug!("fetching visit durations");
        self.get_json(VISIT_DURATIONS_PATH, query).await
    }

    /// `GET /api/purpose_distribution`
    pub async fn purpose_distribution(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<Vec<PurposeCount>, Error> {
        debug!("fetching purpose distribution");
        self.get_json(PURPOSE_DISTRIBUTION_PATH, query).await
    }

    /// `GET /api/destination_distribution`
    pub async fn destination_distribution(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<Vec<DestinationCount>, Error> {
        debug!("fetching destination distribution");
        self.get_json(DESTINATION_DISTRIBUTION_PATH, query).await
    }

    /// Visit requests by approval status.
    ///
    /// `GET /api/request_status_distribution`
    pub async fn request_status_distribution(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<Vec<StatusCount>, Error> {
        debug!("fetching request status distribution");
        self.get_json(REQUEST_STATUS_DISTRIBUTION_PATH, query).await
    }
}
