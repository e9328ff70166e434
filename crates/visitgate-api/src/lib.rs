// visitgate-api: Async Rust client for the visitor check-in dashboard backend

pub mod analytics;
pub mod checkin;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::DashboardClient;
pub use error::Error;
pub use models::{
    AnalyticsQuery, CheckinReply, CheckinRequest, DestinationCount, DurationSample,
    DurationsPayload, NamedCount, PurposeCount, StatusCount, TrendPoint,
};
pub use transport::{TlsMode, TransportConfig};
