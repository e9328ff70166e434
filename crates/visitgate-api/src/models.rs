// Dashboard backend wire types
//
// Analytics endpoints return bare JSON arrays (or a `{durations: [...]}`
// object for visit durations). Fields use `#[serde(default)]` where the
// backend emits nulls for unset columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Analytics query ──────────────────────────────────────────────────

/// Query parameters shared by every analytics endpoint.
///
/// Serialized straight into the query string; absent fields are
/// omitted so an all-default query requests "all time".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl AnalyticsQuery {
    /// `true` when no parameter would be sent.
    pub fn is_empty(&self) -> bool {
        self.days.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }
}

// ── Analytics payloads ───────────────────────────────────────────────

/// One day of the check-in trend (`/api/visitor_trend`).
///
/// `date` is kept as the raw `YYYY-MM-DD` string the backend emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
}

/// A visitor and their check-in count (`/api/top_visitors`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

/// `/api/visit_durations` wraps its rows in an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationsPayload {
    #[serde(default)]
    pub durations: Vec<DurationSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationSample {
    #[serde(default)]
    pub name: Option<String>,
    pub duration_minutes: f64,
}

/// Check-ins grouped by purpose. Legacy rows may carry a null purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeCount {
    #[serde(default)]
    pub purpose: Option<String>,
    pub count: u64,
}

/// Check-ins grouped by destination (person or office visited).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationCount {
    #[serde(default)]
    pub destination: Option<String>,
    pub count: u64,
}

/// Requests grouped by approval status (`Approve`, `Reject`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

// ── Check-in ─────────────────────────────────────────────────────────

/// Body of `POST /scan-checkin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckinRequest {
    pub qr_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// The two successful shapes a check-in reply can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinReply {
    /// Visitor (or group) checked in or out.
    Completed {
        message: String,
        /// Per-member lines for group codes.
        details: Vec<String>,
    },
    /// `action = "show_modal"`: the backend wants purpose/destination
    /// confirmed before it records the visit.
    NeedsConfirmation {
        name: String,
        purpose: Option<String>,
        destination: Option<String>,
    },
}

/// Loose superset of every 2xx reply shape; narrowed into [`CheckinReply`].
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCheckinReply {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

impl From<RawCheckinReply> for CheckinReply {
    fn from(raw: RawCheckinReply) -> Self {
        if raw.action.as_deref() == Some("show_modal") {
            Self::NeedsConfirmation {
                name: raw.name.unwrap_or_default(),
                purpose: raw.purpose.filter(|p| !p.trim().is_empty()),
                destination: raw.destination.filter(|d| !d.trim().is_empty()),
            }
        } else {
            Self::Completed {
                message: raw.message.unwrap_or_default(),
                details: raw.details,
            }
        }
    }
}

/// Error body shape: `{"message": "..."}` (some routes use `error`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
