// Check-in endpoint
//
// A single POST covers scanner input, manual entry and the confirmation
// resubmission; the reply shape tells the caller which branch it is in.

use tracing::debug;

use crate::client::DashboardClient;
use crate::error::Error;
use crate::models::{CheckinReply, CheckinRequest, RawCheckinReply};

pub const CHECKIN_PATH: &str = "scan-checkin";

impl DashboardClient {
    /// Submit a scanned or typed code.
    ///
    /// `POST /scan-checkin` with `{qr_data, purpose?, destination?}`
    pub async fn scan_checkin(&self, request: &CheckinRequest) -> Result<CheckinReply, Error> {
        debug!(
            code_len = request.qr_data.len(),
            with_purpose = request.purpose.is_some(),
            "submitting check-in"
        );
        let raw: RawCheckinReply = self.post_json(CHECKIN_PATH, request).await?;
        Ok(raw.into())
    }
}
