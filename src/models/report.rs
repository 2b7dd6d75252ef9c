use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a location report.
///
/// A report only ever moves from `Pending` to `Completed`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Completed,
}

/// A hotel/phone count report for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub location: String,
    pub hotel_count: i32,
    pub phone_count: i32,
    pub requested_at: DateTime<Utc>,
    pub status: ReportStatus,
}

impl Report {
    /// A freshly requested report: new id, zero counts, `Pending`.
    pub fn pending(location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            location: location.into(),
            hotel_count: 0,
            phone_count: 0,
            requested_at: Utc::now(),
            status: ReportStatus::Pending,
        }
    }
}

/// Envelope published to the report queue.
///
/// Wire format is the JSON object `{"id": "<uuid>", "location": "<string>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub id: Uuid,
    pub location: String,
}

impl ReportRequest {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

impl From<&Report> for ReportRequest {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            location: report.location.clone(),
        }
    }
}

/// Body of `POST /reports`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[garde(length(min = 1))]
    pub location: String,
}
