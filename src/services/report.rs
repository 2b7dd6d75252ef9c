use std::sync::Arc;
use uuid::Uuid;

use crate::db::{ReportRepository, StoreError};
use crate::models::report::{Report, ReportRequest};
use crate::services::queue::{MessageQueue, QueueError};

/// Creates reports and hands them to the report queue.
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    queue: Arc<dyn MessageQueue>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>, queue: Arc<dyn MessageQueue>) -> Self {
        Self { reports, queue }
    }

    /// Store a `Pending` report for `location`, then publish its envelope.
    ///
    /// The record is written before anything is published. If publishing
    /// fails the `Pending` record stays behind and the error is returned;
    /// calling again creates a second report rather than resuming the first.
    /// `location` must already be validated as non-empty.
    #[tracing::instrument(skip(self))]
    pub async fn request_report_generation(&self, location: &str) -> Result<Report, ReportError> {
        let report = Report::pending(location);

        self.reports
            .create_report(&report)
            .await
            .map_err(ReportError::Persist)?;

        let payload = ReportRequest::from(&report)
            .to_bytes()
            .map_err(|source| ReportError::Encode {
                id: report.id,
                source,
            })?;

        if let Err(source) = self.queue.publish(&payload).await {
            metrics::counter!("report_publish_failures_total").increment(1);
            tracing::error!(
                report_id = %report.id,
                error = %source,
                "Report stored but not enqueued; it will stay pending"
            );
            return Err(ReportError::Publish {
                id: report.id,
                source,
            });
        }

        metrics::counter!("reports_requested_total").increment(1);
        tracing::info!(report_id = %report.id, "Report generation requested");

        Ok(report)
    }

    pub async fn list_reports(&self) -> Result<Vec<Report>, ReportError> {
        self.reports.list_reports().await.map_err(ReportError::Persist)
    }

    pub async fn get_report(&self, id: Uuid) -> Result<Option<Report>, ReportError> {
        self.reports.get_report(id).await.map_err(ReportError::Persist)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to save report: {0}")]
    Persist(#[source] StoreError),

    #[error("Failed to encode report request {id}: {source}")]
    Encode {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to publish report generation request {id}: {source}")]
    Publish {
        id: Uuid,
        #[source]
        source: QueueError,
    },
}
