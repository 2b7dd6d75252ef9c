use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

use crate::db::{ReportRepository, StoreError};
use crate::models::hotel::LocationStats;
use crate::models::report::ReportRequest;
use crate::services::queue::{Delivery, MessageQueue, QueueError};
use crate::services::stats::{StatsError, StatsResolver};

const RECEIVE_BACKOFF: Duration = Duration::from_secs(1);

/// Result of a fully processed report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedReport {
    pub id: Uuid,
    pub stats: LocationStats,
}

/// Background worker draining the report queue.
///
/// Each delivery goes parse -> resolve stats -> update report, strictly in
/// that order. A failure at any step is logged and the delivery is dropped;
/// the report it refers to stays `Pending`. Failures never stop the loop.
pub struct ReportConsumer {
    reports: Arc<dyn ReportRepository>,
    queue: Arc<dyn MessageQueue>,
    stats: Arc<dyn StatsResolver>,
    receive_backoff: Duration,
}

impl ReportConsumer {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        queue: Arc<dyn MessageQueue>,
        stats: Arc<dyn StatsResolver>,
    ) -> Self {
        Self {
            reports,
            queue,
            stats,
            receive_backoff: RECEIVE_BACKOFF,
        }
    }

    /// Pause applied after a failed receive before trying again.
    pub fn with_receive_backoff(mut self, backoff: Duration) -> Self {
        self.receive_backoff = backoff;
        self
    }

    /// Start the consumer loop on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Receive and process deliveries until the queue reports it is closed.
    pub async fn run(&self) {
        tracing::info!("Report consumer started");

        loop {
            match self.queue.receive().await {
                Ok(Some(delivery)) => self.handle_delivery(&delivery).await,
                Ok(None) => {
                    tracing::trace!("No report requests available");
                }
                Err(QueueError::Closed) => {
                    tracing::warn!("Report queue closed, consumer stopping");
                    return;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to receive from report queue, will retry");
                    sleep(self.receive_backoff).await;
                }
            }
        }
    }

    /// Process one delivery and acknowledge it, whatever the outcome.
    pub async fn handle_delivery(&self, delivery: &Delivery) {
        let start = Instant::now();

        match self.process(&delivery.body).await {
            Ok(done) => {
                metrics::counter!("reports_completed_total").increment(1);
                metrics::histogram!("report_processing_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(
                    report_id = %done.id,
                    hotel_count = done.stats.hotel_count,
                    phone_count = done.stats.phone_count,
                    "Report completed"
                );
            }
            Err(e) => {
                metrics::counter!("reports_failed_total", "stage" => e.stage()).increment(1);
                tracing::error!(
                    report_id = ?e.report_id(),
                    stage = e.stage(),
                    error = %e,
                    "Dropping report request"
                );
            }
        }

        if let Err(e) = self.queue.ack(delivery).await {
            tracing::warn!(error = %e, "Failed to acknowledge report request");
        }
    }

    /// Parse the envelope, resolve stats for its location and complete the report.
    pub async fn process(&self, payload: &[u8]) -> Result<CompletedReport, ConsumerError> {
        let request = ReportRequest::from_bytes(payload).map_err(ConsumerError::Parse)?;

        tracing::debug!(report_id = %request.id, location = %request.location, "Resolving location stats");
        let stats = self
            .stats
            .fetch_stats(&request.location)
            .await
            .map_err(|source| ConsumerError::Resolve {
                id: request.id,
                location: request.location.clone(),
                source,
            })?;

        self.reports
            .complete_report(request.id, stats)
            .await
            .map_err(|source| ConsumerError::Update {
                id: request.id,
                source,
            })?;

        Ok(CompletedReport {
            id: request.id,
            stats,
        })
    }
}

/// Why a report request was dropped.
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("Invalid report request in message: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to fetch location stats for {location}: {source}")]
    Resolve {
        id: Uuid,
        location: String,
        #[source]
        source: StatsError,
    },

    #[error("Failed to update report {id}: {source}")]
    Update {
        id: Uuid,
        #[source]
        source: StoreError,
    },
}

impl ConsumerError {
    pub fn stage(&self) -> &'static str {
        match self {
            ConsumerError::Parse(_) => "parse",
            ConsumerError::Resolve { .. } => "resolve",
            ConsumerError::Update { .. } => "update",
        }
    }

    pub fn report_id(&self) -> Option<Uuid> {
        match self {
            ConsumerError::Parse(_) => None,
            ConsumerError::Resolve { id, .. } | ConsumerError::Update { id, .. } => Some(*id),
        }
    }
}
