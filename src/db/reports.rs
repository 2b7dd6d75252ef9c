use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use super::StoreError;
use crate::models::hotel::LocationStats;
use crate::models::report::{Report, ReportStatus};

/// Durable storage for location reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create_report(&self, report: &Report) -> Result<(), StoreError>;

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StoreError>;

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError>;

    /// Overwrite the counts and mark the report `Completed` in one write.
    ///
    /// Fails with [`StoreError::NotFound`] when no report has this id.
    async fn complete_report(&self, id: Uuid, stats: LocationStats) -> Result<(), StoreError>;
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn report_from_row(row: &PgRow) -> Result<Report, StoreError> {
    let status: String = row.try_get("status")?;
    let status = ReportStatus::from_str(&status).map_err(|_| StoreError::InvalidColumn {
        column: "status",
        value: status.clone(),
    })?;

    Ok(Report {
        id: row.try_get("id")?,
        location: row.try_get("location")?,
        hotel_count: row.try_get("hotel_count")?,
        phone_count: row.try_get("phone_count")?,
        requested_at: row.try_get("requested_at")?,
        status,
    })
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create_report(&self, report: &Report) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, location, hotel_count, phone_count, requested_at, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(report.id)
        .bind(&report.location)
        .bind(report.hotel_count)
        .bind(report.phone_count)
        .bind(report.requested_at)
        .bind(report.status.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, location, hotel_count, phone_count, requested_at, status
            FROM reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, location, hotel_count, phone_count, requested_at, status
            FROM reports
            ORDER BY requested_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
    }

    async fn complete_report(&self, id: Uuid, stats: LocationStats) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET hotel_count = $1,
                phone_count = $2,
                status = $3
            WHERE id = $4
            "#,
        )
        .bind(stats.hotel_count)
        .bind(stats.phone_count)
        .bind(ReportStatus::Completed.as_ref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "report",
                id,
            });
        }

        Ok(())
    }
}
