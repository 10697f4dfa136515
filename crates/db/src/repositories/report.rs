use chrono::SecondsFormat;

use frontdesk_core::domain::report::ReportMetadata;

use super::{ReportRepository, RepositoryError};
use crate::DbPool;

pub struct SqlReportRepository {
    pool: DbPool,
}

impl SqlReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReportRepository for SqlReportRepository {
    async fn insert_report_metadata(
        &self,
        metadata: ReportMetadata,
    ) -> Result<(), RepositoryError> {
        // Two reports of the same kind within one second share an id.
        sqlx::query(
            "INSERT INTO reportes_generados (id, tipo, total_registros, generated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                tipo = excluded.tipo,
                total_registros = excluded.total_registros,
                generated_at = excluded.generated_at",
        )
        .bind(&metadata.id)
        .bind(metadata.kind.as_str())
        .bind(metadata.total_rows)
        .bind(metadata.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
