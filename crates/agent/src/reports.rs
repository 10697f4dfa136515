use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use frontdesk_core::domain::report::{ReportDescriptor, ReportKind, ReportRows};
use frontdesk_db::repositories::{EnrollmentRepository, ReportRepository, RepositoryError};

/// Builds report snapshots and records their audit metadata.
pub struct ReportService {
    enrollment: Arc<dyn EnrollmentRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl ReportService {
    pub fn new(
        enrollment: Arc<dyn EnrollmentRepository>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self { enrollment, reports }
    }

    pub async fn generate(&self, kind: ReportKind) -> Result<ReportDescriptor, RepositoryError> {
        self.generate_at(kind, Utc::now()).await
    }

    pub async fn generate_at(
        &self,
        kind: ReportKind,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportDescriptor, RepositoryError> {
        let rows = match kind {
            ReportKind::InscripcionesPendientes => {
                ReportRows::Students(self.enrollment.fetch_pending_enrollment_students().await?)
            }
            ReportKind::Carreras => ReportRows::Careers(self.enrollment.fetch_careers().await?),
        };
        let descriptor = ReportDescriptor::new(kind, rows, generated_at);

        // The export is still served when the audit row cannot be written.
        if let Err(store_error) = self.reports.insert_report_metadata(descriptor.metadata()).await {
            warn!(
                event_name = "agent.report.metadata_failed",
                report_id = %descriptor.id,
                error = %store_error,
                "report metadata was not recorded"
            );
        }

        info!(
            event_name = "agent.report.generated",
            report_id = %descriptor.id,
            kind = kind.as_str(),
            total = descriptor.total,
        );
        Ok(descriptor)
    }
}

/// What the chat reply says about a freshly generated report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: String,
    pub tipo: ReportKind,
    pub total_registros: usize,
    pub generated_at: DateTime<Utc>,
    pub descarga_excel: String,
    pub descarga_pdf: String,
}

impl From<&ReportDescriptor> for ReportSummary {
    fn from(descriptor: &ReportDescriptor) -> Self {
        let path = download_path(descriptor.kind);
        Self {
            id: descriptor.id.clone(),
            tipo: descriptor.kind,
            total_registros: descriptor.total,
            generated_at: descriptor.generated_at,
            descarga_excel: format!("{path}?formato=excel"),
            descarga_pdf: format!("{path}?formato=pdf"),
        }
    }
}

pub fn download_path(kind: ReportKind) -> String {
    format!("/reportes/{}", kind.as_str())
}
