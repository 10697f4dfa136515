use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use frontdesk_agent::AssistantRuntime;
use frontdesk_core::domain::report::ReportKind;
use frontdesk_core::errors::{ApplicationError, InterfaceError};

use crate::errors::{correlation_id, ApiError};
use crate::export::ExportFormat;
use crate::pdf::PdfGenerator;
use crate::spreadsheet::{render_workbook, XLSX_CONTENT_TYPE};

#[derive(Clone)]
pub struct ReportsState {
    runtime: Arc<AssistantRuntime>,
    pdf: Arc<PdfGenerator>,
}

impl ReportsState {
    pub fn new(runtime: Arc<AssistantRuntime>, pdf: Arc<PdfGenerator>) -> Self {
        Self { runtime, pdf }
    }
}

pub fn router(runtime: Arc<AssistantRuntime>, pdf: Arc<PdfGenerator>) -> Router {
    Router::new()
        .route("/reportes/{tipo}", get(export_report))
        .with_state(ReportsState::new(runtime, pdf))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub formato: Option<String>,
}

pub async fn export_report(
    Path(tipo): Path<String>,
    Query(query): Query<ExportQuery>,
    State(state): State<ReportsState>,
) -> Result<Response, ApiError> {
    let correlation_id = correlation_id();

    let kind = ReportKind::parse(&tipo).ok_or_else(|| {
        ApiError::from(InterfaceError::not_found(
            format!("unknown report type `{tipo}`"),
            &correlation_id,
        ))
    })?;
    let format = ExportFormat::parse(query.formato.as_deref()).ok_or_else(|| {
        ApiError::bad_request("Formato no soportado. Usa excel o pdf.", &correlation_id)
    })?;

    let descriptor = state.runtime.generate_report(kind).await.map_err(|store_error| {
        error!(
            event_name = "server.reports.query_failed",
            correlation_id = %correlation_id,
            kind = kind.as_str(),
            error = %store_error,
            "report data could not be loaded"
        );
        ApiError::from(
            ApplicationError::Persistence(store_error.to_string()).into_interface(&correlation_id),
        )
    })?;

    let table = descriptor.to_table();
    let filename = format!("{}.{}", descriptor.id, format.extension());
    let render_failed = |render_error: crate::export::ReportRenderError| {
        error!(
            event_name = "server.reports.render_failed",
            correlation_id = %correlation_id,
            report_id = %descriptor.id,
            error = %render_error,
            "report could not be rendered"
        );
        ApiError::from(
            ApplicationError::Rendering(render_error.to_string()).into_interface(&correlation_id),
        )
    };

    let response = match format {
        ExportFormat::Excel => {
            let bytes = render_workbook(&table).map_err(render_failed)?;
            (
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
                ],
                bytes,
            )
                .into_response()
        }
        ExportFormat::Pdf => state.pdf.render(&table).await.map_err(render_failed)?.into_response(&filename),
    };

    info!(
        event_name = "server.reports.exported",
        correlation_id = %correlation_id,
        report_id = %descriptor.id,
        format = format.extension(),
        rows = descriptor.total,
    );
    Ok(response)
}
