//! PDF export of tabular reports.
//!
//! Reports are rendered to HTML with Tera and converted with wkhtmltopdf when
//! it is on `PATH`. Without it the HTML itself is served for browser printing.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};

use frontdesk_core::domain::report::TabularReport;

use crate::export::ReportRenderError;

pub const TABULAR_TEMPLATE: &str = "tabular.html.tera";
const AUTOESCAPE_SUFFIXES: &[&str] = &[".html", ".htm", ".xml", ".html.tera"];
const EMBEDDED_TABULAR_TEMPLATE: &str =
    include_str!("../../../templates/reports/tabular.html.tera");

#[derive(Clone, Debug)]
pub struct PdfGenerator {
    tera: Tera,
    wkhtmltopdf_path: Option<PathBuf>,
}

impl PdfGenerator {
    /// Load templates from `template_dir`, falling back to the embedded copy
    /// when the directory is missing or lacks the tabular template.
    pub fn new(template_dir: &Path) -> Result<Self, ReportRenderError> {
        let mut tera = if template_dir.is_dir() {
            Tera::new(&format!("{}/**/*", template_dir.display()))
                .map_err(|error| ReportRenderError::Template(error.to_string()))?
        } else {
            warn!(
                event_name = "server.pdf.template_dir_missing",
                template_dir = %template_dir.display(),
                "using embedded report template"
            );
            Tera::default()
        };
        tera.autoescape_on(AUTOESCAPE_SUFFIXES.to_vec());

        if !tera.get_template_names().any(|name| name == TABULAR_TEMPLATE) {
            tera.add_raw_template(TABULAR_TEMPLATE, EMBEDDED_TABULAR_TEMPLATE)
                .map_err(|error| ReportRenderError::Template(error.to_string()))?;
        }

        Ok(Self { tera, wkhtmltopdf_path: locate_wkhtmltopdf() })
    }

    pub fn with_embedded_templates() -> Result<Self, ReportRenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(AUTOESCAPE_SUFFIXES.to_vec());
        tera.add_raw_template(TABULAR_TEMPLATE, EMBEDDED_TABULAR_TEMPLATE)
            .map_err(|error| ReportRenderError::Template(error.to_string()))?;

        Ok(Self { tera, wkhtmltopdf_path: locate_wkhtmltopdf() })
    }

    /// Never shell out; always produce HTML.
    pub fn html_only(mut self) -> Self {
        self.wkhtmltopdf_path = None;
        self
    }

    /// Path of the wkhtmltopdf binary in use, if any.
    pub fn converter(&self) -> Option<&Path> {
        self.wkhtmltopdf_path.as_deref()
    }

    pub fn render_html(&self, report: &TabularReport) -> Result<String, ReportRenderError> {
        let mut context = Context::new();
        context.insert("title", &report.title);
        context.insert(
            "generated_at",
            &report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert("columns", &report.columns);
        context.insert("rows", &report.rows);
        context.insert("total", &report.rows.len());

        self.tera
            .render(TABULAR_TEMPLATE, &context)
            .map_err(|error| ReportRenderError::Template(error.to_string()))
    }

    /// PDF bytes when conversion works, the rendered HTML otherwise.
    pub async fn render(&self, report: &TabularReport) -> Result<PdfResult, ReportRenderError> {
        let html = self.render_html(report)?;

        let Some(wkhtmltopdf) = self.wkhtmltopdf_path.as_deref() else {
            return Ok(PdfResult::Html(html));
        };

        match convert_html_to_pdf(&html, wkhtmltopdf).await {
            Ok(pdf_bytes) => Ok(PdfResult::Pdf(pdf_bytes)),
            Err(conversion_error) => {
                warn!(
                    event_name = "server.pdf.conversion_failed",
                    error = %conversion_error,
                    "PDF conversion failed, falling back to HTML"
                );
                Ok(PdfResult::Html(html))
            }
        }
    }
}

fn locate_wkhtmltopdf() -> Option<PathBuf> {
    let path = which::which("wkhtmltopdf").ok();
    match &path {
        Some(found) => info!(event_name = "server.pdf.converter_found", path = %found.display()),
        None => warn!(
            event_name = "server.pdf.converter_missing",
            "wkhtmltopdf not found in PATH, PDF exports will be served as HTML"
        ),
    }
    path
}

async fn convert_html_to_pdf(html: &str, wkhtmltopdf: &Path) -> Result<Vec<u8>, ReportRenderError> {
    let temp_dir = std::env::temp_dir();
    let stem = uuid::Uuid::new_v4().simple().to_string();
    let html_path = temp_dir.join(format!("reporte_{stem}.html"));
    let pdf_path = temp_dir.join(format!("reporte_{stem}.pdf"));

    tokio::fs::write(&html_path, html).await?;

    let output = Command::new(wkhtmltopdf)
        .args(["--page-size", "A4", "--orientation", "Landscape"])
        .args(["--margin-top", "10mm", "--margin-bottom", "10mm"])
        .args(["--margin-left", "10mm", "--margin-right", "10mm"])
        .args(["--encoding", "utf-8", "--quiet"])
        .arg(&html_path)
        .arg(&pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let result = match output {
        Ok(output) if output.status.success() => tokio::fs::read(&pdf_path).await.map_err(ReportRenderError::Io),
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            error!(event_name = "server.pdf.wkhtmltopdf_failed", stderr = %stderr);
            Err(ReportRenderError::Conversion(stderr))
        }
        Err(spawn_error) => Err(ReportRenderError::Io(spawn_error)),
    };

    let _ = tokio::fs::remove_file(&html_path).await;
    let _ = tokio::fs::remove_file(&pdf_path).await;

    result
}

pub enum PdfResult {
    Pdf(Vec<u8>),
    Html(String),
}

impl PdfResult {
    pub fn into_response(self, filename: &str) -> Response {
        match self {
            PdfResult::Pdf(bytes) => (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
                ],
                bytes,
            )
                .into_response(),
            PdfResult::Html(html) => {
                ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
            }
        }
    }
}
