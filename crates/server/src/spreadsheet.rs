use rust_xlsxwriter::{Format, Workbook};

use frontdesk_core::domain::report::TabularReport;

use crate::export::ReportRenderError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME_MAX_CHARS: usize = 31;
const HEADER_ROW: u32 = 3;

/// Title, timestamp and row count on top, then a bold header row and the data.
pub fn render_workbook(report: &TabularReport) -> Result<Vec<u8>, ReportRenderError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(report.title.chars().take(SHEET_NAME_MAX_CHARS).collect::<String>())?;
    worksheet.write_string_with_format(0, 0, &report.title, &bold)?;
    worksheet.write_string(
        1,
        0,
        format!("Generado: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    )?;
    worksheet.write_string(2, 0, format!("Total de registros: {}", report.rows.len()))?;

    for (column, name) in report.columns.iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, column as u16, name, &bold)?;
    }
    for (offset, row) in report.rows.iter().enumerate() {
        let row_number = HEADER_ROW + 1 + offset as u32;
        for (column, cell) in row.iter().enumerate() {
            worksheet.write_string(row_number, column as u16, cell)?;
        }
    }
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use frontdesk_core::domain::report::TabularReport;

    use super::render_workbook;

    #[test]
    fn workbook_is_a_zip_container() {
        let report = TabularReport {
            title: "Estudiantes con inscripción pendiente".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).single().expect("time"),
            columns: vec!["Matrícula".to_string(), "Nombre".to_string()],
            rows: vec![vec!["A1".to_string(), "Ana Ruiz".to_string()]],
        };

        let bytes = render_workbook(&report).expect("workbook");

        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn empty_report_still_renders() {
        let report = TabularReport {
            title: "Catálogo de carreras activas".to_string(),
            generated_at: Utc::now(),
            columns: vec!["Código".to_string()],
            rows: Vec::new(),
        };

        assert!(render_workbook(&report).is_ok());
    }
}
