use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Pdf,
}

impl ExportFormat {
    /// Spreadsheet when no format was requested.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("excel") | Some("xlsx") => Some(Self::Excel),
            Some("pdf") => Some(Self::Pdf),
            Some(_) => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportRenderError {
    #[error("template error: {0}")]
    Template(String),
    #[error("pdf conversion failed: {0}")]
    Conversion(String),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::ExportFormat;

    #[test]
    fn format_defaults_to_spreadsheet() {
        assert_eq!(ExportFormat::parse(None), Some(ExportFormat::Excel));
        assert_eq!(ExportFormat::parse(Some("EXCEL")), Some(ExportFormat::Excel));
        assert_eq!(ExportFormat::parse(Some("pdf")), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse(Some("csv")), None);
    }
}
