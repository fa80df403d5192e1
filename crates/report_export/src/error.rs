//! Export errors

use thiserror::Error;

/// Errors that can occur while rendering a report
#[derive(Debug, Error)]
pub enum ExportError {
    /// Workbook generation failed
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// PDF generation failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A font file could not be read
    #[error("Failed to load font {path}: {source}")]
    Font {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A label resource failed to parse or format
    #[error("Localization error: {0}")]
    Localization(String),

    /// Unknown export format or language code
    #[error("Unsupported {kind}: {value}")]
    Unsupported { kind: &'static str, value: String },
}

impl ExportError {
    pub fn pdf(message: impl Into<String>) -> Self {
        Self::Pdf(message.into())
    }

    pub fn localization(message: impl Into<String>) -> Self {
        Self::Localization(message.into())
    }

    pub fn unsupported(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unsupported {
            kind,
            value: value.into(),
        }
    }
}
