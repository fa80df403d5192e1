//! Report Export - Trial Balance Presentation
//!
//! Renders a resolved trial balance into the two downloadable encodings:
//!
//! - **xlsx**: one worksheet with a localized header row, data rows and a
//!   totals row
//! - **pdf**: landscape A4 table with title, dated subheader and a
//!   highlighted totals row
//!
//! Headers are bilingual (English/Arabic). The debit = credit invariant is
//! not checked here; the exporter renders whatever rows it is given.
//!
//! # Example
//!
//! ```rust,ignore
//! use report_export::{ExportFormat, Language, ReportDocument, ReportExporter};
//!
//! let document = ReportDocument::new(window, &rows);
//! let file = ReportExporter::new().export(&document, ExportFormat::Xlsx, Language::Arabic)?;
//! assert_eq!(file.file_name, "trial-balance-2024-06-30.xlsx");
//! ```

pub mod labels;
pub mod xlsx;
pub mod pdf;
pub mod error;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use core_kernel::ReportWindow;
use domain_ledger::{calculate_totals, TrialBalanceRow, TrialBalanceTotals};

pub use error::ExportError;
pub use labels::{Labels, Language};

/// Downloadable report encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type of the encoded file
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ExportError::unsupported("export format", s)),
        }
    }
}

/// Returns `trial-balance-<asOfDate>.<ext>`
pub fn export_file_name(as_of_date: NaiveDate, format: ExportFormat) -> String {
    format!("trial-balance-{}.{}", as_of_date.format("%Y-%m-%d"), format.extension())
}

/// The rows and totals of one report, ready for rendering
#[derive(Debug, Clone)]
pub struct ReportDocument<'a> {
    pub window: ReportWindow,
    pub rows: &'a [TrialBalanceRow],
    pub totals: TrialBalanceTotals,
}

impl<'a> ReportDocument<'a> {
    /// Creates a document, computing the totals footer from `rows`
    pub fn new(window: ReportWindow, rows: &'a [TrialBalanceRow]) -> Self {
        Self {
            window,
            rows,
            totals: calculate_totals(rows),
        }
    }
}

/// An encoded report file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    /// Language the labels were actually rendered in
    pub language: Language,
    pub bytes: Vec<u8>,
}

/// Renders report documents
#[derive(Debug, Clone, Default)]
pub struct ReportExporter {
    pdf_font: Option<Vec<u8>>,
}

impl ReportExporter {
    /// Creates an exporter using builtin PDF fonts
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a TrueType font for PDF output
    pub fn with_pdf_font(mut self, font: Vec<u8>) -> Self {
        self.pdf_font = Some(font);
        self
    }

    /// Loads a TrueType font for PDF output from disk
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Font` if the file cannot be read
    pub fn with_pdf_font_file(self, path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let font = std::fs::read(path).map_err(|source| ExportError::Font {
            path: path.display().to_string(),
            source,
        })?;
        Ok(self.with_pdf_font(font))
    }

    /// Returns true if PDFs can carry Arabic labels
    pub fn has_unicode_pdf_font(&self) -> bool {
        self.pdf_font.is_some()
    }

    /// Renders a document in the requested format and language
    ///
    /// Builtin PDF fonts only cover Latin text, so without a TrueType font
    /// an Arabic PDF request is rendered with English labels.
    ///
    /// # Errors
    ///
    /// Returns an `ExportError` if labels cannot be formatted or the encoder
    /// fails
    pub fn export(
        &self,
        document: &ReportDocument<'_>,
        format: ExportFormat,
        language: Language,
    ) -> Result<ExportedFile, ExportError> {
        let language = match format {
            ExportFormat::Pdf if language.is_rtl() && !self.has_unicode_pdf_font() => {
                warn!(requested = %language, "No Unicode PDF font configured, rendering English labels");
                Language::English
            }
            _ => language,
        };

        let labels = Labels::load(language, &document.window)?;
        let bytes = match format {
            ExportFormat::Xlsx => xlsx::render(document, &labels)?,
            ExportFormat::Pdf => pdf::render(document, &labels, self.pdf_font.as_deref())?,
        };

        debug!(
            %format,
            %language,
            rows = document.rows.len(),
            size = bytes.len(),
            "Rendered trial balance export"
        );

        Ok(ExportedFile {
            file_name: export_file_name(document.window.as_of_date(), format),
            content_type: format.content_type(),
            language,
            bytes,
        })
    }
}
