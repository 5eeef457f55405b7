// Single-file conversion: bytes -> text -> repaired text -> table -> xlsx
//
// The pipeline holds no state of its own. The caller's `Session` is the only
// thing written to, and only to remember the separator that was used.

use std::path::Path;
use std::time::Instant;

use csvxl_core::{ConvertOptions, NormalizedTable, RawUpload, Separator, Session};
use serde::Serialize;

use crate::clean::clean_table;
use crate::csv::{decode_lossy, detect_separator, parse_table, repair_quoted_newlines_counted};
use crate::error::PipelineError;
use crate::xlsx;

/// Extension given to every converted file
pub const XLSX_EXTENSION: &str = "xlsx";

/// Per-file statistics for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub separator: Separator,
    /// True when the separator came from options instead of detection
    pub separator_forced: bool,
    pub replaced_invalid_utf8: bool,
    pub repaired_line_breaks: usize,
    pub rows_read: usize,
    pub rows_malformed: usize,
    pub columns_dropped: usize,
    pub rows_dropped_empty: usize,
    pub rows_dropped_sparse: usize,
    pub rows_written: usize,
    pub columns_written: usize,
    pub duration_ms: u128,
}

impl ConversionReport {
    /// One-line summary, e.g. "12 rows · 4 columns · semicolon"
    pub fn summary(&self) -> String {
        format!(
            "{} row{} · {} column{} · {}",
            self.rows_written,
            if self.rows_written == 1 { "" } else { "s" },
            self.columns_written,
            if self.columns_written == 1 { "" } else { "s" },
            self.separator,
        )
    }

    pub fn has_warnings(&self) -> bool {
        self.replaced_invalid_utf8 || self.rows_malformed > 0 || self.rows_written == 0
    }

    /// Actionable warnings only; None when nothing needs attention
    pub fn warning_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.rows_written == 0 {
            parts.push("no data rows left after cleaning".to_string());
        }
        if self.rows_malformed > 0 {
            parts.push(format!(
                "{} malformed row{} skipped",
                self.rows_malformed,
                if self.rows_malformed == 1 { "" } else { "s" }
            ));
        }
        if self.replaced_invalid_utf8 {
            parts.push("invalid UTF-8 replaced".to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Result of converting one file
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Download name: the upload's base name with an .xlsx extension
    pub output_name: String,
    pub bytes: Vec<u8>,
    pub table: NormalizedTable,
    pub report: ConversionReport,
}

/// Base name of `filename` with its last extension replaced by `.xlsx`
pub fn output_name(filename: &str) -> String {
    // Uploads from Windows browsers may carry backslash paths
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("converted");
    format!("{}.{}", stem, XLSX_EXTENSION)
}

/// Normalize text into a cleaned table without serializing it
pub fn normalize_text(
    text: &str,
    options: &ConvertOptions,
    report: &mut ConversionReport,
) -> Result<NormalizedTable, PipelineError> {
    let (repaired, repaired_line_breaks) = repair_quoted_newlines_counted(text);
    report.repaired_line_breaks = repaired_line_breaks;

    let separator = match options.separator {
        Some(forced) => {
            report.separator_forced = true;
            forced
        }
        None => detect_separator(&repaired, options.sample_chars),
    };
    report.separator = separator;

    let parsed = parse_table(&repaired, separator)?;
    report.rows_read = parsed.rows_read;
    report.rows_malformed = parsed.rows_malformed;

    let mut table = parsed.table;
    let stats = clean_table(&mut table, options.min_populated);
    report.columns_dropped = stats.columns_dropped;
    report.rows_dropped_empty = stats.rows_dropped_empty;
    report.rows_dropped_sparse = stats.rows_dropped_sparse;
    report.rows_written = table.row_count();
    report.columns_written = table.column_count();

    Ok(table)
}

/// Convert one upload to xlsx.
///
/// Records the separator in `session` as the default for the next file.
/// An upload that cleans down to zero rows still produces a workbook (with
/// whatever headers survived); the report flags it.
pub fn convert(
    upload: &RawUpload,
    options: &ConvertOptions,
    session: &mut Session,
) -> Result<Conversion, PipelineError> {
    let start = Instant::now();
    let mut report = ConversionReport::default();

    let (text, replaced) = decode_lossy(&upload.bytes);
    report.replaced_invalid_utf8 = replaced;

    let table = normalize_text(&text, options, &mut report)?;
    session.remember(report.separator);

    if table.is_empty() {
        log::warn!("{}: no data rows left after cleaning", upload.filename);
    }

    let bytes = xlsx::write_table(&table, &options.sheet_name)?;
    report.duration_ms = start.elapsed().as_millis();

    log::info!("{}: {}", upload.filename, report.summary());

    Ok(Conversion {
        output_name: output_name(&upload.filename),
        bytes,
        table,
        report,
    })
}
