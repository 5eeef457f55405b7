// CSV text handling: lossy decode, quoted-newline repair, separator detection, parse
//
// Parsing is a literal split on the separator. Quote characters carry no
// meaning here (they are kept in the field text), which matches how the
// converter has always read these exports.

use std::borrow::Cow;

use csvxl_core::{Cell, NormalizedTable, Separator};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::PipelineError;

/// A quote, optional whitespace, a line break, optional whitespace, a quote
static QUOTED_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""\s*\n\s*""#).unwrap());

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode bytes as UTF-8, substituting U+FFFD for invalid sequences.
///
/// Never fails. The flag reports whether any substitution happened.
/// A leading byte-order mark is dropped so it cannot end up in the first header.
pub fn decode_lossy(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    let replaced = matches!(text, Cow::Owned(_));
    if replaced {
        log::warn!("input is not valid UTF-8; invalid sequences replaced");
    }
    (text, replaced)
}

/// Join fields that an export split across lines (`"` ws* `\n` ws* `"` -> one space).
///
/// Runs before detection and parsing. Replacement repeats until nothing
/// matches, so applying it twice gives the same text.
pub fn repair_quoted_newlines(text: &str) -> Cow<'_, str> {
    repair_quoted_newlines_counted(text).0
}

/// `repair_quoted_newlines` plus the number of line breaks collapsed
pub fn repair_quoted_newlines_counted(text: &str) -> (Cow<'_, str>, usize) {
    let mut count = QUOTED_NEWLINE.find_iter(text).count();
    if count == 0 {
        return (Cow::Borrowed(text), 0);
    }

    let mut repaired = QUOTED_NEWLINE.replace_all(text, " ").into_owned();
    // A collapse can leave a quote next to a line break that the previous
    // pass already stepped over. Each pass shortens the text, so this ends.
    loop {
        let more = QUOTED_NEWLINE.find_iter(&repaired).count();
        if more == 0 {
            break;
        }
        count += more;
        repaired = QUOTED_NEWLINE.replace_all(&repaired, " ").into_owned();
    }
    (Cow::Owned(repaired), count)
}

/// Pick comma or semicolon from the first `sample_chars` characters.
///
/// Comma only when the sample has a comma and no semicolon; semicolon otherwise.
pub fn detect_separator(text: &str, sample_chars: usize) -> Separator {
    let end = text
        .char_indices()
        .nth(sample_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let sample = &text[..end];

    if sample.contains(',') && !sample.contains(';') {
        Separator::Comma
    } else {
        Separator::Semicolon
    }
}

/// Parsed CSV before cleaning
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub table: NormalizedTable,
    /// Data records seen, including skipped ones
    pub rows_read: usize,
    /// Records skipped for having more fields than the header
    pub rows_malformed: usize,
}

/// Split text into a header row and data rows.
///
/// The first non-blank line is the header. Blank and whitespace-only lines
/// are ignored. Rows shorter than the header are padded with absent cells.
/// Empty fields past the header width (a trailing separator) are dropped;
/// rows that still have more fields than the header are skipped.
pub fn parse_table(text: &str, separator: Separator) -> Result<ParsedTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator.as_byte())
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = loop {
        match records.next() {
            Some(Ok(record)) if is_blank(&record) => continue,
            Some(Ok(record)) => break record.iter().map(str::to_string).collect(),
            Some(Err(e)) => log::warn!("skipping unreadable header line: {}", e),
            None => return Err(PipelineError::NoColumns),
        }
    };
    let width = headers.len();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut rows_read = 0;
    let mut rows_malformed = 0;

    for result in records {
        let record = match result {
            Ok(record) if is_blank(&record) => continue,
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping unreadable row: {}", e);
                rows_read += 1;
                rows_malformed += 1;
                continue;
            }
        };
        rows_read += 1;

        let mut fields: Vec<&str> = record.iter().collect();
        while fields.len() > width && fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }

        if fields.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            log::warn!(
                "skipping line {}: expected {} fields, saw {}",
                line,
                width,
                fields.len()
            );
            rows_malformed += 1;
            continue;
        }

        rows.push(fields.into_iter().map(|f| Some(f.to_string())).collect());
    }

    log::debug!(
        "parsed {} columns, {} rows ({} malformed) with {} separator",
        width,
        rows.len(),
        rows_malformed,
        separator
    );

    Ok(ParsedTable {
        table: NormalizedTable::from_rows(headers, rows),
        rows_read,
        rows_malformed,
    })
}

/// A line holding nothing but whitespace
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}
