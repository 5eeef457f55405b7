// Excel output (xlsx) for a normalized table, and read-back for inspection
//
// Output is one worksheet: header row first, then data rows, every cell a
// string. Absent cells are not written. There is no index column.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use csvxl_core::{Cell, NormalizedTable};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook as XlsxWorkbook};

use crate::error::PipelineError;

/// Excel's hard limit on rows per worksheet (header included)
pub const MAX_ROWS: usize = 1_048_576;

/// Excel's hard limit on columns per worksheet
pub const MAX_COLS: usize = 16_384;

/// Header style written above the data (bold, thin border, centered)
fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::Top)
}

/// Serialize a table to xlsx bytes
pub fn write_table(table: &NormalizedTable, sheet_name: &str) -> Result<Vec<u8>, PipelineError> {
    if table.row_count() + 1 > MAX_ROWS {
        return Err(PipelineError::Xlsx(format!(
            "{} rows exceed the worksheet limit of {}",
            table.row_count(),
            MAX_ROWS - 1
        )));
    }
    if table.column_count() > MAX_COLS {
        return Err(PipelineError::Xlsx(format!(
            "{} columns exceed the worksheet limit of {}",
            table.column_count(),
            MAX_COLS
        )));
    }

    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| PipelineError::Xlsx(format!("invalid sheet name '{}': {}", sheet_name, e)))?;

    let header = header_format();
    for (col, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, &column.name, &header)?;
    }

    for (col, column) in table.columns.iter().enumerate() {
        for (row, cell) in column.cells.iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!(
        "wrote {} x {} worksheet '{}' ({} bytes)",
        table.row_count(),
        table.column_count(),
        sheet_name,
        bytes.len()
    );
    Ok(bytes)
}

/// Read the first worksheet of an xlsx buffer back into a table.
///
/// Row 0 is taken as the header row. Every value comes back as text;
/// empty cells come back absent.
pub fn read_table(bytes: &[u8]) -> Result<NormalizedTable, PipelineError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| PipelineError::ReadBack(format!("not an xlsx file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::ReadBack("workbook contains no sheets".to_string()))?
        .map_err(|e| PipelineError::ReadBack(e.to_string()))?;

    let Some((end_row, end_col)) = range.end() else {
        return Ok(NormalizedTable::default());
    };

    let text_at = |row: u32, col: u32| -> Cell {
        match range.get_value((row, col)) {
            None | Some(Data::Empty) => None,
            Some(Data::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    };

    let headers: Vec<String> = (0..=end_col)
        .map(|col| text_at(0, col).unwrap_or_default())
        .collect();
    let rows = (1..=end_row).map(|row| (0..=end_col).map(|col| text_at(row, col)).collect());

    Ok(NormalizedTable::from_rows(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> NormalizedTable {
        NormalizedTable::from_rows(
            ["id", "name", "city"],
            vec![
                vec![Some("001".into()), Some("Ana".into()), Some("Natal".into())],
                vec![Some("002".into()), None, Some("Recife".into())],
            ],
        )
    }

    #[test]
    fn test_write_produces_zip_container() {
        let bytes = write_table(&sample_table(), "Sheet1").unwrap();
        // xlsx is a zip package
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_then_read_keeps_text_and_gaps() {
        let table = sample_table();
        let bytes = write_table(&table, "Sheet1").unwrap();
        let back = read_table(&bytes).unwrap();

        assert_eq!(back.headers(), vec!["id", "name", "city"]);
        assert_eq!(back.row(0), vec![Some("001"), Some("Ana"), Some("Natal")]);
        assert_eq!(back.row(1), vec![Some("002"), None, Some("Recife")]);
    }

    #[test]
    fn test_write_empty_table() {
        let bytes = write_table(&NormalizedTable::default(), "Sheet1").unwrap();
        let back = read_table(&bytes).unwrap();
        assert_eq!(back.column_count(), 0);
        assert!(back.is_empty());
    }

    #[test]
    fn test_invalid_sheet_name_rejected() {
        let err = write_table(&sample_table(), "bad/name").unwrap_err();
        assert!(matches!(err, PipelineError::Xlsx(_)));
    }

    #[test]
    fn test_read_garbage_is_error() {
        let err = read_table(b"not a workbook").unwrap_err();
        assert!(matches!(err, PipelineError::ReadBack(_)));
    }
}
