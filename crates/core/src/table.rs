// Tabular model produced by the normalization pipeline
//
// Column-major: every column owns its cells and all columns have the same
// length. `None` is the absent-value marker; an empty field read from a file
// is stored as `None`, never as `Some("")`.

/// One uploaded file as handed over by the presentation layer
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RawUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { filename: filename.into(), bytes: bytes.into() }
    }
}

pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn is_all_absent(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    pub columns: Vec<Column>,
}

impl NormalizedTable {
    /// Build a table from a header row and row-major data.
    ///
    /// Rows shorter than the header are padded with absent cells; extra
    /// fields beyond the header width are ignored (callers filter those
    /// rows out beforehand). Empty strings become absent cells.
    pub fn from_rows<H, R>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<Cell>>,
    {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column { name: name.into(), cells: Vec::new() })
            .collect();

        for row in rows {
            let mut fields = row.into_iter();
            for column in columns.iter_mut() {
                let cell = fields.next().flatten().filter(|v| !v.is_empty());
                column.cells.push(cell);
            }
        }

        Self { columns }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.cells.len()).unwrap_or(0)
    }

    /// True when there are no data rows (headers may still exist)
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.columns
            .get(col)
            .and_then(|c| c.cells.get(row))
            .and_then(|v| v.as_deref())
    }

    pub fn row(&self, row: usize) -> Vec<Option<&str>> {
        (0..self.column_count()).map(|col| self.cell(row, col)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&str>>> + '_ {
        (0..self.row_count()).map(move |r| self.row(r))
    }

    /// Number of non-empty cells in a row
    pub fn populated_in_row(&self, row: usize) -> usize {
        self.columns
            .iter()
            .filter(|c| matches!(c.cells.get(row), Some(Some(_))))
            .count()
    }

    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Column) -> bool,
    {
        self.columns.retain(|c| keep(c));
    }

    /// Keep rows for which `keep(table, row_index)` is true
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&NormalizedTable, usize) -> bool,
    {
        let mask: Vec<bool> = (0..self.row_count()).map(|r| keep(self, r)).collect();
        for column in self.columns.iter_mut() {
            let mut idx = 0;
            column.cells.retain(|_| {
                let kept = mask[idx];
                idx += 1;
                kept
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Cell {
        Some(v.to_string())
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = NormalizedTable::from_rows(
            ["a", "b", "c"],
            vec![vec![s("1"), s("2"), s("3")], vec![s("4"), s("5")]],
        );
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1), vec![Some("4"), Some("5"), None]);
    }

    #[test]
    fn test_from_rows_empty_strings_are_absent() {
        let table = NormalizedTable::from_rows(["a", "b"], vec![vec![s(""), s("x")]]);
        assert_eq!(table.cell(0, 0), None);
        assert_eq!(table.cell(0, 1), Some("x"));
        assert_eq!(table.populated_in_row(0), 1);
    }

    #[test]
    fn test_retain_rows_keeps_columns_aligned() {
        let mut table = NormalizedTable::from_rows(
            ["k", "v"],
            vec![
                vec![s("a"), s("1")],
                vec![s("b"), None],
                vec![s("c"), s("3")],
            ],
        );
        table.retain_rows(|t, r| t.populated_in_row(r) == 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(0), vec![Some("a"), Some("1")]);
        assert_eq!(table.row(1), vec![Some("c"), Some("3")]);
        assert!(table.columns.iter().all(|c| c.cells.len() == 2));
    }

    #[test]
    fn test_headers_only_table_is_empty() {
        let table = NormalizedTable::from_rows(["a", "b"], Vec::<Vec<Cell>>::new());
        assert!(table.is_empty());
        assert_eq!(table.headers(), vec!["a", "b"]);
    }
}
