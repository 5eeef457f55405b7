// Column and row pruning applied to a parsed table

use csvxl_core::NormalizedTable;

/// What cleaning removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub columns_dropped: usize,
    pub rows_dropped_empty: usize,
    pub rows_dropped_sparse: usize,
}

/// Prune a table in place, in this order:
///
/// 1. drop columns with no populated data cell (the header does not count)
/// 2. trim every header
/// 3. drop rows with no populated cell
/// 4. drop rows with `min_populated` or fewer populated cells
///
/// If any rows survive, columns that only had data in dropped rows are
/// removed as well so that no output column is entirely empty. A table
/// without rows keeps the headers that survived step 1.
pub fn clean_table(table: &mut NormalizedTable, min_populated: usize) -> CleanStats {
    let mut stats = CleanStats::default();

    let before = table.column_count();
    table.retain_columns(|c| !c.is_all_absent());
    stats.columns_dropped = before - table.column_count();

    for column in table.columns.iter_mut() {
        let trimmed = column.name.trim();
        if trimmed.len() != column.name.len() {
            column.name = trimmed.to_string();
        }
    }

    let before = table.row_count();
    table.retain_rows(|t, r| t.populated_in_row(r) > 0);
    stats.rows_dropped_empty = before - table.row_count();

    let before = table.row_count();
    table.retain_rows(|t, r| t.populated_in_row(r) > min_populated);
    stats.rows_dropped_sparse = before - table.row_count();

    if !table.is_empty() {
        let before = table.column_count();
        table.retain_columns(|c| !c.is_all_absent());
        stats.columns_dropped += before - table.column_count();
    }

    stats
}
