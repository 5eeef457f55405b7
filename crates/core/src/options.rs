use crate::separator::Separator;

/// Characters inspected when guessing the separator
pub const DETECT_SAMPLE_CHARS: usize = 4096;

/// Rows with this many populated cells or fewer are treated as noise
pub const MIN_POPULATED_CELLS: usize = 2;

/// Worksheet name used for the single output sheet
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Download name offered for a batch archive
pub const DEFAULT_ARCHIVE_NAME: &str = "Arquivos_Convertidos.zip";

/// Knobs for one conversion. Defaults reproduce the web converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Force a separator instead of detecting one per file
    pub separator: Option<Separator>,
    pub sample_chars: usize,
    pub min_populated: usize,
    pub sheet_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            separator: None,
            sample_chars: DETECT_SAMPLE_CHARS,
            min_populated: MIN_POPULATED_CELLS,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}
