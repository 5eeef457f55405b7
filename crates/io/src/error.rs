use std::fmt;

/// Unrecovered failure while converting one file or building the archive.
///
/// Invalid UTF-8 and malformed rows never show up here: the first is
/// replaced during decoding and the second is skipped by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No files were supplied
    NoInput,
    /// The text has no header row to build columns from
    NoColumns,
    /// Writing the workbook failed
    Xlsx(String),
    /// Writing the ZIP archive failed
    Archive(String),
    /// Reading a workbook back failed
    ReadBack(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::NoInput => write!(f, "no files to convert"),
            PipelineError::NoColumns => write!(f, "no columns to parse from file"),
            PipelineError::Xlsx(msg) => write!(f, "failed to write spreadsheet: {}", msg),
            PipelineError::Archive(msg) => write!(f, "failed to write archive: {}", msg),
            PipelineError::ReadBack(msg) => write!(f, "failed to read spreadsheet: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<rust_xlsxwriter::XlsxError> for PipelineError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        PipelineError::Xlsx(e.to_string())
    }
}

impl From<zip::result::ZipError> for PipelineError {
    fn from(e: zip::result::ZipError) -> Self {
        PipelineError::Archive(e.to_string())
    }
}
