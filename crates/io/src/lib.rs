// CSV normalization pipeline and spreadsheet/archive output

pub mod archive;
pub mod batch;
pub mod clean;
pub mod csv;
pub mod error;
pub mod pipeline;
pub mod xlsx;

pub use batch::{convert_batch, ArchiveEntry, ArchiveResult, BatchOutcome, FileFailure};
pub use csvxl_core::options::DEFAULT_ARCHIVE_NAME;
pub use error::PipelineError;
pub use pipeline::{convert, output_name, Conversion, ConversionReport};

/// MIME type for a single converted workbook
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type for the batch archive
pub const ZIP_MIME: &str = "application/zip";
