//! CLI Exit Code Registry
//!
//! Single source of truth for csvxl exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success (a batch with some failures still counts)         |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad args, input that is not a `.csv` file)   |
//! | 3    | I/O error reading inputs or writing outputs               |
//! | 4    | Input could not be parsed (no columns)                    |
//! | 5    | Workbook or archive could not be written or read          |
//! | 6    | Batch where every file failed                             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

use csvxl_io::PipelineError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, rejected input files.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input or write an output.
pub const EXIT_IO: u8 = 3;

/// The CSV had nothing to parse.
pub const EXIT_PARSE: u8 = 4;

/// Writing the workbook or archive failed, or a workbook could not be read.
pub const EXIT_FORMAT: u8 = 5;

/// Every file of a multi-file conversion failed.
pub const EXIT_BATCH_FAILED: u8 = 6;

/// Map a pipeline error to its exit code.
pub fn pipeline_exit_code(err: &PipelineError) -> u8 {
    match err {
        PipelineError::NoInput => EXIT_USAGE,
        PipelineError::NoColumns => EXIT_PARSE,
        PipelineError::Xlsx(_) | PipelineError::Archive(_) | PipelineError::ReadBack(_) => {
            EXIT_FORMAT
        }
    }
}
