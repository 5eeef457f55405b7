// Multi-file conversion with per-file isolation and ZIP aggregation

use std::fmt;

use csvxl_core::{ConvertOptions, RawUpload, Session};
use serde::Serialize;

use crate::archive::ArchiveBuilder;
use crate::error::PipelineError;
use crate::pipeline::{convert, Conversion, ConversionReport};

/// A file that could not be converted inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub filename: String,
    pub message: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error processing {}: {}", self.filename, self.message)
    }
}

/// One archive entry and the report of the file it came from
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub filename: String,
    /// Name inside the archive (may carry a " (n)" suffix if repeated)
    pub entry_name: String,
    pub report: ConversionReport,
}

#[derive(Debug, Clone)]
pub struct ArchiveResult {
    pub bytes: Vec<u8>,
    /// Successful files in input order
    pub entries: Vec<ArchiveEntry>,
    pub failures: Vec<FileFailure>,
}

impl ArchiveResult {
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.entry_name.as_str()).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} converted, {} failed",
            self.entries.len(),
            self.failures.len()
        )
    }
}

#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// Exactly one file was supplied: no archive is built
    Single(Conversion),
    Archive(ArchiveResult),
}

/// Convert every upload.
///
/// With one upload this is `convert` and its error propagates. With two or
/// more, a failing file is recorded in `failures` and the rest continue;
/// the call only fails if the archive itself cannot be written.
pub fn convert_batch(
    uploads: &[RawUpload],
    options: &ConvertOptions,
    session: &mut Session,
) -> Result<BatchOutcome, PipelineError> {
    match uploads {
        [] => Err(PipelineError::NoInput),
        [only] => match convert(only, options, session) {
            Ok(conversion) => {
                session.record_success();
                Ok(BatchOutcome::Single(conversion))
            }
            Err(e) => {
                session.record_failure();
                Err(e)
            }
        },
        many => convert_many(many, options, session).map(BatchOutcome::Archive),
    }
}

fn convert_many(
    uploads: &[RawUpload],
    options: &ConvertOptions,
    session: &mut Session,
) -> Result<ArchiveResult, PipelineError> {
    let mut archive = ArchiveBuilder::new();
    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for upload in uploads {
        match convert(upload, options, session) {
            Ok(conversion) => {
                let entry_name = archive.add(&conversion.output_name, &conversion.bytes)?;
                session.record_success();
                entries.push(ArchiveEntry {
                    filename: upload.filename.clone(),
                    entry_name,
                    report: conversion.report,
                });
            }
            Err(e) => {
                let failure = FileFailure {
                    filename: upload.filename.clone(),
                    message: e.to_string(),
                };
                log::debug!("{}", failure);
                session.record_failure();
                failures.push(failure);
            }
        }
    }

    log::info!(
        "batch of {}: {} converted, {} failed",
        uploads.len(),
        entries.len(),
        failures.len()
    );

    Ok(ArchiveResult {
        bytes: archive.finish()?,
        entries,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::ZipArchive;

    fn upload(name: &str, text: &str) -> RawUpload {
        RawUpload::new(name, text.as_bytes().to_vec())
    }

    #[test]
    fn test_no_uploads_is_error() {
        let mut session = Session::new();
        let err = convert_batch(&[], &ConvertOptions::default(), &mut session).unwrap_err();
        assert_eq!(err, PipelineError::NoInput);
    }

    #[test]
    fn test_single_upload_returns_workbook_directly() {
        let mut session = Session::new();
        let outcome = convert_batch(
            &[upload("one.csv", "a;b;c\n1;2;3\n")],
            &ConvertOptions::default(),
            &mut session,
        )
        .unwrap();
        match outcome {
            BatchOutcome::Single(conv) => assert_eq!(conv.output_name, "one.xlsx"),
            BatchOutcome::Archive(_) => panic!("single upload must not build an archive"),
        }
        assert_eq!(session.files_converted, 1);
    }

    #[test]
    fn test_single_upload_failure_propagates() {
        let mut session = Session::new();
        let err = convert_batch(&[upload("empty.csv", "")], &ConvertOptions::default(), &mut session)
            .unwrap_err();
        assert_eq!(err, PipelineError::NoColumns);
        assert_eq!(session.files_failed, 1);
        assert_eq!(session.files_converted, 0);
    }

    #[test]
    fn test_failure_isolated_in_batch() {
        let uploads = vec![
            upload("a.csv", "x;y;z\n1;2;3\n"),
            upload("broken.csv", ""),
            upload("c.csv", "p,q,r\n7,8,9\n"),
        ];
        let mut session = Session::new();
        let outcome = convert_batch(&uploads, &ConvertOptions::default(), &mut session).unwrap();

        let BatchOutcome::Archive(result) = outcome else {
            panic!("expected archive");
        };
        assert_eq!(result.entry_names(), vec!["a.xlsx", "c.xlsx"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(
            result.failures[0].to_string(),
            "error processing broken.csv: no columns to parse from file"
        );
        assert_eq!(result.summary(), "2 converted, 1 failed");
        assert_eq!(session.files_converted, 2);
        assert_eq!(session.files_failed, 1);

        let archive = ZipArchive::new(Cursor::new(result.bytes)).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_batch_same_stem_disambiguated() {
        let uploads = vec![
            upload("jan/vendas.csv", "a;b;c\n1;2;3\n"),
            upload("fev/vendas.csv", "a;b;c\n4;5;6\n"),
        ];
        let mut session = Session::new();
        let outcome = convert_batch(&uploads, &ConvertOptions::default(), &mut session).unwrap();
        let BatchOutcome::Archive(result) = outcome else {
            panic!("expected archive");
        };
        assert_eq!(result.entry_names(), vec!["vendas.xlsx", "vendas (2).xlsx"]);
    }

    #[test]
    fn test_all_failed_still_returns_archive() {
        let uploads = vec![upload("a.csv", ""), upload("b.csv", "\n\n")];
        let mut session = Session::new();
        let outcome = convert_batch(&uploads, &ConvertOptions::default(), &mut session).unwrap();
        let BatchOutcome::Archive(result) = outcome else {
            panic!("expected archive");
        };
        assert!(result.entries.is_empty());
        assert_eq!(result.failures.len(), 2);
    }
}
