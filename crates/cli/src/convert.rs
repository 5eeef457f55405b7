// convert: CSV files in, one workbook or a ZIP of workbooks out

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::json;

use csvxl_config::{SeparatorSetting, Settings};
use csvxl_core::{ConvertOptions, RawUpload, Session};
use csvxl_io::{convert_batch, ArchiveResult, BatchOutcome, Conversion, XLSX_MIME, ZIP_MIME};

use crate::{read_file, CliError};

pub struct ConvertArgs {
    pub files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub separator: Option<SeparatorSetting>,
    pub archive_name: Option<String>,
    pub sheet_name: Option<String>,
    pub min_populated: Option<usize>,
    pub json: bool,
    pub quiet: bool,
}

impl ConvertArgs {
    fn to_stdout(&self) -> bool {
        self.output.as_deref() == Some(Path::new("-"))
    }
}

pub fn cmd_convert(args: ConvertArgs) -> Result<(), CliError> {
    if args.to_stdout() && args.json {
        return Err(CliError::args("--json cannot be combined with -o -")
            .with_hint("write the output to a file to get a JSON report"));
    }

    // Same gate as the upload form: .csv files only
    if let Some(path) = args.files.iter().find(|p| !is_csv(p)) {
        return Err(CliError::args(format!("{}: not a .csv file", path.display()))
            .with_hint("only files with a .csv extension are accepted"));
    }

    let settings = Settings::load();
    let options = convert_options(&settings, &args);

    let uploads = args
        .files
        .iter()
        .map(|path| Ok(RawUpload::new(upload_name(path), read_file(path)?)))
        .collect::<Result<Vec<_>, CliError>>()?;

    let mut session = Session::new();
    let outcome = convert_batch(&uploads, &options, &mut session).map_err(|e| match uploads.as_slice() {
        [only] => CliError::pipeline(&only.filename, e),
        _ => CliError::format(e.to_string()),
    })?;

    log::debug!(
        "session: {} converted, {} failed, next default separator {}",
        session.files_converted,
        session.files_failed,
        session.default_separator()
    );

    match outcome {
        BatchOutcome::Single(conversion) => {
            finish_single(&args, &uploads[0].filename, conversion)
        }
        BatchOutcome::Archive(result) => {
            let archive_name = args
                .archive_name
                .clone()
                .unwrap_or_else(|| settings.archive_name.clone());
            finish_archive(&args, &archive_name, result)
        }
    }
}

fn finish_single(args: &ConvertArgs, filename: &str, conversion: Conversion) -> Result<(), CliError> {
    let report = &conversion.report;
    if !args.quiet {
        match report.warning_summary() {
            Some(warnings) => eprintln!("note: {}: {} ({})", filename, report.summary(), warnings),
            None => eprintln!("note: {}: {}", filename, report.summary()),
        }
    }

    if args.to_stdout() {
        return write_stdout(&conversion.bytes);
    }

    let path = resolve_output(args.output.as_deref(), &conversion.output_name);
    write_output(&path, &conversion.bytes)?;

    if args.json {
        print_json(&json!({
            "output": path.display().to_string(),
            "mime": XLSX_MIME,
            "file": filename,
            "report": report,
        }))
    } else {
        println!("{}\t{}", path.display(), XLSX_MIME);
        Ok(())
    }
}

fn finish_archive(args: &ConvertArgs, archive_name: &str, result: ArchiveResult) -> Result<(), CliError> {
    // Failures are reported whatever else happens
    for failure in &result.failures {
        eprintln!("{}", failure);
    }

    if result.entries.is_empty() {
        return Err(CliError::batch_failed(format!(
            "none of the {} files could be converted",
            result.failures.len()
        )));
    }

    if !args.quiet {
        for entry in &result.entries {
            eprintln!("note: {} -> {}: {}", entry.filename, entry.entry_name, entry.report.summary());
        }
        eprintln!("note: {}", result.summary());
    }

    if args.to_stdout() {
        return write_stdout(&result.bytes);
    }

    let path = resolve_output(args.output.as_deref(), archive_name);
    write_output(&path, &result.bytes)?;

    if args.json {
        print_json(&json!({
            "output": path.display().to_string(),
            "mime": ZIP_MIME,
            "entries": result.entries,
            "failures": result.failures,
        }))
    } else {
        println!("{}\t{}", path.display(), ZIP_MIME);
        Ok(())
    }
}

/// Settings first, then any flag given on the command line
fn convert_options(settings: &Settings, args: &ConvertArgs) -> ConvertOptions {
    let mut options = settings.convert_options();
    if let Some(separator) = args.separator {
        options.separator = separator.forced();
    }
    if let Some(sheet_name) = &args.sheet_name {
        options.sheet_name = sheet_name.clone();
    }
    if let Some(min) = args.min_populated {
        options.min_populated = min;
    }
    options
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `-o DIR` puts the default name inside DIR; no `-o` uses the working directory
fn resolve_output(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_name),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

fn write_stdout(bytes: &[u8]) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    out.write_all(bytes)
        .and_then(|_| out.flush())
        .map_err(|e| CliError::io(e.to_string()))
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
