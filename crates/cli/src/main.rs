// csvxl CLI - CSV exports to XLSX workbooks, one file or a ZIP batch

mod convert;
mod exit_codes;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use csvxl_config::{SeparatorSetting, Settings};
use csvxl_io::csv::{decode_lossy, detect_separator, repair_quoted_newlines};
use csvxl_io::{xlsx, PipelineError};

use exit_codes::{
    pipeline_exit_code, EXIT_BATCH_FAILED, EXIT_ERROR, EXIT_FORMAT, EXIT_IO, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "csvxl")]
#[command(about = "Normalize CSV exports and convert them to XLSX")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log pipeline steps (same as RUST_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert CSV files to XLSX (several files are bundled into a ZIP)
    #[command(after_help = "\
Examples:
  csvxl convert vendas.csv                      # writes vendas.xlsx
  csvxl convert jan.csv fev.csv mar.csv         # writes Arquivos_Convertidos.zip
  csvxl convert *.csv -o lote.zip
  csvxl convert export.csv --separator comma -o -  > export.xlsx
  csvxl convert export.csv --min-populated 0 --json")]
    Convert {
        /// CSV files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file or directory (- for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Field separator: auto, comma or semicolon
        #[arg(long, short = 's')]
        separator: Option<SeparatorSetting>,

        /// Name of the archive written for several files
        #[arg(long)]
        archive_name: Option<String>,

        /// Worksheet name inside each workbook
        #[arg(long)]
        sheet_name: Option<String>,

        /// Drop rows with this many populated cells or fewer
        #[arg(long)]
        min_populated: Option<usize>,

        /// Print a JSON report on stdout
        #[arg(long)]
        json: bool,

        /// Suppress notes and warnings on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Print the rows of a workbook's first sheet, tab-separated
    #[command(after_help = "\
Examples:
  csvxl inspect vendas.xlsx
  csvxl inspect vendas.xlsx --max-rows 5")]
    Inspect {
        /// Workbook to read
        file: PathBuf,

        /// Stop after this many data rows
        #[arg(long)]
        max_rows: Option<usize>,
    },

    /// Print the separator a CSV file would be read with
    #[command(after_help = "\
Examples:
  csvxl detect export.csv")]
    Detect {
        /// CSV file to examine
        file: PathBuf,
    },

    /// Show the settings file location and effective settings
    #[command(after_help = "\
Examples:
  csvxl config
  csvxl config --path
  csvxl config --init")]
    Config {
        /// Only print the settings file path
        #[arg(long)]
        path: bool,

        /// Write the default settings file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("CSVXL_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("CSVXL_TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs share stderr with notes; stdout carries data only
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            files,
            output,
            separator,
            archive_name,
            sheet_name,
            min_populated,
            json,
            quiet,
        } => convert::cmd_convert(convert::ConvertArgs {
            files,
            output,
            separator,
            archive_name,
            sheet_name,
            min_populated,
            json,
            quiet,
        }),
        Commands::Inspect { file, max_rows } => cmd_inspect(file, max_rows),
        Commands::Detect { file } => cmd_detect(file),
        Commands::Config { path, init } => cmd_config(path, init),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FORMAT, message: msg.into(), hint: None }
    }

    /// Every file in a batch failed; the per-file lines were already printed.
    pub fn batch_failed(msg: impl Into<String>) -> Self {
        Self { code: EXIT_BATCH_FAILED, message: msg.into(), hint: None }
    }

    /// Error from the pipeline for `filename`, with the matching exit code.
    pub fn pipeline(filename: &str, err: PipelineError) -> Self {
        let hint = match &err {
            PipelineError::NoColumns => Some("the file is empty or has only blank lines".to_string()),
            _ => None,
        };
        Self {
            code: pipeline_exit_code(&err),
            message: format!("error processing {}: {}", filename, err),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(file: PathBuf, max_rows: Option<usize>) -> Result<(), CliError> {
    let bytes = read_file(&file)?;
    let table = xlsx::read_table(&bytes).map_err(|e| {
        CliError::format(format!("{}: {}", file.display(), e))
            .with_hint("inspect reads .xlsx workbooks such as those written by `csvxl convert`")
    })?;

    let total = table.row_count();
    let shown = max_rows.map_or(total, |max| max.min(total));

    let mut out = io::stdout().lock();
    let write_err = |e: io::Error| CliError::io(e.to_string());

    writeln!(out, "{}", table.headers().join("\t")).map_err(write_err)?;
    for row in table.rows().take(shown) {
        let line: Vec<&str> = row.into_iter().map(|c| c.unwrap_or("")).collect();
        writeln!(out, "{}", line.join("\t")).map_err(write_err)?;
    }

    if shown < total {
        eprintln!("note: showing {} of {} rows", shown, total);
    }
    Ok(())
}

// ============================================================================
// detect
// ============================================================================

fn cmd_detect(file: PathBuf) -> Result<(), CliError> {
    let settings = Settings::load();
    let bytes = read_file(&file)?;

    let (text, _) = decode_lossy(&bytes);
    let text = repair_quoted_newlines(&text);
    let separator = detect_separator(&text, settings.sample_chars);

    println!("{}", separator.name());
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(path_only: bool, init: bool) -> Result<(), CliError> {
    let path = Settings::config_path();

    if init {
        if path.exists() {
            eprintln!("note: {} already exists", path.display());
        } else {
            Settings::default()
                .save()
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            eprintln!("wrote {}", path.display());
        }
    }

    if path_only {
        println!("{}", Settings::config_path_display());
        return Ok(());
    }

    let settings = Settings::load();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| CliError::general(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
