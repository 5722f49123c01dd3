use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command as ProcessCommand, ExitCode, Stdio};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use hexscan_core::{
    FileLineSource, IssueKind, LineSource, LineTransform, ReadLineSource, Record, Report,
    SourceError, TransformSource, decode_source,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("HEXSCAN_BUILD_COMMIT"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "hexscan")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder and validator for Intel HEX firmware images.",
    long_about = None,
    after_help = "Examples:\n  hexscan decode firmware.hex -o report.json\n  hexscan decode firmware.hex --stdout --pretty\n  cat firmware.hex | hexscan decode - --stdout"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a hex file and generate a versioned JSON report.
    #[command(
        after_help = "Examples:\n  hexscan decode firmware.hex -o report.json\n  hexscan decode 'build/*.hex' --stdout\n  hexscan decode firmware.hex --stdout --filter 'tr a-f A-F'"
    )]
    Decode {
        /// Path to a .hex/.ihex/.ihx file, a glob matching one file, or '-' for stdin
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// List decoded records after the report is generated
        #[arg(long)]
        list_records: bool,

        /// Route every input line through an external command before decoding
        #[arg(long, value_name = "CMD")]
        filter: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            list_records,
            filter,
        } => cmd_decode(
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            list_records,
            filter,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

/// Per-line filter that hands each line to an external command and yields
/// whatever lines the command prints back.
struct CommandTransform {
    command: String,
}

impl LineTransform for CommandTransform {
    fn transform(&mut self, line: &[u8]) -> Result<Vec<Vec<u8>>, SourceError> {
        let mut child = ProcessCommand::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| SourceError::Transform("filter stdin unavailable".to_string()))?;
            stdin.write_all(line)?;
            if !line.ends_with(b"\n") {
                stdin.write_all(b"\n")?;
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(SourceError::Transform(format!(
                "filter exited with {}",
                output.status
            )));
        }

        let mut lines: Vec<Vec<u8>> = output
            .stdout
            .split(|&byte| byte == b'\n')
            .map(|chunk| chunk.to_vec())
            .collect();
        if lines.last().is_some_and(|chunk| chunk.is_empty()) {
            lines.pop();
        }
        Ok(lines)
    }
}

fn cmd_decode(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    list_records: bool,
    filter: Option<String>,
) -> Result<(), CliError> {
    let report_path = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    let (records, input_label, input_bytes) = if input.as_os_str() == "-" {
        let source = ReadLineSource::new(std::io::stdin().lock());
        let records = decode_with_filter(source, filter)?;
        (records, "-".to_string(), 0)
    } else {
        let resolved = resolve_input_path(&input)?;
        validate_input_file(&resolved)?;

        let meta = fs::metadata(&resolved)
            .with_context(|| format!("Failed to read input file: {}", resolved.display()))?;
        if !meta.is_file() {
            return Err(CliError::new(
                format!("input is not a file: {}", input.display()),
                Some("use a .hex, .ihex, or .ihx file".to_string()),
            ));
        }

        if let Some(report_path) = report_path.as_ref() {
            let input_abs = fs::canonicalize(&resolved).with_context(|| {
                format!("Failed to resolve input path: {}", resolved.display())
            })?;
            if let Ok(report_abs) = fs::canonicalize(report_path) {
                if report_abs == input_abs {
                    return Err(CliError::new(
                        format!(
                            "report path must differ from input: {}",
                            report_path.display()
                        ),
                        Some("choose a different output path".to_string()),
                    ));
                }
            }
        }

        let source = FileLineSource::open(&resolved)
            .map_err(|err| CliError::new(err.to_string(), None))?;
        let records = decode_with_filter(source, filter)?;
        (records, resolved.display().to_string(), meta.len())
    };

    let mut rep = hexscan_core::make_report(&input_label, input_bytes, &records);
    rep.generated_at = rfc3339_now();

    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
        if list_records && !quiet {
            print_records(&rep);
        }
        return Ok(());
    }

    let report_path = report_path.expect("report path required when not using stdout");
    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    if list_records && !quiet {
        print_records(&rep);
    }
    if !quiet {
        eprintln!("OK: report written -> {}", report_path.display());
    }
    Ok(())
}

fn decode_with_filter<S: LineSource>(
    source: S,
    filter: Option<String>,
) -> Result<Vec<Record>, CliError> {
    let result = match filter {
        Some(command) => decode_source(TransformSource::new(source, CommandTransform { command })),
        None => decode_source(source),
    };
    result.map_err(|issue| {
        let hint = match issue.kind {
            IssueKind::UnexpectedEndOfFile { .. } => {
                Some("a well-formed file ends with ':00000001FF'".to_string())
            }
            _ => None,
        };
        CliError::new(issue.to_string(), hint)
    })
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_records(rep: &Report) {
    eprintln!("Records:");
    for record in &rep.records {
        eprintln!(
            "  {} @ {:#06X} ({} bytes)",
            record.kind, record.address, record.byte_count
        );
    }
}

fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| hexscan_core::DEFAULT_GENERATED_AT.to_string())
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .hex, .ihex, or .ihx file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "hex" && ext != "ihex" && ext != "ihx" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .hex, .ihex, or .ihx file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .hex file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => Err(CliError::new(
            format!("multiple files match pattern '{}' ({count} matches)", pattern),
            Some("pass a single hex file, or run once per file".to_string()),
        )),
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
