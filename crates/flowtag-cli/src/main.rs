use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use flowtag_core::Report;

const EXAMPLES: &str = "Examples:\n  flowtag flowlog classify flow_log.txt -l lookup.csv -p protocol-numbers.csv -o output.txt\n  flowtag flowlog tag 'logs/*.log' -l lookup.csv -p protocol-numbers.csv --stdout\n  flowtag flowlog classify flow_log.txt -l lookup.csv -p protocol-numbers.csv --format json --pretty -o report.json";

#[derive(Parser, Debug)]
#[command(name = "flowtag")]
#[command(version, long_version = env!("FLOWTAG_LONG_VERSION"))]
#[command(
    about = "Tag network flow-log records by destination port and protocol.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on flow-log files.
    Flowlog {
        #[command(subcommand)]
        command: FlowlogCommands,
    },
}

#[derive(Subcommand, Debug)]
enum FlowlogCommands {
    /// Classify a flow log against a lookup table and count tags and port/protocol pairs.
    #[command(alias = "tag")]
    #[command(after_help = EXAMPLES)]
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Flow-log file (a glob pattern must match exactly one file)
    input: PathBuf,

    /// Lookup table CSV (dstport,protocol,tag)
    #[arg(short = 'l', long)]
    lookup: PathBuf,

    /// Protocol numbers CSV (number,name,...)
    #[arg(short = 'p', long)]
    protocols: PathBuf,

    /// Output path
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    output: Option<PathBuf>,

    /// Write the report to stdout
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Flowlog { command } => match command {
            FlowlogCommands::Classify(args) => cmd_flowlog_classify(args),
        },
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

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
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
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_flowlog_classify(args: ClassifyArgs) -> Result<(), CliError> {
    if args.pretty && args.format != OutputFormat::Json {
        return Err(CliError::new(
            "--pretty only applies to JSON output",
            Some("add --format json".to_string()),
        ));
    }

    let input = resolve_input_path(&args.input)?;
    validate_input_file(&input, "flow log")?;
    validate_input_file(&args.lookup, "lookup table")?;
    validate_input_file(&args.protocols, "protocol numbers file")?;

    let output = if args.stdout {
        None
    } else {
        let output = args.output.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            )
        })?;
        ensure_output_differs(
            &output,
            &[
                input.as_path(),
                args.lookup.as_path(),
                args.protocols.as_path(),
            ],
        )?;
        Some(output)
    };

    debug!(
        flow_log = %input.display(),
        lookup = %args.lookup.display(),
        protocols = %args.protocols.display(),
        "Starting classification"
    );
    let report = flowtag_core::analyze_flow_log_file(&input, &args.lookup, &args.protocols)
        .context("flow-log classification failed")?;
    let rendered = render_report(&report, args.format, args.pretty)?;

    let Some(output) = output else {
        print!("{}", rendered);
        return Ok(());
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&output, rendered)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    if !args.quiet {
        eprintln!(
            "OK: {} records classified, {} skipped -> {}",
            report.summary.records_classified,
            report.summary.records_skipped,
            output.display()
        );
    }
    Ok(())
}

fn render_report(report: &Report, format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(flowtag_core::render_text(report)),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(report)
            .context("JSON serialization failed")
            .map_err(Into::into),
        OutputFormat::Json => serde_json::to_string(report)
            .context("JSON serialization failed")
            .map_err(Into::into),
    }
}

fn validate_input_file(path: &Path, what: &str) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::new(
            format!("{} not found: {}", what, path.display()),
            Some("check the path".to_string()),
        ));
    }
    if !path.is_file() {
        return Err(CliError::new(
            format!("{} is not a file: {}", what, path.display()),
            Some("pass a regular file".to_string()),
        ));
    }
    Ok(())
}

fn ensure_output_differs(output: &Path, inputs: &[&Path]) -> Result<(), CliError> {
    let Some(target) = resolve_output_target(output)? else {
        return Ok(());
    };
    for input in inputs {
        let input_abs = fs::canonicalize(input)
            .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
        if target == input_abs {
            return Err(CliError::new(
                format!("output path must differ from inputs: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn resolve_output_target(output: &Path) -> Result<Option<PathBuf>, CliError> {
    let file_name = output
        .file_name()
        .ok_or_else(|| CliError::new(format!("invalid output path: {}", output.display()), None))?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        return Ok(None);
    }
    let dir = fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve output path: {}", output.display()))?;
    Ok(Some(dir.join(file_name)))
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
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

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single flow log, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
