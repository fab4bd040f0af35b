//! elan-actions CLI - Command-line interface for ELAN action aggregation
//!
//! Reads one or more .eaf files and writes `<name>.dat` / `<name>.plt` pairs
//! ready for gnuplot.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use elan_actions::{
    process_files, ActionSet, AggregationConfig, AnnotationError, DirectorySink, Grouping,
    VERSION,
};

/// Generate stacked-histogram datasets from ELAN action annotations
#[derive(Parser)]
#[command(name = "elan-actions")]
#[command(version = VERSION)]
#[command(about = "Generate datasets of coded actions per run, child or pair", long_about = None)]
struct Cli {
    /// Keep all interactions (not only engagement related ones)
    #[arg(short, long)]
    all: bool,

    /// Generate one dataset per pair of children
    #[arg(short = 'p', long, conflicts_with = "perchild")]
    perpair: bool,

    /// Generate one dataset per child
    #[arg(short = 'c', long)]
    perchild: bool,

    /// Show the interaction sums per child/group
    #[arg(short, long)]
    sum: bool,

    /// Upper bound of the interaction axis (default: auto)
    #[arg(short, long)]
    yrange: Option<u32>,

    /// Directory receiving the .dat and .plt files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log run durations and written files
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Base name of the plot
    name: String,

    /// ELAN .eaf files to process
    #[arg(required = true)]
    eaf: Vec<PathBuf>,
}

impl Cli {
    fn config(&self) -> AggregationConfig {
        let actions = if self.all {
            ActionSet::Full
        } else {
            ActionSet::Engagement
        };
        let grouping = if self.perchild {
            Grouping::PerChild
        } else if self.perpair {
            Grouping::PerPair
        } else {
            Grouping::Runs
        };

        AggregationConfig::new(self.name.clone())
            .with_actions(actions)
            .with_grouping(grouping)
            .with_sum_only(self.sum)
            .with_y_max(self.yrange)
    }
}

/// Initialize the stderr log subscriber
fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliErrorReport::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.config();
    let mut sink = DirectorySink::new(&cli.output_dir);

    let summary = process_files(&config, &cli.eaf, &mut sink)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for dataset in &summary.datasets {
            tracing::info!(
                "Wrote {}.dat and {}.plt to {}",
                dataset.name,
                dataset.name,
                sink.dir().display()
            );
        }
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum CliError {
    Annotation(AnnotationError),
    Json(serde_json::Error),
}

impl From<AnnotationError> for CliError {
    fn from(e: AnnotationError) -> Self {
        CliError::Annotation(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliErrorReport {
    code: String,
    message: String,
    hint: Option<String>,
}

impl CliErrorReport {
    fn new(code: &str, message: String, hint: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            message,
            hint: hint.map(str::to_string),
        }
    }
}

impl From<CliError> for CliErrorReport {
    fn from(e: CliError) -> Self {
        match e {
            CliError::Json(e) => {
                CliErrorReport::new("JSON_ERROR", e.to_string(), Some("Report serialization failed"))
            }
            CliError::Annotation(e) => {
                let message = e.to_string();
                match e {
                    AnnotationError::Io { .. } => CliErrorReport::new(
                        "IO_ERROR",
                        message,
                        Some("Check file paths and permissions"),
                    ),
                    AnnotationError::Output { .. } => CliErrorReport::new(
                        "OUTPUT_ERROR",
                        message,
                        Some("Check that the output directory is writable"),
                    ),
                    AnnotationError::Xml(_) => CliErrorReport::new(
                        "XML_ERROR",
                        message,
                        Some("Ensure the input is a well-formed .eaf file"),
                    ),
                    AnnotationError::MissingSection(_)
                    | AnnotationError::MissingElement { .. }
                    | AnnotationError::MissingAttribute { .. }
                    | AnnotationError::InvalidTimeValue { .. }
                    | AnnotationError::UndefinedTimeSlot(_)
                    | AnnotationError::MissingTier(_)
                    | AnnotationError::InvalidTierId(_) => CliErrorReport::new(
                        "STRUCTURE_ERROR",
                        message,
                        Some("Fix the annotation file in ELAN and retry"),
                    ),
                    AnnotationError::DegenerateRun { .. } => CliErrorReport::new(
                        "RUN_ERROR",
                        message,
                        Some("Every run annotation must end after it starts"),
                    ),
                    AnnotationError::LabelSetMismatch { .. } => {
                        CliErrorReport::new("INTERNAL_ERROR", message, None)
                    }
                }
            }
        }
    }
}
