//! Cyclesense CLI
//!
//! Commands:
//! - report: build the full insight report from an entries file
//! - status: current cycle day and phase for a configuration
//! - predict: upcoming stop-week intervals
//! - validate: check an entries file against the input schema

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};

use cyclesense::cycle::CycleModel;
use cyclesense::report::ReportBuilder;
use cyclesense::types::{CycleConfiguration, MoodEntry};
use cyclesense::{EngineError, ENGINE_VERSION};

/// Cyclesense - on-device analytics for mood and cycle tracking
#[derive(Parser)]
#[command(name = "cyclesense")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze mood entries and cycle configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full insight report
    Report {
        /// Entries file: JSON array of mood entries (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Cycle configuration file (optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Override "now" (RFC 3339); defaults to the wall clock
        #[arg(long)]
        now: Option<String>,
    },

    /// Show current cycle day and phase
    Status {
        /// Cycle configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override "today" (YYYY-MM-DD); defaults to the current date
        #[arg(long)]
        today: Option<String>,
    },

    /// Predict upcoming stop-week intervals
    Predict {
        /// Cycle configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Number of intervals to predict
        #[arg(long, default_value = "3")]
        count: usize,

        /// Override "today" (YYYY-MM-DD); defaults to the current date
        #[arg(long)]
        today: Option<String>,
    },

    /// Validate an entries file
    Validate {
        /// Entries file: JSON array of mood entries (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

enum CyclesenseCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    BadDate(String),
    StdinIsTty,
}

impl From<io::Error> for CyclesenseCliError {
    fn from(e: io::Error) -> Self {
        CyclesenseCliError::Io(e)
    }
}

impl From<EngineError> for CyclesenseCliError {
    fn from(e: EngineError) -> Self {
        CyclesenseCliError::Engine(e)
    }
}

impl From<serde_json::Error> for CyclesenseCliError {
    fn from(e: serde_json::Error) -> Self {
        CyclesenseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CyclesenseCliError> for CliError {
    fn from(e: CyclesenseCliError) -> Self {
        match e {
            CyclesenseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CyclesenseCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            CyclesenseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CyclesenseCliError::BadDate(msg) => CliError {
                code: "DATE_ERROR".to_string(),
                message: msg,
                hint: Some("Use RFC 3339 timestamps and YYYY-MM-DD dates".to_string()),
            },
            CyclesenseCliError::StdinIsTty => CliError {
                code: "STDIN_TTY".to_string(),
                message: "Refusing to read entries from an interactive terminal".to_string(),
                hint: Some("Pipe a JSON file in, or pass --input <path>".to_string()),
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CyclesenseCliError> {
    match cli.command {
        Commands::Report {
            input,
            config,
            output,
            now,
        } => cmd_report(&input, config.as_deref(), &output, now.as_deref()),
        Commands::Status { config, today } => cmd_status(&config, today.as_deref()),
        Commands::Predict {
            config,
            count,
            today,
        } => cmd_predict(&config, count, today.as_deref()),
        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn cmd_report(
    input: &Path,
    config: Option<&Path>,
    output: &Path,
    now: Option<&str>,
) -> Result<(), CyclesenseCliError> {
    let entries = read_entries(input)?;
    let model = config.map(load_model).transpose()?;
    let now = parse_now(now)?;

    let json = ReportBuilder::new().build_json(&entries, model.as_ref(), now)?;

    if output.to_string_lossy() == "-" {
        println!("{json}");
    } else {
        fs::write(output, json)?;
    }
    Ok(())
}

fn cmd_status(config: &Path, today: Option<&str>) -> Result<(), CyclesenseCliError> {
    let model = load_model(config)?;
    let status = model.status(parse_today(today)?);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn cmd_predict(config: &Path, count: usize, today: Option<&str>) -> Result<(), CyclesenseCliError> {
    let model = load_model(config)?;
    let intervals = model.predict_stop_weeks(count, parse_today(today)?);
    println!("{}", serde_json::to_string_pretty(&intervals)?);
    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), CyclesenseCliError> {
    let entries = read_entries(input)?;
    let out_of_range = entries
        .iter()
        .filter(|e| e.score < cyclesense::types::MIN_MOOD_SCORE
            || e.score > cyclesense::types::MAX_MOOD_SCORE)
        .count();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "entries": entries.len(),
                "out_of_range_scores": out_of_range,
                "valid": out_of_range == 0,
            })
        );
    } else {
        println!("{} entries, {} out-of-range scores", entries.len(), out_of_range);
    }
    Ok(())
}

fn read_entries(input: &Path) -> Result<Vec<MoodEntry>, CyclesenseCliError> {
    let data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(CyclesenseCliError::StdinIsTty);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };
    Ok(serde_json::from_str(&data)?)
}

fn load_model(config: &Path) -> Result<CycleModel, CyclesenseCliError> {
    let data = fs::read_to_string(config)?;
    let configuration: CycleConfiguration = serde_json::from_str(&data)?;
    Ok(CycleModel::from_configuration(configuration)?)
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, CyclesenseCliError> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CyclesenseCliError::BadDate(format!("invalid --now value: {e}"))),
        None => Ok(Utc::now()),
    }
}

fn parse_today(today: Option<&str>) -> Result<NaiveDate, CyclesenseCliError> {
    match today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| CyclesenseCliError::BadDate(format!("invalid --today value: {e}"))),
        None => Ok(Utc::now().date_naive()),
    }
}
