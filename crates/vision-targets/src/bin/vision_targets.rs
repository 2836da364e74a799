//! vision-targets CLI: offline detection and config checks.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use vision_targets::bus::{MemoryBus, TARGETS_TABLE};
use vision_targets::detect::{detect_and_publish, ContourSet};
use vision_targets::{CargoDetector, HatchDetector, VisionConfig};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "vision-targets")]
#[command(about = "Detect hatch and cargo targets from contours and publish them to the bus")]
#[command(version)]
struct Cli {
    /// Log verbosity.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Emit JSON log lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both detectors on a contour file and print the bus entries.
    Detect {
        /// JSON file: `{"hatch": [[[x, y], ...], ...], "cargo": [...]}`.
        contours: PathBuf,

        /// Table for `contour_left` / `contour_right`.
        #[arg(long, default_value = TARGETS_TABLE)]
        hatch_table: String,

        /// Optional config supplying `hatch` / `cargo` parameters.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse and validate a robot config file.
    CheckConfig {
        /// Path to `frc.json`.
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_level: LogLevel, json: bool) {
    if let Err(e) = vision_targets::core::init_tracing(json) {
        eprintln!("tracing init failed: {e}");
    }
    // No-op when the subscriber already bridged `log` records.
    let _ = tracing_log::LogTracer::init();
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LogLevel, json: bool) {
    if json {
        eprintln!("--json-logs needs the `tracing` feature; using plain logs");
    }
    if let Err(e) = vision_targets::core::init_with_level(level.into()) {
        eprintln!("logger init failed: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.json_logs);

    let res = match cli.command {
        Commands::Detect {
            contours,
            hatch_table,
            config,
        } => run_detect(&contours, &hatch_table, config.as_deref()),
        Commands::CheckConfig { path } => run_check_config(&path),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_detect(
    contours: &Path,
    hatch_table: &str,
    config: Option<&Path>,
) -> CliResult<()> {
    let set = ContourSet::load_json(contours)
        .map_err(|e| format!("failed to read {}: {e}", contours.display()))?;

    let (hatch, cargo) = match config {
        Some(path) => {
            let cfg = VisionConfig::load_json(path)
                .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
            (
                HatchDetector::new(cfg.hatch),
                CargoDetector::new(cfg.cargo),
            )
        }
        None => (HatchDetector::default(), CargoDetector::default()),
    };

    let bus = MemoryBus::new();
    let res = detect_and_publish(&set, &hatch, &cargo, &bus, hatch_table);
    if res.failed_writes > 0 {
        return Err(format!("{} bus write(s) failed", res.failed_writes).into());
    }

    println!("{}", serde_json::to_string_pretty(&bus.snapshot())?);
    Ok(())
}

fn run_check_config(path: &Path) -> CliResult<()> {
    let cfg = VisionConfig::load_json(path)
        .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
    println!("team: {}", cfg.team);
    println!("ntmode: {}", cfg.ntmode);
    for (i, cam) in cfg.cameras.iter().enumerate() {
        println!("camera {i}: {} ({})", cam.name, cam.path);
    }
    Ok(())
}
