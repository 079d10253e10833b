//! `bibcloud` command-line entry point.
//!
//! # Responsibility
//! - Map flags and environment variables onto core calls.
//! - Print one JSON document per command on stdout.
//!
//! # Invariants
//! - Logging goes to files only; stdout carries nothing but the JSON result.
//! - Exit code is 0 on success and 1 otherwise.

use bibcloud_core::{
    count_records, default_log_level, init_logging, run_pipeline, stage_bibliography,
    stage_data_file, PipelineConfig,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "bibcloud", version)]
#[command(about = "Build a word cloud from bibliographic records")]
struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = "BIBCLOUD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files (default: <out-dir or data-dir>/logs)
    #[arg(long, global = true, env = "BIBCLOUD_LOG_DIR", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import, count terms and render the cloud
    Run(RunArgs),
    /// Copy a .bib document into the data directory
    StageBib(StageBibArgs),
    /// Copy records.csv or frequencies.json into the data directory
    StageData(StageDataArgs),
    /// Count records available to the next run
    Total(DataDirArg),
}

#[derive(Args, Debug)]
struct DataDirArg {
    /// Directory holding records.csv, frequencies.json and .bib sources
    #[arg(long, env = "BIBCLOUD_DATA_DIR", value_name = "DIR")]
    data_dir: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    data: DataDirArg,

    /// Directory receiving nube_palabras.png and nube_palabras.pdf
    #[arg(long, env = "BIBCLOUD_OUT_DIR", value_name = "DIR")]
    out_dir: PathBuf,

    /// Ignore the frequency cache and re-extract from the record store
    #[arg(long)]
    refresh: bool,

    /// Skip the spiral layout and use row packing directly
    #[arg(long)]
    fallback_only: bool,

    /// Render a blank canvas when there is no input data
    #[arg(long)]
    render_empty: bool,

    /// Font file to try before the defaults (repeatable)
    #[arg(long = "font", value_name = "PATH")]
    fonts: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct StageBibArgs {
    /// .bib file to copy
    source: PathBuf,

    #[command(flatten)]
    data: DataDirArg,

    /// Destination file name (must end in .bib)
    #[arg(long)]
    name: Option<String>,

    /// Replace an existing file instead of adding a timestamp suffix
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct StageDataArgs {
    /// records.csv or frequencies.json to copy
    source: PathBuf,

    #[command(flatten)]
    data: DataDirArg,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    start_logging(&cli);

    match cli.command {
        Command::Run(args) => run(args),
        Command::StageBib(args) => emit(stage_bibliography(
            &args.source,
            &args.data.data_dir,
            args.name.as_deref(),
            args.overwrite,
        )),
        Command::StageData(args) => emit(stage_data_file(&args.source, &args.data.data_dir)),
        Command::Total(args) => emit(count_records(&args.data_dir)),
    }
}

fn run(args: RunArgs) -> ExitCode {
    let mut config = PipelineConfig::new(args.data.data_dir, args.out_dir);
    config.prefer_cache = !args.refresh;
    config.render_when_empty = args.render_empty;
    config.render.allow_primary = !args.fallback_only;
    if !args.fonts.is_empty() {
        let mut candidates = args.fonts;
        candidates.append(&mut config.render.font_candidates);
        config.render.font_candidates = candidates;
    }

    let report = run_pipeline(&config);
    let printed = print_json(&report);
    if report.success && printed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn emit<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> ExitCode {
    match result {
        Ok(value) => {
            if print_json(&value) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            log::error!("event=cli_command module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(body) => {
            println!("{body}");
            true
        }
        Err(err) => {
            eprintln!("error: cannot encode result: {err}");
            false
        }
    }
}

/// Logging failures are reported on stderr and never stop the command.
fn start_logging(cli: &Cli) {
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = match &cli.log_dir {
        Some(dir) => dir.clone(),
        None => default_log_dir(&cli.command),
    };
    let log_dir = match std::path::absolute(&log_dir) {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("warning: logging disabled: {err}");
            return;
        }
    };

    if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn default_log_dir(command: &Command) -> PathBuf {
    let base: &Path = match command {
        Command::Run(args) => &args.out_dir,
        Command::StageBib(args) => &args.data.data_dir,
        Command::StageData(args) => &args.data.data_dir,
        Command::Total(args) => &args.data_dir,
    };
    base.join("logs")
}

#[cfg(test)]
mod tests {
    use super::{default_log_dir, Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "bibcloud",
            "run",
            "--data-dir",
            "data",
            "--out-dir",
            "out",
            "--refresh",
            "--font",
            "a.ttf",
            "--font",
            "b.ttf",
        ])
        .unwrap();
        let Command::Run(args) = &cli.command else {
            panic!("expected run command");
        };
        assert!(args.refresh);
        assert!(!args.fallback_only);
        assert_eq!(args.fonts, vec![PathBuf::from("a.ttf"), PathBuf::from("b.ttf")]);
        assert_eq!(default_log_dir(&cli.command), PathBuf::from("out/logs"));
    }

    #[test]
    fn total_logs_under_data_dir() {
        let cli = Cli::try_parse_from(["bibcloud", "total", "--data-dir", "data"]).unwrap();
        assert_eq!(default_log_dir(&cli.command), PathBuf::from("data/logs"));
    }
}
