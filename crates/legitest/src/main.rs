mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use legitest_core::{locate_repository, RunReport, Verifier, Workspace};
use legitest_logging::{init_tracing, LogEvent, LogFormat, Logger};
use legitest_runner::{CommandTestRunner, TestRunner};

use crate::config::{Overrides, ProjectConfig, CONFIG_FILE_NAME};

#[derive(Parser, Debug)]
#[command(
    name = "legitest",
    about = "Check that the unit tests added by a commit actually exercise its code change",
    version,
    author
)]
struct Cli {
    /// Revisions to verify (branch names, hashes, HEAD~n, ...)
    #[arg(required = true, num_args = 1..)]
    commits: Vec<String>,

    /// Directory to start searching for the repository (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Directory holding the unit tests (default: tests)
    #[arg(long)]
    tests_dir: Option<PathBuf>,

    /// Directory holding the production code (default: src)
    #[arg(long)]
    code_dir: Option<PathBuf>,

    /// Command that runs the test suite, split on whitespace
    /// (default: "python3 -m unittest discover")
    #[arg(long)]
    test_command: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append every event as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Echo the test suite's output while it runs
    #[arg(long)]
    show_test_output: bool,

    /// Output the report as JSON instead of one line per finding
    #[arg(long)]
    json_output: bool,

    /// Dry run: show what would happen without cloning or running tests
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            tests_dir: self.tests_dir.clone(),
            code_dir: self.code_dir.clone(),
            test_command: self
                .test_command
                .as_ref()
                .map(|cmd| cmd.split_whitespace().map(str::to_string).collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let started = Instant::now();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    // Locate the repository
    let start_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let repository = locate_repository(&start_dir)?;

    // Resolve settings: CLI > legitest.toml > defaults
    let settings = ProjectConfig::load(repository.root())?
        .unwrap_or_default()
        .resolve(cli.overrides());
    let runner = CommandTestRunner::from_command(&settings.test_command)
        .with_context(|| format!("Invalid test command in flags or {}", CONFIG_FILE_NAME))?;

    if cli.dry_run {
        println!("=== Dry Run ===");
        println!("Repository: {}", repository.root().display());
        println!("Tests dir: {}", settings.layout.tests_dir.display());
        println!("Code dir: {}", settings.layout.code_dir.display());
        println!("Test command: {}", runner.name());
        println!("Commits: {}", cli.commits.join(" "));
        return Ok(());
    }

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger.with_test_output(cli.show_test_output));

    let verifier = Verifier::new(&runner, settings.layout.clone(), logger.clone());
    verifier.check_environment().await?;

    logger.log(&LogEvent::RunStarted {
        repository: repository.root().to_path_buf(),
        references: cli.commits.clone(),
        test_command: runner.name().to_string(),
    });

    let workspace = Workspace::create(&repository)?;
    logger.log(&LogEvent::WorkspaceCreated {
        path: workspace.path().to_path_buf(),
    });

    // Lines go out as each commit is judged, so a fatal error mid-batch
    // still leaves the finished commits on stdout
    let json_output = cli.json_output;
    let result = verifier
        .run(&workspace, &cli.commits, |entry| {
            if !json_output {
                for line in entry.lines() {
                    println!("{}", line);
                }
            }
        })
        .await;

    // Cleanup runs before any error is surfaced
    match workspace.close() {
        Ok(path) => logger.log(&LogEvent::WorkspaceRemoved { path }),
        Err(e) => logger.log(&LogEvent::ErrorEncountered {
            error: format!("Failed to remove workspace: {}", e),
        }),
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            logger.log(&LogEvent::ErrorEncountered {
                error: e.to_string(),
            });
            return Err(e.into());
        }
    };

    if json_output {
        println!("{}", report.to_json_pretty()?);
    } else {
        print_summary(&report, started);
    }

    std::process::exit(report.exit_code());
}

fn print_summary(report: &RunReport, started: Instant) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for entry in report.commits() {
        for message in entry.verdict.messages() {
            *counts.entry(message).or_default() += 1;
        }
    }

    eprintln!();
    if report.is_success() {
        eprintln!("{}", "=== LEGITIMATE ===".bright_green().bold());
    } else {
        eprintln!("{}", "=== ILLEGITIMATE ===".bright_red().bold());
    }
    eprintln!("Commits: {}", report.commits().len());
    for (message, count) in &counts {
        eprintln!("  {}: {}", message, count);
    }
    eprintln!("Duration: {:.1}s", started.elapsed().as_secs_f64());
}
