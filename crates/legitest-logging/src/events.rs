use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Which reconstructed state a test run was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Tests and production code as of the commit
    PostChange,
    /// Tests as of the commit, production code as of its parent
    PreChange,
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Phase::PostChange => "post-change",
            Phase::PreChange => "pre-change",
        }
    }

    /// Outcome the protocol expects from this phase
    fn expects_pass(&self) -> bool {
        matches!(self, Phase::PostChange)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Type of output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Stdout,
    Stderr,
}

/// Structured log events for a verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        repository: PathBuf,
        references: Vec<String>,
        test_command: String,
    },
    WorkspaceCreated {
        path: PathBuf,
    },
    ReferenceResolved {
        reference: String,
        commit: String,
    },
    CommitClassified {
        commit: String,
        files_changed: usize,
        touches_tests: bool,
        touches_code: bool,
    },
    PhaseStarted {
        commit: String,
        phase: Phase,
    },
    /// Streaming output line from the test command
    TestOutputLine {
        commit: String,
        phase: Phase,
        stream: StreamType,
        line: String,
    },
    PhaseCompleted {
        commit: String,
        phase: Phase,
        passed: bool,
        exit_code: i32,
        duration_secs: f64,
    },
    VerdictReached {
        commit: String,
        verdict: String,
        legitimate: bool,
    },
    RunCompleted {
        commits: usize,
        failures: usize,
        duration_secs: f64,
    },
    WorkspaceRemoved {
        path: PathBuf,
    },
    ErrorEncountered {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Logger for legitest events - handles both console output and file logging.
///
/// Console output always goes to stderr; stdout belongs to the report.
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
    show_test_output: bool,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
            show_test_output: false,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
            show_test_output: false,
        })
    }

    /// Echo test command output to the console (always kept in the log file)
    pub fn with_test_output(mut self, show: bool) -> Self {
        self.show_test_output = show;
        self
    }

    pub fn log(&self, event: &LogEvent) {
        // Log to file if configured (always JSON format for file)
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if matches!(event, LogEvent::TestOutputLine { .. }) && !self.show_test_output {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                repository,
                references,
                test_command,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "legitest".bold().bright_white(),
                    " ".repeat(59) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Repo:".dimmed(),
                    Self::truncate_with_padding(&repository.display().to_string(), 60, 67)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Tests:".dimmed(),
                    Self::truncate_with_padding(test_command, 59, 66).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Refs:".dimmed(),
                    Self::truncate_with_padding(&references.join(" "), 60, 67).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::WorkspaceCreated { path } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "Workspace:".dimmed(),
                    path.display().to_string().dimmed()
                );
            }
            LogEvent::ReferenceResolved { reference, commit } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    reference.bright_white(),
                    "→".dimmed(),
                    commit.dimmed()
                );
            }
            LogEvent::CommitClassified {
                commit,
                files_changed,
                touches_tests,
                touches_code,
            } => {
                let text = format!("─ Commit {} ", commit);
                let padding = "─".repeat(67usize.saturating_sub(text.chars().count()));
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    text.bright_blue().bold(),
                    padding.bright_blue()
                );
                let mark = |touched: bool| {
                    if touched {
                        "yes".bright_white()
                    } else {
                        "no".dimmed()
                    }
                };
                let _ = writeln!(
                    stderr,
                    "    {} {} {}, tests: {}, code: {}",
                    "📁".dimmed(),
                    files_changed,
                    if *files_changed == 1 { "file" } else { "files" },
                    mark(*touches_tests),
                    mark(*touches_code)
                );
            }
            LogEvent::PhaseStarted { phase, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_cyan(),
                    phase.label().to_uppercase().bright_cyan().bold()
                );
            }
            LogEvent::TestOutputLine { line, stream, .. } => {
                let prefix = "    │".dimmed();
                let styled_line = match stream {
                    StreamType::Stdout => line.normal(),
                    StreamType::Stderr => line.dimmed(),
                };
                let _ = writeln!(stderr, "{} {}", prefix, styled_line);
            }
            LogEvent::PhaseCompleted {
                phase,
                passed,
                duration_secs,
                ..
            } => {
                let text = if *passed { "Passed" } else { "Failed" };
                let expected = *passed == phase.expects_pass();
                if expected {
                    let _ = writeln!(
                        stderr,
                        "    {} {} as expected ({:.1}s)",
                        "✓".bright_green(),
                        text,
                        duration_secs
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "    {} {} unexpectedly ({:.1}s)",
                        "✗".bright_red(),
                        text,
                        duration_secs
                    );
                }
            }
            LogEvent::VerdictReached {
                verdict,
                legitimate,
                ..
            } => {
                let styled = if *legitimate {
                    format!("✓ {}", verdict).bright_green().to_string()
                } else {
                    format!("✗ {}", verdict).bright_red().to_string()
                };
                let _ = writeln!(stderr, "    {}", styled);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "└─────────────────────────────────────────────────────────────────────┘"
                        .bright_blue()
                );
            }
            LogEvent::RunCompleted { .. } => {
                // Summary is printed by the binary after the report
            }
            LogEvent::WorkspaceRemoved { .. } => {}
            LogEvent::ErrorEncountered { error } => {
                let _ = writeln!(stderr);
                let _ = writeln!(stderr, "{} {}", "✗".bright_red(), error.bright_red());
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted { references, .. } => {
                format!("[{}] run:start refs={}", timestamp, references.len())
            }
            LogEvent::WorkspaceCreated { path } => {
                format!("[{}] workspace:create {}", timestamp, path.display())
            }
            LogEvent::ReferenceResolved { reference, commit } => {
                format!("[{}] resolve {}={}", timestamp, reference, commit)
            }
            LogEvent::CommitClassified {
                commit,
                files_changed,
                touches_tests,
                touches_code,
            } => format!(
                "[{}] classify:{} {}f tests={} code={}",
                timestamp, commit, files_changed, touches_tests, touches_code
            ),
            LogEvent::PhaseStarted { commit, phase } => {
                format!("[{}] phase:start:{} {}", timestamp, commit, phase)
            }
            LogEvent::TestOutputLine { phase, line, .. } => {
                let tag = match phase {
                    Phase::PostChange => "A",
                    Phase::PreChange => "B",
                };
                format!("[{}] {}:{}", timestamp, tag, line)
            }
            LogEvent::PhaseCompleted {
                commit,
                phase,
                passed,
                exit_code,
                duration_secs,
            } => format!(
                "[{}] phase:done:{} {} {} exit={} {:.1}s",
                timestamp,
                commit,
                phase,
                if *passed { "pass" } else { "fail" },
                exit_code,
                duration_secs
            ),
            LogEvent::VerdictReached {
                commit, verdict, ..
            } => format!("[{}] verdict:{} {}", timestamp, commit, verdict),
            LogEvent::RunCompleted {
                commits,
                failures,
                duration_secs,
            } => format!(
                "[{}] run:done:{} failures={} {:.1}s",
                timestamp, commits, failures, duration_secs
            ),
            LogEvent::WorkspaceRemoved { path } => {
                format!("[{}] workspace:remove {}", timestamp, path.display())
            }
            LogEvent::ErrorEncountered { error } => format!("[{}] error:{}", timestamp, error),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1); // +1 for trailing │
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
