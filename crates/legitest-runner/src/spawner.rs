use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::{OutputCallback, OutputType, RunnerConfig, RunnerError, TestRun};

/// Utility for spawning test processes
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Spawn a process in `config.working_dir`, forwarding each output line to
    /// `on_output` as it arrives.
    ///
    /// The child is always awaited, and the outcome comes from its exit status
    /// alone. Output that is not valid UTF-8 is decoded lossily.
    pub async fn spawn_with_callback(
        program: &Path,
        args: &[String],
        config: &RunnerConfig,
        on_output: Option<OutputCallback>,
    ) -> Result<TestRun, RunnerError> {
        let start = Instant::now();

        debug!(
            program = %program.display(),
            args = ?args,
            working_dir = %config.working_dir.display(),
            "Spawning test process"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&config.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null()); // Non-interactive

        for (key, value) in &config.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn()?;

        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout not captured".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr not captured".to_string()))?;

        let mut stdout_reader = BufReader::new(stdout_handle);
        let mut stderr_reader = BufReader::new(stderr_handle);
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut stdout_open = true;
        let mut stderr_open = true;

        let emit = |line: &str, output_type: OutputType| {
            if let Some(ref callback) = on_output {
                callback(line, output_type);
            }
        };

        // Read both streams concurrently until each one closes
        while stdout_open || stderr_open {
            tokio::select! {
                result = next_line(&mut stdout_reader, &mut stdout_buf), if stdout_open => {
                    match result {
                        Ok(Some(line)) => {
                            trace!(line = %line, "stdout");
                            emit(&line, OutputType::Stdout);
                            push_line(&mut stdout, &line);
                        }
                        Ok(None) => stdout_open = false,
                        Err(e) => {
                            warn!(error = %e, "Failed to read stdout, ignoring the rest");
                            stdout_open = false;
                        }
                    }
                }
                result = next_line(&mut stderr_reader, &mut stderr_buf), if stderr_open => {
                    match result {
                        Ok(Some(line)) => {
                            trace!(line = %line, "stderr");
                            emit(&line, OutputType::Stderr);
                            push_line(&mut stderr, &line);
                        }
                        Ok(None) => stderr_open = false,
                        Err(e) => {
                            warn!(error = %e, "Failed to read stderr, ignoring the rest");
                            stderr_open = false;
                        }
                    }
                }
            }
        }

        // Close our pipe ends so a child still writing sees EPIPE instead of blocking
        drop(stdout_reader);
        drop(stderr_reader);

        let status = child.wait().await?;
        let duration = start.elapsed();

        debug!(
            exit_code = status.code().unwrap_or(-1),
            duration_ms = duration.as_millis(),
            "Test process completed"
        );

        Ok(TestRun::new(
            stdout,
            stderr,
            status.code().unwrap_or(-1),
            duration,
        ))
    }
}

/// Next complete line without its terminator, `None` once the stream is
/// exhausted.
///
/// `buf` keeps partially read bytes across calls, so a read interrupted by
/// `select!` resumes where it stopped.
async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    Ok(Some(line))
}

fn push_line(buffer: &mut String, line: &str) {
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(line);
}
