//! External command execution with time budgets.

use crate::error::{CompatError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
            timed_out: false,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: false,
        }
    }

    /// Create a result for a command that was killed at its deadline.
    pub fn timeout(duration: Duration) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            duration,
            success: false,
            timed_out: true,
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Time budget (None = no timeout).
    pub timeout: Option<Duration>,
}

impl CommandOptions {
    /// Options with only a timeout set.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Default::default()
        }
    }

    /// Set the working directory.
    pub fn in_dir(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }
}

/// Render a program and its arguments for logs and error messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Execute a program directly (no shell), capturing its output.
///
/// Output pipes are drained on background threads so a chatty child can't
/// block on a full pipe while we wait on it. When the timeout expires the
/// child is killed and the result is marked `timed_out`; any output it
/// produced is discarded.
///
/// Returns `Err` only if the program could not be spawned or waited on.
pub fn execute(program: &str, args: &[&str], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    let rendered = display_command(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Executing: {}", rendered);

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("Failed to spawn '{}': {}", rendered, e);
        CompatError::CommandFailed {
            command: rendered.clone(),
            code: None,
        }
    })?;

    let stdout_handle = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    });

    let stderr_handle = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    });

    let status = match options.timeout {
        Some(limit) => child.wait_timeout(limit)?,
        None => Some(child.wait()?),
    };

    let Some(status) = status else {
        // Grandchildren may still hold the pipes open, so the reader
        // threads are left to finish on their own.
        let _ = child.kill();
        let _ = child.wait();
        tracing::debug!("Timed out after {:?}: {}", start.elapsed(), rendered);
        return Ok(CommandResult::timeout(start.elapsed()));
    };

    let stdout = stdout_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();
    let stderr = stderr_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();

    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        tracing::debug!(
            "Exit {:?} from '{}': {}",
            status.code(),
            rendered,
            stderr.trim()
        );
        Ok(CommandResult::failure(
            status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Execute a program and turn any unsuccessful outcome into an error.
///
/// Non-zero exits become [`CompatError::CommandFailed`] and expired budgets
/// become [`CompatError::CommandTimedOut`].
pub fn execute_checked(
    program: &str,
    args: &[&str],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let result = execute(program, args, options)?;

    if result.timed_out {
        return Err(CompatError::CommandTimedOut {
            command: display_command(program, args),
            seconds: options.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        });
    }

    if !result.success {
        return Err(CompatError::CommandFailed {
            command: display_command(program, args),
            code: result.exit_code,
        });
    }

    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("sh", &["-c", "echo hello"], &CommandOptions::default()).unwrap();

        assert!(result.success);
        assert!(!result.timed_out);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("sh", &["-c", "exit 3"], &CommandOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_captures_stderr() {
        let result = execute("sh", &["-c", "echo oops >&2"], &CommandOptions::default()).unwrap();

        assert!(result.stderr.contains("oops"));
    }

    #[test]
    fn execute_with_env() {
        let mut options = CommandOptions::default();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute("sh", &["-c", "echo $MY_VAR"], &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();
        let options = CommandOptions::default().in_dir(temp.path());

        let result = execute("ls", &[], &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("marker.txt"));
    }

    #[test]
    fn execute_kills_command_at_timeout() {
        let options = CommandOptions::with_timeout(Duration::from_millis(200));

        let result = execute("sleep", &["5"], &options).unwrap();

        assert!(result.timed_out);
        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert!(result.duration < Duration::from_secs(4));
    }

    #[test]
    fn execute_within_timeout_succeeds() {
        let options = CommandOptions::with_timeout(Duration::from_secs(10));

        let result = execute("sh", &["-c", "echo quick"], &options).unwrap();

        assert!(result.success);
        assert!(!result.timed_out);
    }

    #[test]
    fn execute_missing_binary_is_command_failed() {
        let err = execute(
            "definitely-not-a-real-binary-xyz",
            &[],
            &CommandOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, CompatError::CommandFailed { code: None, .. }));
    }

    #[test]
    fn execute_checked_maps_exit_code() {
        let err = execute_checked("sh", &["-c", "exit 1"], &CommandOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            CompatError::CommandFailed { code: Some(1), .. }
        ));
    }

    #[test]
    fn execute_checked_maps_timeout() {
        let options = CommandOptions::with_timeout(Duration::from_millis(100));

        let err = execute_checked("sleep", &["5"], &options).unwrap_err();

        assert!(matches!(err, CompatError::CommandTimedOut { .. }));
    }

    #[test]
    fn display_command_joins_args() {
        assert_eq!(
            display_command("uv", &["python", "install", "3.12"]),
            "uv python install 3.12"
        );
        assert_eq!(display_command("cargo", &[]), "cargo");
    }
}
