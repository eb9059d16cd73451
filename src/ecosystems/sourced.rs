//! Version managers that only exist as shell functions.
//!
//! `nvm` and `sdk` are defined by sourcing an init script into bash, so each
//! call starts `bash -c` with a fixed script. The init script path and the
//! toolchain version travel as positional parameters (`$1`, `$2`) and never
//! become part of the script text.

use super::path_arg;
use crate::error::Result;
use crate::shell::{execute_checked, CommandOptions, CommandResult};
use std::path::{Path, PathBuf};

/// Value of `$0` inside the generated scripts.
const SCRIPT_NAME: &str = "compat-probe";

/// A shell-function version manager loaded from an init script.
#[derive(Debug, Clone)]
pub struct SourcedShell {
    bash: String,
    init_script: PathBuf,
}

impl SourcedShell {
    /// Use `bash` from `PATH` to source `init_script`.
    pub fn new(init_script: impl Into<PathBuf>) -> Self {
        Self {
            bash: "bash".to_string(),
            init_script: init_script.into(),
        }
    }

    /// The script sourced before every call.
    pub fn init_script(&self) -> &Path {
        &self.init_script
    }

    /// Run `call` with the version bound to `"$2"`, then `command` if given.
    ///
    /// The output of `call` is discarded when a command follows, so stdout
    /// belongs to the command alone.
    pub fn run(
        &self,
        call: &str,
        version: &str,
        command: &[&str],
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        let script = script(call, !command.is_empty());
        let init_script = path_arg(&self.init_script)?;
        let mut args = vec!["-c", script.as_str(), SCRIPT_NAME, init_script, version];
        args.extend_from_slice(command);
        execute_checked(&self.bash, &args, options)
    }
}

/// Bash program that sources `$1`, runs `call`, and optionally execs the
/// arguments after the version.
pub fn script(call: &str, then_command: bool) -> String {
    if then_command {
        format!(
            "source \"$1\" >/dev/null && {} >/dev/null && shift 2 && \"$@\"",
            call
        )
    } else {
        format!("source \"$1\" >/dev/null && {}", call)
    }
}

/// Find a manager's init script.
///
/// `$<env_var>/<file>` wins when it exists, then each default directory
/// under `home`. When nothing exists the first default is returned so the
/// failure surfaces on the first call.
pub fn locate_init_script<F>(
    home: &Path,
    env_var: &str,
    defaults: &[&str],
    file: &str,
    env_fn: F,
) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = env_fn(env_var) {
        let candidate = PathBuf::from(dir).join(file);
        if candidate.exists() {
            return candidate;
        }
    }

    let candidates: Vec<PathBuf> = defaults.iter().map(|d| home.join(d).join(file)).collect();
    candidates
        .iter()
        .find(|c| c.exists())
        .or(candidates.first())
        .cloned()
        .unwrap_or_else(|| home.join(file))
}

/// The current user's home directory, or `/` when it can't be determined.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}
