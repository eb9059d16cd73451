//! Scoped scratch directories for throwaway environments.
//!
//! Every probe builds its environment inside a [`ScratchDir`]. The directory
//! is removed when the guard drops, so early returns, failed commands and
//! unwinding panics all leave nothing behind.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix for scratch directory names.
pub const SCRATCH_PREFIX: &str = "compat-probe-";

/// A temporary directory removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a scratch directory under the system temp dir.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        Ok(Self { dir })
    }

    /// Create a scratch directory under `parent`.
    pub fn new_in(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the isolated environment is created inside the scratch dir.
    pub fn environment_path(&self) -> PathBuf {
        self.dir.path().join("env")
    }
}
