// This module manages the session workspace: the directory a build session writes its
// script, configuration file and generated sources into, and the names of those files.
// A caller-specified directory is created with its parents if missing and reused as is;
// otherwise a fresh temporary directory (prefix "asltest.") is created and owned by the
// session. Files are always written by overwriting, so a reused directory with colliding
// names gives the same result as a fresh one. Release deletes the directory unless the
// caller asked to keep it; release() reports failures, and the Drop fallback covers early
// exits from the session by logging instead. Two sessions must not share one directory.

//! Session workspace management.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::TempDir;

use crate::core::session::report;
use crate::core::{DriverError, DriverResult};

const TEMP_PREFIX: &str = "asltest.";
const PROJECT_FILE: &str = "asl2c.prj";
const CONFIG_FILE: &str = "config.json";
const MLIR_FILE: &str = "asl.mlir";

/// Names of the files a session reads and writes inside its workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFiles {
    pub project: PathBuf,
    pub config: PathBuf,
    /// Generated sources, in compile order.
    pub sources: Vec<PathBuf>,
    pub executable: PathBuf,
    pub mlir: PathBuf,
}

impl SessionFiles {
    fn new(dir: &Path, basename: &str, cxx: bool) -> Self {
        let suffix = if cxx { "cpp" } else { "c" };
        Self {
            project: dir.join(PROJECT_FILE),
            config: dir.join(CONFIG_FILE),
            sources: ["exceptions", "vars", "funs"]
                .iter()
                .map(|part| dir.join(format!("{basename}_{part}.{suffix}")))
                .collect(),
            executable: dir.join(basename),
            mlir: dir.join(MLIR_FILE),
        }
    }
}

#[derive(Debug)]
enum Location {
    Temporary(Option<TempDir>),
    Given(PathBuf),
}

/// A directory exclusively owned by one session.
#[derive(Debug)]
pub struct Workspace {
    location: Location,
    path: PathBuf,
    preserve: bool,
    released: bool,
}

impl Workspace {
    /// Use `requested` (created if absent) or a new temporary directory.
    pub fn acquire(requested: Option<&Path>, preserve: bool, verbose: bool) -> DriverResult<Self> {
        let (location, path) = match requested {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| DriverError::workspace(dir, e))?;
                (Location::Given(dir.to_path_buf()), dir.to_path_buf())
            }
            None => {
                let tmp = tempfile::Builder::new()
                    .prefix(TEMP_PREFIX)
                    .keep(preserve)
                    .tempdir()
                    .map_err(|e| DriverError::workspace(std::env::temp_dir(), e))?;
                let path = tmp.path().to_path_buf();
                (Location::Temporary(Some(tmp)), path)
            }
        };
        report(verbose, &format!("# In working directory {}", path.display()));
        Ok(Self {
            location,
            path,
            preserve,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_preserved(&self) -> bool {
        self.preserve
    }

    pub fn files(&self, basename: &str, cxx: bool) -> SessionFiles {
        SessionFiles::new(&self.path, basename, cxx)
    }

    /// Object file for an extra source compiled in this workspace.
    pub fn object_for(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "extra".to_string());
        self.path.join(format!("{stem}.o"))
    }

    /// Write `contents` to `path`, replacing any existing file.
    pub fn write(&self, path: &Path, contents: &str) -> DriverResult<()> {
        fs::write(path, contents).map_err(|e| DriverError::workspace(path, e))
    }

    /// Delete the workspace unless it is preserved.
    pub fn release(mut self) -> DriverResult<()> {
        self.released = true;
        self.cleanup()
    }

    fn cleanup(&mut self) -> DriverResult<()> {
        if self.preserve {
            return Ok(());
        }
        match &mut self.location {
            Location::Temporary(tmp) => match tmp.take() {
                Some(tmp) => tmp.close().map_err(|e| DriverError::workspace(&self.path, e)),
                None => Ok(()),
            },
            Location::Given(dir) => match fs::remove_dir_all(&*dir) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(DriverError::workspace(dir.as_path(), e)),
            },
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.cleanup() {
            warn!("{e}");
        }
    }
}
