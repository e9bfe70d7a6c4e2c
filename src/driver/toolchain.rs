//! Native compiler selection and the compile/link commands.

use std::path::{Path, PathBuf};

use crate::core::env::{HostEnv, CC};
use crate::process::ToolCommand;
use crate::process::ToolRunner;

/// Compilers tried in order when `CC` is not set.
pub const PREFERRED_COMPILERS: [&str; 4] = ["clang-18", "clang-17", "clang-16", "clang"];

/// Pick the native compiler: `CC`, else the first preferred compiler on
/// the search path, else the GNU default for the language.
pub fn select_compiler<R: ToolRunner>(env: &HostEnv, runner: &R, cxx: bool) -> Vec<String> {
    if let Some(cc) = env.get(CC) {
        let words: Vec<String> = cc.split_whitespace().map(str::to_string).collect();
        if !words.is_empty() {
            return words;
        }
    }
    let found = PREFERRED_COMPILERS
        .iter()
        .find(|name| runner.find_program(name).is_some());
    match found {
        Some(name) => vec![name.to_string()],
        None if cxx => vec!["g++".to_string()],
        None => vec!["gcc".to_string()],
    }
}

/// A resolved native build: compiler words plus complete flag sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBuild {
    pub compiler: Vec<String>,
    pub c_flags: Vec<String>,
    pub ld_flags: Vec<String>,
    /// Directory holding the generated headers.
    pub include_dir: PathBuf,
}

impl NativeBuild {
    /// Add the language standard flags to backend/runtime flags.
    pub fn new(
        compiler: Vec<String>,
        mut c_flags: Vec<String>,
        mut ld_flags: Vec<String>,
        include_dir: &Path,
        cxx: bool,
    ) -> Self {
        if cxx {
            ld_flags.push("-lstdc++".to_string());
            c_flags.push("-std=c++17".to_string());
        } else {
            c_flags.push("-std=c2x".to_string());
        }
        Self {
            compiler,
            c_flags,
            ld_flags,
            include_dir: include_dir.to_path_buf(),
        }
    }

    fn base(&self) -> ToolCommand {
        ToolCommand::from_words(&self.compiler).unwrap_or_else(|| ToolCommand::new("cc"))
    }

    fn include_flag(&self) -> String {
        format!("-I{}", self.include_dir.display())
    }

    /// Compile one user-supplied source file to an object file.
    pub fn compile_object(&self, source: &Path, object: &Path) -> ToolCommand {
        self.base()
            .arg(self.include_flag())
            .arg("-c")
            .arg("-o")
            .arg(object.display().to_string())
            .arg(source.display().to_string())
    }

    /// Compile the generated sources and link them with `objects`.
    pub fn link(&self, sources: &[PathBuf], objects: &[PathBuf], executable: &Path) -> ToolCommand {
        self.base()
            .arg("-Wno-parentheses-equality")
            .arg(self.include_flag())
            .args(self.c_flags.iter().cloned())
            .arg("-o")
            .arg(executable.display().to_string())
            .args(sources.iter().map(|p| p.display().to_string()))
            .args(objects.iter().map(|p| p.display().to_string()))
            .args(self.ld_flags.iter().cloned())
    }
}
