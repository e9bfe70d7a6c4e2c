//! Location of the ASLi executable and the runtime flags it implies.
//!
//! An installed ASLi (an opam switch) knows its own runtime flags and is
//! queried with `--print-c-flags`/`--print-ld-flags`. A build-tree ASLi
//! (`<root>/bin/asli`) is not queried; its runtime lives at a fixed place
//! relative to the executable.

use std::path::{Path, PathBuf};

use crate::core::DriverResult;
use crate::process::{ToolCommand, ToolRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInstall {
    asli: PathBuf,
}

impl CompilerInstall {
    pub fn new(asli: impl Into<PathBuf>) -> Self {
        Self { asli: asli.into() }
    }

    /// ASLi living in `dir`, preferring `asli` over `asli.exe`.
    pub fn in_dir(dir: &Path) -> Self {
        let asli = dir.join("asli");
        if asli.exists() {
            Self::new(asli)
        } else {
            Self::new(dir.join("asli.exe"))
        }
    }

    pub fn asli(&self) -> &Path {
        &self.asli
    }

    /// Whether this ASLi was installed rather than run from a build tree.
    pub fn is_installed(&self) -> bool {
        self.asli.to_string_lossy().contains("opam")
    }

    /// Install root: the parent of the `bin` directory holding ASLi.
    fn root(&self) -> PathBuf {
        self.asli
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// C flags needed to compile against the ASLi runtime.
    pub fn runtime_c_flags<R: ToolRunner>(&self, runner: &mut R) -> DriverResult<Vec<String>> {
        if self.is_installed() {
            return self.query(runner, "--print-c-flags");
        }
        let include = self.root().join("lib/asli/runtime_include");
        Ok(vec![format!("-I{}", include.display())])
    }

    /// Linker flags needed to link against the ASLi runtime.
    pub fn runtime_ld_flags<R: ToolRunner>(&self, runner: &mut R) -> DriverResult<Vec<String>> {
        if self.is_installed() {
            return self.query(runner, "--print-ld-flags");
        }
        let library = self.root().join("lib/asli/runtime/libASL.a");
        Ok(vec![library.display().to_string()])
    }

    fn query<R: ToolRunner>(&self, runner: &mut R, flag: &str) -> DriverResult<Vec<String>> {
        let cmd = ToolCommand::new(self.asli.display().to_string()).arg(flag);
        let output = runner.capture(&cmd)?;
        Ok(output.split_whitespace().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::DryRunner;

    #[test]
    fn test_build_tree_layout() {
        let install = CompilerInstall::new("/src/asl-interpreter/_build/install/default/bin/asli");
        let mut runner = DryRunner::new();

        assert!(!install.is_installed());
        assert_eq!(
            install.runtime_c_flags(&mut runner).unwrap(),
            vec!["-I/src/asl-interpreter/_build/install/default/lib/asli/runtime_include"]
        );
        assert_eq!(
            install.runtime_ld_flags(&mut runner).unwrap(),
            vec!["/src/asl-interpreter/_build/install/default/lib/asli/runtime/libASL.a"]
        );
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_installed_compiler_is_queried() {
        let install = CompilerInstall::new("/home/user/.opam/default/bin/asli");
        let mut runner = DryRunner::new().with_output("--print-c-flags", "-I/opt/asl/include -DX\n");

        assert!(install.is_installed());
        assert_eq!(
            install.runtime_c_flags(&mut runner).unwrap(),
            vec!["-I/opt/asl/include", "-DX"]
        );
        assert_eq!(runner.commands().len(), 1);
        assert_eq!(
            runner.commands()[0],
            "/home/user/.opam/default/bin/asli --print-c-flags"
        );
    }
}
