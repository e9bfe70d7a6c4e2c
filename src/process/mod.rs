// This module is the external process invoker. Every subprocess the driver starts (ASLi,
// the native compiler, the produced executable, asl-opt) goes through the ToolRunner trait
// so the orchestrator can be written as a linear chain of fallible steps: run() blocks
// until the tool exits and turns a non-zero status into DriverError::ExternalToolFailure
// carrying the tool name, the full command line and the exit code. Tool output is never
// captured or reinterpreted on that path; stdout and stderr are inherited so the tool's
// own diagnostics are what the user sees. capture() exists only for ASLi's flag queries.
// SystemRunner talks to the operating system; DryRunner records commands instead.

//! External process invocation.

mod dry_run;

pub use dry_run::DryRunner;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::core::env::{HostEnv, PATH};
use crate::core::session::report;
use crate::core::{DriverError, DriverResult};

/// A command line: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build a command from a word list such as a split `CC` value.
    pub fn from_words(words: &[String]) -> Option<Self> {
        let (program, rest) = words.split_first()?;
        Some(Self::new(program.clone()).args(rest.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Short tool name used to attribute failures.
    pub fn tool(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.clone())
    }

    fn failure(&self, code: Option<i32>) -> DriverError {
        DriverError::ExternalToolFailure {
            tool: self.tool(),
            command: self.to_string(),
            code: code.unwrap_or(-1),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external tools on behalf of a session.
pub trait ToolRunner {
    /// Run `cmd` to completion with inherited stdio; non-zero exit is an error.
    fn run(&mut self, cmd: &ToolCommand) -> DriverResult<()>;

    /// Run `cmd` and return its standard output.
    fn capture(&mut self, cmd: &ToolCommand) -> DriverResult<String>;

    /// Locate an executable by name on the search path.
    fn find_program(&self, name: &str) -> Option<PathBuf>;
}

/// Runs tools as real subprocesses.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Captured `PATH`, searched for native compilers.
    search_path: Option<String>,
    cwd: PathBuf,
    verbose: bool,
}

impl SystemRunner {
    pub fn new(env: &HostEnv, verbose: bool) -> Self {
        Self {
            search_path: env.get(PATH).map(str::to_string),
            cwd: std::env::current_dir().unwrap_or_default(),
            verbose,
        }
    }
}

impl ToolRunner for SystemRunner {
    fn run(&mut self, cmd: &ToolCommand) -> DriverResult<()> {
        report(self.verbose, &cmd.to_string());
        let status = Command::new(&cmd.program)
            .args(&cmd.args)
            .status()
            .map_err(|source| DriverError::ToolUnavailable {
                command: cmd.to_string(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(cmd.failure(status.code()))
        }
    }

    fn capture(&mut self, cmd: &ToolCommand) -> DriverResult<String> {
        report(self.verbose, &cmd.to_string());
        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| DriverError::ToolUnavailable {
                command: cmd.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(cmd.failure(output.status.code()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which_in(name, self.search_path.as_ref(), &self.cwd).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_and_tool_name() {
        let cmd = ToolCommand::new("/opt/asl/bin/asli")
            .arg("--batchmode")
            .args(["--nobanner", "spec.asl"]);
        assert_eq!(cmd.to_string(), "/opt/asl/bin/asli --batchmode --nobanner spec.asl");
        assert_eq!(cmd.tool(), "asli");
    }

    #[test]
    fn test_from_words() {
        let words = vec!["ccache".to_string(), "clang".to_string()];
        let cmd = ToolCommand::from_words(&words).unwrap();
        assert_eq!(cmd.program, "ccache");
        assert_eq!(cmd.args, vec!["clang"]);
        assert!(ToolCommand::from_words(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let mut runner = SystemRunner::default();
        let cmd = ToolCommand::new("sh").args(["-c", "exit 2"]);
        match runner.run(&cmd) {
            Err(DriverError::ExternalToolFailure { tool, code, .. }) => {
                assert_eq!(tool, "sh");
                assert_eq!(code, 2);
            }
            other => panic!("expected tool failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_capture() {
        let mut runner = SystemRunner::default();
        let cmd = ToolCommand::new("sh").args(["-c", "echo -DASL_C23"]);
        assert_eq!(runner.capture(&cmd).unwrap().trim(), "-DASL_C23");
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let mut runner = SystemRunner::default();
        let cmd = ToolCommand::new("/nonexistent/asl2c-test-tool");
        assert!(matches!(
            runner.run(&cmd),
            Err(DriverError::ToolUnavailable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_program_skips_non_executables() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let plain = dir.path().join("clang-18");
        let runnable = dir.path().join("clang");
        for (file, mode) in [(&plain, 0o644), (&runnable, 0o755)] {
            std::fs::write(file, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(file, std::fs::Permissions::from_mode(mode)).unwrap();
        }

        let env = HostEnv::default().with(PATH, dir.path().display().to_string());
        let runner = SystemRunner::new(&env, false);
        assert_eq!(runner.find_program("clang-18"), None);
        assert!(runner.find_program("clang").is_some());
        assert_eq!(
            crate::driver::toolchain::select_compiler(&env, &runner, false),
            vec!["clang"]
        );
    }
}
