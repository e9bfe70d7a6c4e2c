//! Recording runner used by `--dry-run` and by the orchestrator tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;

use super::{ToolCommand, ToolRunner};
use crate::core::DriverResult;

/// A [`ToolRunner`] that records command lines instead of running them.
///
/// Failures and query output can be scripted by matching a substring of
/// the rendered command line.
#[derive(Debug, Clone, Default)]
pub struct DryRunner {
    commands: Vec<String>,
    failures: Vec<(String, i32)>,
    outputs: Vec<(String, String)>,
    programs: BTreeMap<String, PathBuf>,
}

impl DryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any command containing `pattern` fail with `code`.
    pub fn fail_on(mut self, pattern: &str, code: i32) -> Self {
        self.failures.push((pattern.to_string(), code));
        self
    }

    /// Make `capture` of any command containing `pattern` return `output`.
    pub fn with_output(mut self, pattern: &str, output: &str) -> Self {
        self.outputs.push((pattern.to_string(), output.to_string()));
        self
    }

    /// Pretend `name` is installed at `path`.
    pub fn with_program(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.programs.insert(name.to_string(), path.into());
        self
    }

    /// Command lines seen so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    fn record(&mut self, cmd: &ToolCommand) -> DriverResult<String> {
        let line = cmd.to_string();
        info!("[dry-run] {line}");
        self.commands.push(line.clone());

        if let Some((_, code)) = self.failures.iter().find(|(p, _)| line.contains(p.as_str())) {
            return Err(cmd.failure(Some(*code)));
        }
        Ok(line)
    }
}

impl ToolRunner for DryRunner {
    fn run(&mut self, cmd: &ToolCommand) -> DriverResult<()> {
        self.record(cmd).map(drop)
    }

    fn capture(&mut self, cmd: &ToolCommand) -> DriverResult<String> {
        let line = self.record(cmd)?;
        Ok(self
            .outputs
            .iter()
            .find(|(p, _)| line.contains(p.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default())
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.programs.get(name).cloned()
    }
}
