// This module holds the per-session bookkeeping that used to be process-wide state in
// the driver: verbosity and statistics. Verbosity is passed explicitly to whoever prints
// progress lines, and report() decides the log level from it (info when verbose, debug
// otherwise) so RUST_LOG can still surface the lines of a quiet session. SessionStats
// counts what a build session did (stages in the script, files written, tools run) and
// renders a short summary that the orchestrator logs at the end of a verbose session.

//! Session verbosity and statistics.

use std::fmt;

use log::{debug, info};

/// Emit a session progress line at a level chosen by `verbose`.
pub fn report(verbose: bool, message: &str) {
    if verbose {
        info!("{message}");
    } else {
        debug!("{message}");
    }
}

/// Build session statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of stages in the generated script.
    pub stages_emitted: usize,

    /// Files written into the workspace.
    pub files_written: usize,

    /// External tools run, in order (tool names only).
    pub tools_run: Vec<String>,
}

impl SessionStats {
    pub fn record_stages(&mut self, count: usize) {
        self.stages_emitted = count;
    }

    pub fn record_file_written(&mut self) {
        self.files_written += 1;
    }

    pub fn record_tool(&mut self, tool: &str) {
        self.tools_run.push(tool.to_string());
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session Statistics:")?;
        writeln!(f, "  Script stages: {}", self.stages_emitted)?;
        writeln!(f, "  Files written: {}", self.files_written)?;
        write!(f, "  Tools run: {}", self.tools_run.len())?;
        if !self.tools_run.is_empty() {
            write!(f, " ({})", self.tools_run.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_statistics() {
        let mut stats = SessionStats::default();
        stats.record_stages(31);
        stats.record_file_written();
        stats.record_file_written();
        stats.record_tool("asli");
        stats.record_tool("clang-18");

        assert_eq!(stats.files_written, 2);
        let output = stats.to_string();
        assert!(output.contains("Script stages: 31"));
        assert!(output.contains("Tools run: 2 (asli, clang-18)"));
    }
}
