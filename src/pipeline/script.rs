//! ASLi project script text.
//!
//! A script is a sequence of lines, each blank, a `//` comment, or a
//! directive: the `:` prefix, the directive name and space-separated
//! arguments. [`render`] writes a [`Pipeline`] in that form with a short
//! comment above every stage; [`parse`] reads the directives back.

use crate::core::{DriverError, DriverResult};

use super::stage::{Stage, StageKind, DIRECTIVE_PREFIX};
use super::Pipeline;

const COMMENT: &str = "//";

/// Render `pipeline` as script text.
///
/// `command`, when given, is recorded in the header so a script on disk
/// says how it was produced.
pub fn render(pipeline: &Pipeline, command: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("// Autogenerated script to generate C code from ASL\n");
    if let Some(command) = command {
        out.push_str(&format!("//\n// Generated by command: {command}\n"));
    }

    for stage in pipeline.stages() {
        if !stage.is_snapshot() {
            out.push('\n');
            out.push_str(&format!("{COMMENT} {}\n", stage.kind.summary()));
        }
        out.push_str(&stage.to_string());
        out.push('\n');
    }
    out
}

/// Parse the directives of a script, ignoring comments and blank lines.
pub fn parse(text: &str) -> DriverResult<Vec<Stage>> {
    let mut stages = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT) {
            continue;
        }
        let malformed = |reason: String| DriverError::MalformedScript {
            line: index + 1,
            reason,
        };

        let directive = line
            .strip_prefix(DIRECTIVE_PREFIX)
            .ok_or_else(|| malformed(format!("expected a directive, found '{line}'")))?;
        let mut words = directive.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| malformed("missing directive name".to_string()))?;
        let kind = StageKind::from_name(name)
            .ok_or_else(|| malformed(format!("unknown directive '{name}'")))?;
        stages.push(Stage::with_args(kind, words));
    }
    Ok(stages)
}
