//! The JSON configuration file passed to ASLi with `--configuration`.
//!
//! ```json
//! {
//!   "exports": ["main", "Reset", "Step"],
//!   "imports": ["TraceMemRead"]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{Configuration, DriverResult};

/// Function every built program exports: the program entry point.
pub const ENTRY_POINT: &str = "main";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub exports: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thread_local_state: Vec<String>,
}

impl ConfigFile {
    /// Configuration for a build session: the entry point plus the
    /// configured exports, imports and thread-local state.
    pub fn for_session(config: &Configuration) -> Self {
        let mut exports = vec![ENTRY_POINT.to_string()];
        exports.extend(
            config
                .exports
                .iter()
                .filter(|name| name.as_str() != ENTRY_POINT)
                .cloned(),
        );
        Self {
            exports,
            imports: config.imports.clone(),
            thread_local_state: config.thread_local_vars.clone(),
        }
    }

    pub fn to_json(&self) -> DriverResult<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}
