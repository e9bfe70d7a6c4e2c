//! Snapshot of the environment variables the driver consults.
//!
//! The driver never reads the process environment directly; the binary
//! captures a [`HostEnv`] once and passes it down so flag resolution and
//! compiler discovery stay deterministic under test.

use std::collections::BTreeMap;
use std::env;

/// Native compiler override (may carry extra words, e.g. `ccache clang`).
pub const CC: &str = "CC";
/// Root of the Algorithmic C types installation.
pub const AC_TYPES_DIR: &str = "AC_TYPES_DIR";
/// Root of the SystemC installation.
pub const SC_TYPES_DIR: &str = "SC_TYPES_DIR";
/// Search path used to discover native compilers.
pub const PATH: &str = "PATH";

const CAPTURED: [&str; 4] = [CC, AC_TYPES_DIR, SC_TYPES_DIR, PATH];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    vars: BTreeMap<String, String>,
}

impl HostEnv {
    /// Capture the variables of interest from the current process.
    pub fn capture() -> Self {
        let vars = CAPTURED
            .iter()
            .filter_map(|name| env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        Self { vars }
    }

    /// Builder-style setter, mostly for tests.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Value of `name`, treating an empty string as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_unset() {
        let env = HostEnv::default().with(CC, "").with(SC_TYPES_DIR, "/opt/systemc");
        assert_eq!(env.get(CC), None);
        assert_eq!(env.get(SC_TYPES_DIR), Some("/opt/systemc"));
        assert_eq!(env.get(AC_TYPES_DIR), None);
    }
}
