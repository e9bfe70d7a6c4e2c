//! Session configuration.
//!
//! A [`Configuration`] is the fully resolved set of user options. It is
//! built once (by the command line front end or by a library caller) and
//! only read afterwards: the pipeline builder and the orchestrator take it
//! by shared reference.

use std::path::PathBuf;

use crate::backend::Backend;
use crate::core::{DriverError, DriverResult};

/// What a session does with the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Print the script and stop.
    #[default]
    EmitScript,
    /// Print the native compiler flags of the backend.
    PrintCFlags,
    /// Print the native linker flags of the backend.
    PrintLdFlags,
    /// Run ASLi on the inputs in a session workspace, nothing more.
    Generate,
    /// Generate, then compile and link an executable.
    Build,
    /// Build, then run the executable.
    Run,
}

impl Action {
    /// Actions that run ASLi on input files.
    pub fn uses_inputs(self) -> bool {
        matches!(self, Action::Generate | Action::Build | Action::Run)
    }

    /// Actions that produce a native executable.
    pub fn links(self) -> bool {
        matches!(self, Action::Build | Action::Run)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub action: Action,
    pub backend: Backend,

    /// Prefix of the generated files.
    pub basename: String,
    /// Directory ASLi writes generated code to (script-only sessions).
    pub output_dir: String,
    /// Prefix of the per-stage snapshot files, if snapshots are wanted.
    pub intermediates: Option<String>,
    /// Number of files the generated functions are split across.
    pub num_c_files: u32,

    pub auto_case_split: bool,
    /// Pass arguments larger than this many bits by const reference (0 = off).
    pub const_ref: u32,
    pub generate_cxx: bool,
    pub split_state: bool,
    pub line_info: bool,
    pub new_ffi: bool,

    pub instrument_unknown: bool,
    pub wrap_variables: bool,
    pub transform_int_slices: bool,
    pub hoist_lets: bool,
    /// Emit the filter that removes thread-local state variables.
    pub split_thread_local: bool,
    /// `-O0`: skip the lowering passes.
    pub minimal: bool,
    /// `-Obounded`: shrink constrained integers to their exact width.
    pub bounded_ints: bool,
    /// Dump the final ASL instead of generating code.
    pub show_final_asl: bool,

    pub constraint_checks: bool,
    pub runtime_checks: bool,

    pub exports: Vec<String>,
    pub imports: Vec<String>,
    pub thread_local_vars: Vec<String>,
    /// Extra ASLi configuration files.
    pub configurations: Vec<PathBuf>,
    /// Extra C files compiled and linked with the generated code.
    pub extra_c: Vec<PathBuf>,

    pub working_dir: Option<PathBuf>,
    pub save_temps: bool,
    pub verbose: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            action: Action::default(),
            backend: Backend::default(),
            basename: "asl".to_string(),
            output_dir: String::new(),
            intermediates: None,
            num_c_files: 1,
            auto_case_split: false,
            const_ref: 0,
            generate_cxx: false,
            split_state: false,
            line_info: false,
            new_ffi: false,
            instrument_unknown: false,
            wrap_variables: false,
            transform_int_slices: false,
            hoist_lets: true,
            split_thread_local: false,
            minimal: false,
            bounded_ints: false,
            show_final_asl: false,
            constraint_checks: false,
            runtime_checks: false,
            exports: Vec::new(),
            imports: Vec::new(),
            thread_local_vars: Vec::new(),
            configurations: Vec::new(),
            extra_c: Vec::new(),
            working_dir: None,
            save_temps: false,
            verbose: false,
        }
    }
}

impl Configuration {
    /// Whether the generated code is C++.
    pub fn uses_cxx(&self) -> bool {
        self.generate_cxx || self.backend.requires_cxx()
    }

    /// Whether the thread-local state filter stage is emitted.
    pub fn filters_thread_local(&self) -> bool {
        self.split_thread_local || !self.thread_local_vars.is_empty()
    }

    /// Check the options the pipeline builder depends on.
    pub fn validate_pipeline(&self) -> DriverResult<()> {
        if self.const_ref > 0 && !self.uses_cxx() {
            return Err(DriverError::invalid("must specify --generate-cxx with --const-ref"));
        }
        if self.num_c_files == 0 {
            return Err(DriverError::invalid("--num-c-files must be at least 1"));
        }
        if self.basename.is_empty() {
            return Err(DriverError::invalid("--basename must not be empty"));
        }
        // Script arguments are separated by whitespace.
        let words = [
            ("--basename", Some(self.basename.as_str())),
            ("--output-dir", Some(self.output_dir.as_str())),
            ("--intermediates", self.intermediates.as_deref()),
        ];
        for (option, value) in words {
            if let Some(value) = value.filter(|v| v.chars().any(char::is_whitespace)) {
                return Err(DriverError::invalid(format!(
                    "{option} '{value}' must not contain whitespace"
                )));
            }
        }
        Ok(())
    }

    /// Check the whole configuration for a session over `inputs`.
    pub fn validate_session(&self, inputs: &[PathBuf]) -> DriverResult<()> {
        let builds = self.action.uses_inputs();

        if !inputs.is_empty() && !builds {
            return Err(DriverError::invalid("only provide input files if building or running"));
        }
        if self.num_c_files != 1 && builds {
            return Err(DriverError::invalid(
                "don't specify --num-c-files if building or running",
            ));
        }
        let has_symbols = !self.imports.is_empty()
            || !self.exports.is_empty()
            || !self.extra_c.is_empty()
            || !self.thread_local_vars.is_empty();
        if has_symbols && !builds {
            return Err(DriverError::invalid(
                "don't specify --import, --export, --thread-local or --extra-c if not building or running",
            ));
        }
        if !self.configurations.is_empty() && !builds {
            return Err(DriverError::invalid(
                "don't specify --configuration unless building or running",
            ));
        }
        if self.backend == Backend::Interpreter && self.action != Action::Run {
            return Err(DriverError::invalid("must specify --run with the interpreter backend"));
        }
        if self.backend == Backend::Mlir && self.action == Action::Build {
            return Err(DriverError::invalid("the mlir backend cannot be linked, use --run"));
        }
        self.validate_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(action: Action) -> Configuration {
        Configuration {
            action,
            ..Configuration::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.backend, Backend::C23);
        assert_eq!(config.basename, "asl");
        assert_eq!(config.num_c_files, 1);
        assert!(config.hoist_lets);
        assert!(config.validate_session(&[]).is_ok());
    }

    #[test]
    fn test_const_ref_requires_cxx() {
        let config = Configuration {
            const_ref: 64,
            ..Configuration::default()
        };
        assert!(matches!(
            config.validate_pipeline(),
            Err(DriverError::InvalidConfiguration { .. })
        ));

        let cxx = Configuration {
            generate_cxx: true,
            ..config.clone()
        };
        assert!(cxx.validate_pipeline().is_ok());

        // ac implies C++ output
        let ac = Configuration {
            backend: Backend::Ac,
            ..config
        };
        assert!(ac.validate_pipeline().is_ok());
    }

    #[test]
    fn test_inputs_require_build() {
        let inputs = vec![PathBuf::from("spec.asl")];
        assert!(build(Action::EmitScript).validate_session(&inputs).is_err());
        assert!(build(Action::Run).validate_session(&inputs).is_ok());
    }

    #[test]
    fn test_file_splitting_rejected_when_building() {
        let config = Configuration {
            num_c_files: 8,
            ..build(Action::Build)
        };
        assert!(config.validate_session(&[]).is_err());

        let script = Configuration {
            num_c_files: 8,
            ..build(Action::EmitScript)
        };
        assert!(script.validate_session(&[]).is_ok());
    }

    #[test]
    fn test_symbols_require_build() {
        let config = Configuration {
            exports: vec!["Step".to_string()],
            ..build(Action::EmitScript)
        };
        assert!(config.validate_session(&[]).is_err());
        assert!(Configuration {
            action: Action::Build,
            ..config
        }
        .validate_session(&[])
        .is_ok());
    }

    #[test]
    fn test_interpreter_requires_run() {
        let config = Configuration {
            backend: Backend::Interpreter,
            ..build(Action::Build)
        };
        assert!(config.validate_session(&[]).is_err());
        assert!(Configuration {
            action: Action::Run,
            ..config
        }
        .validate_session(&[])
        .is_ok());
    }

    #[test]
    fn test_mlir_cannot_link() {
        let config = Configuration {
            backend: Backend::Mlir,
            ..build(Action::Build)
        };
        assert!(config.validate_session(&[]).is_err());
        assert!(Configuration {
            action: Action::Run,
            ..config
        }
        .validate_session(&[])
        .is_ok());
    }

    #[test]
    fn test_script_words_reject_whitespace() {
        for config in [
            Configuration {
                output_dir: "my out".to_string(),
                ..Configuration::default()
            },
            Configuration {
                basename: "sim\tmodel".to_string(),
                ..Configuration::default()
            },
            Configuration {
                intermediates: Some("logs/step one".to_string()),
                ..Configuration::default()
            },
        ] {
            assert!(matches!(
                config.validate_pipeline(),
                Err(DriverError::InvalidConfiguration { .. })
            ));
        }
    }
}
