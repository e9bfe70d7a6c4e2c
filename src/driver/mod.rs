// This module is the build orchestrator. A session is a fixed sequence of fallible steps:
// acquire a workspace, write the project script and the JSON configuration file, run ASLi
// on the inputs, and then (depending on the action) stop, or compile the generated code
// with the native toolchain, or compile and run it. Each step returns a DriverResult and
// the first failure ends the session; there is no retry and no partial resumption. The
// workspace is released on every path: explicitly when the steps finish (so a cleanup
// failure is reported) and by its Drop impl when a step fails (the step's error wins).
// Two backends take shortcuts: the interpreter runs `main` inside ASLi with no workspace
// at all, and MLIR output is executed with asl-opt instead of a native build.

//! Build orchestrator.
//!
//! ```ignore
//! use asl2c::core::{Action, Configuration, HostEnv};
//! use asl2c::backend::CompilerInstall;
//! use asl2c::driver::Driver;
//! use asl2c::process::SystemRunner;
//!
//! let config = Configuration { action: Action::Run, ..Configuration::default() };
//! let env = HostEnv::capture();
//! let driver = Driver::new(&config, CompilerInstall::new("/opt/asl/bin/asli"), env.clone());
//! let report = driver.execute(&["spec.asl".into()], &mut SystemRunner::new(&env, false))?;
//! ```

pub mod config_file;
pub mod toolchain;
pub mod workspace;

pub use config_file::ConfigFile;
pub use toolchain::NativeBuild;
pub use workspace::{SessionFiles, Workspace};

use std::path::{Path, PathBuf};

use log::info;

use crate::backend::{native_profile, Backend, CompilerInstall};
use crate::core::session::report;
use crate::core::{Action, Configuration, DriverResult, HostEnv, SessionStats};
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::process::{ToolCommand, ToolRunner};

/// MLIR execution tool.
const ASL_OPT: &str = "asl-opt";

/// What a finished session produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Text for standard output (script or flags).
    pub output: Option<String>,
    /// Workspace left on disk, if it was preserved.
    pub workspace: Option<PathBuf>,
    /// Linked executable (only meaningful if the workspace was preserved).
    pub executable: Option<PathBuf>,
    pub stats: SessionStats,
}

/// Orchestrates one session for a configuration.
#[derive(Debug, Clone)]
pub struct Driver<'a> {
    config: &'a Configuration,
    install: CompilerInstall,
    env: HostEnv,
    command_line: Option<String>,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a Configuration, install: CompilerInstall, env: HostEnv) -> Self {
        Self {
            config,
            install,
            env,
            command_line: None,
        }
    }

    /// Record the invoking command line in generated scripts.
    pub fn with_command_line(mut self, command_line: impl Into<String>) -> Self {
        self.command_line = Some(command_line.into());
        self
    }

    fn verbose(&self) -> bool {
        self.config.verbose
    }

    /// Resolve the pipeline with generated code going to `output_dir`.
    pub fn pipeline(&self, output_dir: Option<&Path>) -> DriverResult<Pipeline> {
        let builder = PipelineBuilder::new(self.config);
        match output_dir {
            Some(dir) => builder.output_dir(dir.display().to_string()).build(),
            None => builder.build(),
        }
    }

    /// Script text for a script-only session.
    pub fn script(&self) -> DriverResult<String> {
        let pipeline = self.pipeline(None)?;
        Ok(pipeline.to_script(self.command_line.as_deref()))
    }

    /// Native compile flags: ASLi runtime flags then backend flags.
    pub fn c_flags<R: ToolRunner>(&self, runner: &mut R) -> DriverResult<Vec<String>> {
        let profile = native_profile(self.config.backend, &self.env)?;
        let mut flags = self.install.runtime_c_flags(runner)?;
        flags.extend(profile.c_flags);
        Ok(flags)
    }

    /// Native link flags: ASLi runtime flags then backend flags.
    pub fn ld_flags<R: ToolRunner>(&self, runner: &mut R) -> DriverResult<Vec<String>> {
        let profile = native_profile(self.config.backend, &self.env)?;
        let mut flags = self.install.runtime_ld_flags(runner)?;
        flags.extend(profile.ld_flags);
        Ok(flags)
    }

    /// Run the session selected by the configured action over `inputs`.
    pub fn execute<R: ToolRunner>(
        &self,
        inputs: &[PathBuf],
        runner: &mut R,
    ) -> DriverResult<SessionReport> {
        self.config.validate_session(inputs)?;

        let mut report = match (self.config.action, self.config.backend) {
            (Action::EmitScript, _) => SessionReport {
                output: Some(self.script()?),
                ..SessionReport::default()
            },
            (Action::PrintCFlags, _) => SessionReport {
                output: Some(self.c_flags(runner)?.join(" ")),
                ..SessionReport::default()
            },
            (Action::PrintLdFlags, _) => SessionReport {
                output: Some(self.ld_flags(runner)?.join(" ")),
                ..SessionReport::default()
            },
            (Action::Run, Backend::Interpreter) => self.interpret(inputs, runner)?,
            (Action::Run, Backend::Mlir) => self.in_workspace(|ws, stats| {
                self.run_mlir(ws, inputs, runner, stats).map(|()| None)
            })?,
            _ => self.in_workspace(|ws, stats| self.build(ws, inputs, runner, stats))?,
        };

        if self.verbose() && !report.stats.tools_run.is_empty() {
            info!("{}", report.stats);
        }
        report.output = report.output.take().map(|text| text.trim_end().to_string());
        Ok(report)
    }

    /// Run `steps` inside a fresh workspace and release it on every path.
    fn in_workspace<F>(&self, steps: F) -> DriverResult<SessionReport>
    where
        F: FnOnce(&Workspace, &mut SessionStats) -> DriverResult<Option<PathBuf>>,
    {
        let workspace = Workspace::acquire(
            self.config.working_dir.as_deref(),
            self.config.save_temps,
            self.verbose(),
        )?;
        let mut stats = SessionStats::default();
        let outcome = steps(&workspace, &mut stats);

        let preserved = workspace.is_preserved().then(|| workspace.path().to_path_buf());
        let released = workspace.release();
        let executable = outcome?;
        released?;

        Ok(SessionReport {
            output: None,
            workspace: preserved,
            executable,
            stats,
        })
    }

    fn invoke<R: ToolRunner>(
        &self,
        runner: &mut R,
        cmd: &ToolCommand,
        stats: &mut SessionStats,
    ) -> DriverResult<()> {
        stats.record_tool(&cmd.tool());
        runner.run(cmd)
    }

    fn write(
        &self,
        workspace: &Workspace,
        path: &Path,
        contents: &str,
        what: &str,
        stats: &mut SessionStats,
    ) -> DriverResult<()> {
        workspace.write(path, contents)?;
        stats.record_file_written();
        report(self.verbose(), &format!("# Generated {what} {}", path.display()));
        Ok(())
    }

    /// ASLi with the checking flags shared by every invocation.
    fn asli_command(&self) -> ToolCommand {
        let config = self.config;
        let mut cmd = ToolCommand::new(self.install.asli().display().to_string())
            .args(["--batchmode", "--nobanner"])
            .arg("--check-call-markers")
            .arg("--check-exception-markers")
            .arg(if config.constraint_checks {
                "--check-constraints"
            } else {
                "--no-check-constraints"
            })
            .arg(if config.runtime_checks {
                "--runtime-checks"
            } else {
                "--no-runtime-checks"
            });
        if config.bounded_ints {
            cmd = cmd.arg("--exec=:xform_bounded");
        }
        cmd
    }

    fn build<R: ToolRunner>(
        &self,
        workspace: &Workspace,
        inputs: &[PathBuf],
        runner: &mut R,
        stats: &mut SessionStats,
    ) -> DriverResult<Option<PathBuf>> {
        let config = self.config;
        let cxx = config.uses_cxx();
        let files = workspace.files(&config.basename, cxx);

        let pipeline = self.pipeline(Some(workspace.path()))?;
        stats.record_stages(pipeline.without_snapshots().len());
        let script = pipeline.to_script(self.command_line.as_deref());
        self.write(workspace, &files.project, &script, "project", stats)?;

        let config_json = ConfigFile::for_session(config).to_json()?;
        self.write(workspace, &files.config, &config_json, "configuration file", stats)?;

        let asli = self
            .asli_command()
            .arg(format!("--project={}", files.project.display()))
            .arg(format!("--configuration={}", files.config.display()))
            .args(
                config
                    .configurations
                    .iter()
                    .map(|c| format!("--configuration={}", c.display())),
            )
            .args(inputs.iter().map(|p| p.display().to_string()));
        self.invoke(runner, &asli, stats)?;

        // A final dump replaces code generation: nothing to compile.
        if !config.action.links() || config.show_final_asl {
            return Ok(None);
        }

        let native = NativeBuild::new(
            toolchain::select_compiler(&self.env, runner, cxx),
            self.c_flags(runner)?,
            self.ld_flags(runner)?,
            workspace.path(),
            cxx,
        );

        let mut objects = Vec::with_capacity(config.extra_c.len());
        for source in &config.extra_c {
            let object = workspace.object_for(source);
            self.invoke(runner, &native.compile_object(source, &object), stats)?;
            objects.push(object);
        }
        let link = native.link(&files.sources, &objects, &files.executable);
        self.invoke(runner, &link, stats)?;

        if config.action == Action::Run {
            let program = ToolCommand::new(files.executable.display().to_string());
            self.invoke(runner, &program, stats)?;
        }
        Ok(Some(files.executable))
    }

    fn interpret<R: ToolRunner>(
        &self,
        inputs: &[PathBuf],
        runner: &mut R,
    ) -> DriverResult<SessionReport> {
        let mut stats = SessionStats::default();
        let cmd = self
            .asli_command()
            .arg("--exec=let result = main();")
            .arg("--exec=:quit")
            .args(inputs.iter().map(|p| p.display().to_string()));
        self.invoke(runner, &cmd, &mut stats)?;
        Ok(SessionReport {
            stats,
            ..SessionReport::default()
        })
    }

    fn run_mlir<R: ToolRunner>(
        &self,
        workspace: &Workspace,
        inputs: &[PathBuf],
        runner: &mut R,
        stats: &mut SessionStats,
    ) -> DriverResult<()> {
        let files = workspace.files(&self.config.basename, false);
        let config_json = ConfigFile::for_session(self.config).to_json()?;
        self.write(workspace, &files.config, &config_json, "configuration file", stats)?;

        let asli = ToolCommand::new(self.install.asli().display().to_string())
            .arg("--batchmode")
            .arg(format!("--configuration={}", files.config.display()))
            .arg("--exec=:filter_reachable_from exports")
            .arg(format!("--exec=:generate_mlir --output-file={}", files.mlir.display()))
            .arg("--exec=:quit")
            .args(inputs.iter().map(|p| p.display().to_string()));
        self.invoke(runner, &asli, stats)?;
        report(self.verbose(), &format!("# Generated {}", files.mlir.display()));

        let exec = ToolCommand::new(ASL_OPT)
            .arg("--target=exec")
            .arg(files.mlir.display().to_string());
        self.invoke(runner, &exec, stats)?;
        report(self.verbose(), &format!("# Ran {}", files.mlir.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DriverError;
    use crate::process::DryRunner;

    fn in_tree() -> CompilerInstall {
        CompilerInstall::new("/asl/_build/install/default/bin/asli")
    }

    #[test]
    fn test_script_only_session() {
        let config = Configuration::default();
        let driver = Driver::new(&config, in_tree(), HostEnv::default()).with_command_line("asl2c");
        let mut runner = DryRunner::new();
        let report = driver.execute(&[], &mut runner).unwrap();
        let output = report.output.unwrap();
        assert!(output.contains("// Generated by command: asl2c"));
        assert!(output.ends_with(":quit"));
        assert!(runner.commands().is_empty());
        assert!(report.workspace.is_none());
    }

    #[test]
    fn test_print_flags() {
        let config = Configuration {
            action: Action::PrintCFlags,
            ..Configuration::default()
        };
        let driver = Driver::new(&config, in_tree(), HostEnv::default());
        let report = driver.execute(&[], &mut DryRunner::new()).unwrap();
        assert_eq!(
            report.output.unwrap(),
            "-I/asl/_build/install/default/lib/asli/runtime_include -DASL_C23"
        );
    }

    #[test]
    fn test_interpreter_run() {
        let config = Configuration {
            action: Action::Run,
            backend: Backend::Interpreter,
            bounded_ints: true,
            ..Configuration::default()
        };
        let driver = Driver::new(&config, in_tree(), HostEnv::default());
        let mut runner = DryRunner::new();
        driver.execute(&["spec.asl".into()], &mut runner).unwrap();
        assert_eq!(runner.commands().len(), 1);
        let cmd = &runner.commands()[0];
        assert!(cmd.contains("--exec=:xform_bounded --exec=let result = main(); --exec=:quit spec.asl"));
    }

    #[test]
    fn test_mlir_run() {
        let scratch = tempfile::TempDir::new().unwrap();
        let work = scratch.path().join("mlir");
        let config = Configuration {
            action: Action::Run,
            backend: Backend::Mlir,
            working_dir: Some(work.clone()),
            ..Configuration::default()
        };
        let driver = Driver::new(&config, in_tree(), HostEnv::default());
        let mut runner = DryRunner::new();
        driver.execute(&["spec.asl".into()], &mut runner).unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("--exec=:generate_mlir --output-file="));
        assert!(commands[1].starts_with("asl-opt --target=exec "));
        assert!(!work.exists());
    }

    #[test]
    fn test_invalid_session_runs_nothing() {
        let config = Configuration {
            action: Action::Build,
            num_c_files: 4,
            ..Configuration::default()
        };
        let driver = Driver::new(&config, in_tree(), HostEnv::default());
        let mut runner = DryRunner::new();
        assert!(matches!(
            driver.execute(&[], &mut runner),
            Err(DriverError::InvalidConfiguration { .. })
        ));
        assert!(runner.commands().is_empty());
    }
}
