//! ASL to C driver binary.
//!
//! Prints the ASLi project script by default; `--build` and `--run` drive
//! ASLi and the native toolchain over the given ASL files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::debug;

use asl2c::backend::{Backend, CompilerInstall};
use asl2c::core::{Action, Configuration, DriverResult, HostEnv};
use asl2c::driver::{Driver, SessionReport};
use asl2c::process::{DryRunner, SystemRunner};

#[derive(Parser, Debug)]
#[command(name = "asl2c", version, about = "Generate and build C code from ASL specifications")]
struct Cli {
    /// Generate intermediate files with this prefix
    #[arg(long, value_name = "LOG_PREFIX")]
    intermediates: Option<String>,

    /// Output directory for generated files
    #[arg(long, value_name = "OUTPUT_DIR", default_value = "")]
    output_dir: String,

    /// Basename of generated C files
    #[arg(long, value_name = "OUTPUT_PREFIX", default_value = "asl")]
    basename: String,

    /// Write functions to N files
    #[arg(long, value_name = "N", default_value_t = 1)]
    num_c_files: u32,

    /// Compilation configuration file (only with --build or --run)
    #[arg(long = "configuration", value_name = "JSON", action = ArgAction::Append)]
    configurations: Vec<PathBuf>,

    /// Generate case split code automatically
    #[arg(long, overrides_with = "no_auto_case_split")]
    auto_case_split: bool,
    #[arg(long, hide = true)]
    no_auto_case_split: bool,

    /// Use const & for function arguments larger than N bits
    #[arg(long, value_name = "N", default_value_t = 0)]
    const_ref: u32,

    /// Perform type constraint checks
    #[arg(long, overrides_with = "no_constraint_checks")]
    constraint_checks: bool,
    #[arg(long, hide = true)]
    no_constraint_checks: bool,

    /// Extra C file to be compiled and linked with the ASL code
    #[arg(long, value_name = "FILE", action = ArgAction::Append)]
    extra_c: Vec<PathBuf>,

    /// Export this symbol
    #[arg(long = "export", value_name = "SYMBOL", action = ArgAction::Append)]
    exports: Vec<String>,

    /// Import this symbol
    #[arg(long = "import", value_name = "SYMBOL", action = ArgAction::Append)]
    imports: Vec<String>,

    /// Thread-local state variable provided outside the generated code
    #[arg(long = "thread-local", value_name = "VAR", action = ArgAction::Append)]
    thread_local_vars: Vec<String>,

    /// Remove thread-local state variables from the generated code
    #[arg(long)]
    split_thread_local: bool,

    /// Generate C++ code
    #[arg(long)]
    generate_cxx: bool,

    /// Insert line directives into C code
    #[arg(long, overrides_with = "no_line_info")]
    line_info: bool,
    #[arg(long, hide = true)]
    no_line_info: bool,

    /// Use the new FFI
    #[arg(long)]
    new_ffi: bool,

    /// Perform runtime checks (array bounds, etc.)
    #[arg(long, overrides_with = "no_runtime_checks")]
    runtime_checks: bool,
    #[arg(long, hide = true)]
    no_runtime_checks: bool,

    /// Split state into multiple structs
    #[arg(long)]
    split_state: bool,

    /// Convert integer slices to bit slices
    #[arg(long)]
    transform_int_slices: bool,

    /// Instrument assignments of UNKNOWN
    #[arg(long)]
    instrument_unknown: bool,

    /// Wrap global variables into functions
    #[arg(long)]
    wrap_variables: bool,

    /// Do not lift let-expressions
    #[arg(long)]
    no_hoist_lets: bool,

    /// Optimization: `-O0` for the minimal transformation set,
    /// `-Obounded` for integer bounding
    #[arg(short = 'O', value_name = "LEVEL", value_parser = ["0", "bounded"], action = ArgAction::Append)]
    optimize: Vec<String>,

    /// Select backend
    #[arg(long, value_name = "BACKEND", default_value = "c23")]
    backend: Backend,

    /// Print the C flags needed to use the selected ASL C runtime
    #[arg(long)]
    print_c_flags: bool,

    /// Print the linker flags needed to use the selected ASL C runtime
    #[arg(long)]
    print_ld_flags: bool,

    /// Compile and link the ASL code
    #[arg(long)]
    build: bool,

    /// Compile, link and run the ASL code
    #[arg(long)]
    run: bool,

    /// Stop after optimization and dump ASL
    #[arg(long)]
    show_final_asl: bool,

    /// Working directory, temporarily created by default
    #[arg(long, value_name = "WORKING_DIR")]
    working_dir: Option<PathBuf>,

    /// Keep intermediate compilation results
    #[arg(long)]
    save_temps: bool,

    /// Path of the asli executable (default: next to this program)
    #[arg(long, value_name = "PATH")]
    asli: Option<PathBuf>,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,

    /// ASL input files (build and run only)
    #[arg(value_name = "ASL_FILE")]
    asl_files: Vec<PathBuf>,
}

impl Cli {
    /// Flag queries win over everything; a final dump never links.
    fn action(&self) -> Action {
        if self.print_c_flags {
            Action::PrintCFlags
        } else if self.print_ld_flags {
            Action::PrintLdFlags
        } else if self.show_final_asl && (self.run || self.build || !self.asl_files.is_empty()) {
            Action::Generate
        } else if self.run {
            Action::Run
        } else if self.build {
            Action::Build
        } else {
            Action::EmitScript
        }
    }

    fn configuration(&self) -> Configuration {
        Configuration {
            action: self.action(),
            backend: self.backend,
            basename: self.basename.clone(),
            output_dir: self.output_dir.clone(),
            intermediates: self.intermediates.clone(),
            num_c_files: self.num_c_files,
            auto_case_split: self.auto_case_split && !self.no_auto_case_split,
            const_ref: self.const_ref,
            generate_cxx: self.generate_cxx,
            split_state: self.split_state,
            line_info: self.line_info && !self.no_line_info,
            new_ffi: self.new_ffi,
            instrument_unknown: self.instrument_unknown,
            wrap_variables: self.wrap_variables,
            transform_int_slices: self.transform_int_slices,
            hoist_lets: !self.no_hoist_lets,
            split_thread_local: self.split_thread_local,
            minimal: self.optimize.iter().any(|level| level == "0"),
            bounded_ints: self.optimize.iter().any(|level| level == "bounded"),
            show_final_asl: self.show_final_asl,
            constraint_checks: self.constraint_checks && !self.no_constraint_checks,
            runtime_checks: self.runtime_checks && !self.no_runtime_checks,
            exports: self.exports.clone(),
            imports: self.imports.clone(),
            thread_local_vars: self.thread_local_vars.clone(),
            configurations: self.configurations.clone(),
            extra_c: self.extra_c.clone(),
            working_dir: self.working_dir.clone(),
            save_temps: self.save_temps,
            verbose: self.verbose,
        }
    }

    fn install(&self) -> CompilerInstall {
        if let Some(asli) = &self.asli {
            return CompilerInstall::new(asli);
        }
        match std::env::current_exe() {
            Ok(exe) => match exe.parent() {
                Some(dir) => CompilerInstall::in_dir(dir),
                None => CompilerInstall::new("asli"),
            },
            Err(e) => {
                debug!("cannot locate driver executable: {e}");
                CompilerInstall::new("asli")
            }
        }
    }
}

fn session(cli: &Cli) -> DriverResult<SessionReport> {
    let config = cli.configuration();
    let env = HostEnv::capture();
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let driver = Driver::new(&config, cli.install(), env.clone()).with_command_line(command_line);

    if cli.dry_run {
        let mut runner = DryRunner::new();
        let report = driver.execute(&cli.asl_files, &mut runner)?;
        for command in runner.commands() {
            println!("{command}");
        }
        Ok(report)
    } else {
        let mut runner = SystemRunner::new(&env, config.verbose);
        driver.execute(&cli.asl_files, &mut runner)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match session(&cli) {
        Ok(report) => {
            if let Some(output) = report.output {
                println!("{output}");
            }
            if let Some(dir) = report.workspace {
                debug!("kept working directory {}", dir.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(args: &[&str]) -> Action {
        let argv = std::iter::once("asl2c").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().action()
    }

    #[test]
    fn test_action_precedence() {
        assert_eq!(action(&[]), Action::EmitScript);
        assert_eq!(action(&["--build", "a.asl"]), Action::Build);
        assert_eq!(action(&["--run", "--build", "a.asl"]), Action::Run);
        assert_eq!(action(&["--print-c-flags", "--run"]), Action::PrintCFlags);
        assert_eq!(action(&["--print-ld-flags", "--build"]), Action::PrintLdFlags);
    }

    #[test]
    fn test_show_final_asl_never_links() {
        assert_eq!(action(&["--show-final-asl"]), Action::EmitScript);
        assert_eq!(action(&["--show-final-asl", "a.asl"]), Action::Generate);
        assert_eq!(action(&["--show-final-asl", "--run", "a.asl"]), Action::Generate);
        assert_eq!(action(&["--show-final-asl", "--build", "a.asl"]), Action::Generate);
    }

    #[test]
    fn test_optimization_levels() {
        let cli = Cli::try_parse_from(["asl2c", "-O0", "-Obounded"]).unwrap();
        let config = cli.configuration();
        assert!(config.minimal);
        assert!(config.bounded_ints);
        assert!(Cli::try_parse_from(["asl2c", "-O3"]).is_err());
    }
}
