// This module turns a Configuration into the ordered list of ASLi directives. The full
// pipeline discards unreachable code first (later passes cannot cope with constructs that
// would otherwise have been dropped), desugars in a fixed order, propagates constants
// without unrolling loops, specializes bitwidth-polymorphic functions twice with a
// reachability filter in between (the first round exposes calls to functions that are not
// yet specialized), runs a second simplification group (getter/setter and bit-tuple
// desugaring repeat because tuple flattening can expose new instances), cleans up with a
// final constant propagation, optionally bounds integer widths (last: it changes function
// types), applies the import filter, checks monomorphization and ends with the backend's
// code generation directive. The minimal (-O0) pipeline keeps only the filters and code
// generation. Building is a pure function of the configuration: same options, same stages.

//! Pipeline script builder.

use crate::backend::{codegen_profile, CodegenKind};
use crate::core::{Configuration, DriverError, DriverResult};

use super::stage::{Stage, StageKind};
use super::Pipeline;

const EXPORTS: &str = "exports";
const IMPORTS: &str = "imports";
const THREAD_LOCAL_STATE: &str = "thread_local_state";

/// Builds the [`Pipeline`] for one configuration.
#[derive(Debug, Clone)]
pub struct PipelineBuilder<'a> {
    config: &'a Configuration,
    output_dir: String,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self {
            config,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Direct generated code into `dir` instead of the configured output
    /// directory (the orchestrator points it at the session workspace).
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Validate the configuration and resolve the pipeline.
    pub fn build(&self) -> DriverResult<Pipeline> {
        self.config.validate_pipeline()?;
        if self.output_dir.chars().any(char::is_whitespace) {
            return Err(DriverError::invalid(format!(
                "output directory '{}' must not contain whitespace",
                self.output_dir
            )));
        }

        let mut stages = if self.config.minimal {
            self.minimal_stages()?
        } else {
            self.full_stages()?
        };
        stages.push(Stage::new(StageKind::Quit));

        if let Some(prefix) = &self.config.intermediates {
            stages = interleave_snapshots(stages, prefix);
        }
        Ok(Pipeline::new(stages))
    }

    fn full_stages(&self) -> DriverResult<Vec<Stage>> {
        let config = self.config;
        let mut stages = vec![reachable_with_builtins()];

        // Desugaring. Later passes are only defined over the desugared subset.
        stages.push(Stage::new(StageKind::XformNamedType));
        stages.push(Stage::new(StageKind::XformDesugar));
        stages.push(Stage::new(StageKind::XformBittuples));
        stages.push(Stage::new(StageKind::XformLower));
        if config.transform_int_slices {
            stages.push(Stage::new(StageKind::XformIntBitslices));
        }
        stages.push(Stage::new(StageKind::XformGetset));
        if config.instrument_unknown {
            stages.push(Stage::with_args(StageKind::XformValid, ["track-valid"]));
        }

        stages.push(constprop());

        // Specialization, repeated once the first round has been filtered.
        stages.push(self.monomorphize());
        stages.push(reachable_with_builtins());
        stages.push(self.monomorphize());

        stages.push(Stage::new(StageKind::XformTuples));
        stages.push(Stage::new(StageKind::XformGetset));
        stages.push(Stage::new(StageKind::XformBittuples));
        if config.hoist_lets {
            stages.push(Stage::new(StageKind::XformHoistLets));
        }
        if config.backend.native_bitslices() {
            stages.push(Stage::with_args(StageKind::XformBitslices, ["--notransform"]));
        } else {
            stages.push(Stage::new(StageKind::XformBitslices));
        }
        stages.push(Stage::new(StageKind::XformCase));
        if config.wrap_variables {
            stages.push(Stage::new(StageKind::XformWrap));
        }

        stages.push(constprop());
        if config.bounded_ints {
            stages.push(Stage::new(StageKind::XformBounded));
        }

        stages.extend(import_filters());
        if config.filters_thread_local() {
            stages.push(Stage::with_args(
                StageKind::FilterListedVariables,
                [THREAD_LOCAL_STATE],
            ));
        }

        stages.push(Stage::with_args(
            StageKind::CheckMonomorphization,
            ["--fatal", "--verbose"],
        ));
        stages.push(self.final_stage(config.num_c_files)?);
        Ok(stages)
    }

    fn minimal_stages(&self) -> DriverResult<Vec<Stage>> {
        let mut stages = vec![reachable_with_builtins()];
        stages.extend(import_filters());
        if self.config.bounded_ints {
            stages.push(Stage::new(StageKind::XformBounded));
        }
        stages.push(self.final_stage(1)?);
        Ok(stages)
    }

    fn monomorphize(&self) -> Stage {
        let split = if self.config.auto_case_split {
            "--auto-case-split"
        } else {
            "--no-auto-case-split"
        };
        Stage::with_args(StageKind::XformMonomorphize, [split])
    }

    /// Code generation, or a raw dump when the final ASL was asked for.
    fn final_stage(&self, num_files: u32) -> DriverResult<Stage> {
        if self.config.show_final_asl {
            return Ok(Stage::with_args(StageKind::Show, ["--format=raw"]));
        }

        let config = self.config;
        let profile = codegen_profile(config.backend)?;
        let mut args: Vec<String> = Vec::new();

        match profile.kind {
            CodegenKind::C => {
                if config.new_ffi || config.action.uses_inputs() {
                    args.push("--new-ffi".to_string());
                }
                args.extend(profile.flags.iter().map(|f| f.to_string()));
                if config.const_ref > 0 {
                    args.push(format!("--const-ref={}", config.const_ref));
                }
                if config.uses_cxx() {
                    args.push("--generate-cxx".to_string());
                }
                if config.split_state {
                    args.push("--split-state".to_string());
                }
                args.push(format!("--output-dir={}", self.output_dir));
                args.push(format!("--basename={}", config.basename));
                args.push(format!("--num-c-files={num_files}"));
                args.push(if config.line_info { "--line-info" } else { "--no-line-info" }.to_string());
                Ok(Stage::with_args(StageKind::GenerateC, args))
            }
            CodegenKind::Mlir => {
                args.extend(profile.flags.iter().map(|f| f.to_string()));
                args.push(format!("--output-file={}", output_path(&self.output_dir, "asl.mlir")));
                Ok(Stage::with_args(StageKind::GenerateMlir, args))
            }
        }
    }
}

fn reachable_with_builtins() -> Stage {
    Stage::with_args(StageKind::FilterReachableFrom, ["--keep-builtins", EXPORTS])
}

fn constprop() -> Stage {
    Stage::with_args(StageKind::XformConstprop, ["--nounroll"])
}

/// Delete definitions of imported functions, then whatever that orphaned.
fn import_filters() -> [Stage; 2] {
    [
        Stage::with_args(StageKind::FilterUnlistedFunctions, [IMPORTS]),
        Stage::with_args(StageKind::FilterReachableFrom, [EXPORTS]),
    ]
}

fn output_path(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{file}", dir.trim_end_matches('/'))
    }
}

/// Follow every stage but the final quit with a numbered raw dump.
fn interleave_snapshots(stages: Vec<Stage>, prefix: &str) -> Vec<Stage> {
    let mut out = Vec::with_capacity(stages.len() * 2);
    let mut index = 0;
    for stage in stages {
        let snapshot = (stage.kind != StageKind::Quit).then(|| {
            Stage::with_args(
                StageKind::Show,
                [
                    "--format=raw".to_string(),
                    "--output".to_string(),
                    format!("{prefix}.{index:02}.{}.asl", stage.name()),
                ],
            )
        });
        out.push(stage);
        if let Some(snapshot) = snapshot {
            out.push(snapshot);
            index += 1;
        }
    }
    out
}
