//! Pipeline model: what stages run, in what order.
//!
//! - [`stage`] - tagged directives and their arguments
//! - [`builder`] - resolves a [`Configuration`](crate::core::Configuration) into a [`Pipeline`]
//! - [`script`] - script text serialization and parsing
//!
//! Building and serializing are separate so ordering properties can be
//! checked on the stage list without producing or running any script.

pub mod builder;
pub mod script;
pub mod stage;

pub use builder::PipelineBuilder;
pub use stage::{Stage, StageKind};

/// The resolved, ordered stages for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Index of the first stage of `kind`.
    pub fn position(&self, kind: StageKind) -> Option<usize> {
        self.stages.iter().position(|s| s.kind == kind)
    }

    /// Indices of every stage of `kind`.
    pub fn positions(&self, kind: StageKind) -> Vec<usize> {
        self.stages
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// The code generation stage, if the pipeline generates code.
    pub fn codegen_stage(&self) -> Option<&Stage> {
        self.stages.iter().find(|s| s.kind.is_codegen())
    }

    /// The stages with diagnostic snapshots removed.
    pub fn without_snapshots(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|s| !s.is_snapshot())
            .cloned()
            .collect()
    }

    /// Script text for this pipeline.
    pub fn to_script(&self, command: Option<&str>) -> String {
        script::render(self, command)
    }
}
