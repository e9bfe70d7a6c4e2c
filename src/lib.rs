//! asl2c - build driver for the ASL to C compilation flow.
//!
//! The driver turns a handful of user options into an ASLi project script
//! (an ordered list of filtering, lowering and code generation directives),
//! then optionally runs ASLi on the input specifications, compiles the
//! generated code with the native toolchain and runs the result.
//!
//! # Primary Usage
//!
//! ```ignore
//! use asl2c::core::{Action, Configuration, HostEnv};
//! use asl2c::backend::{Backend, CompilerInstall};
//! use asl2c::driver::Driver;
//! use asl2c::process::SystemRunner;
//!
//! let config = Configuration {
//!     action: Action::Build,
//!     backend: Backend::Fallback,
//!     exports: vec!["Reset".into(), "Step".into()],
//!     ..Configuration::default()
//! };
//! let env = HostEnv::capture();
//! let driver = Driver::new(&config, CompilerInstall::new("/opt/asl/bin/asli"), env.clone());
//! driver.execute(&["spec.asl".into()], &mut SystemRunner::new(&env, config.verbose))?;
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Configuration, errors, host environment and session statistics
//! - [`backend`] - Backend registry: codegen and native build profiles
//! - [`pipeline`] - Pipeline builder and project script rendering
//! - [`process`] - External tool invocation
//! - [`driver`] - Build orchestrator and session workspace

pub mod backend;
pub mod core;
pub mod driver;
pub mod pipeline;
pub mod process;

pub use backend::{Backend, CompilerInstall};
pub use crate::core::{Action, Configuration, DriverError, DriverResult, HostEnv, SessionStats};
pub use driver::{Driver, SessionReport};
pub use pipeline::{Pipeline, PipelineBuilder, Stage, StageKind};
pub use process::{DryRunner, SystemRunner, ToolCommand, ToolRunner};
