//! Shared driver infrastructure.
//!
//! - [`error`] - the error taxonomy every component reports through
//! - [`config`] - the resolved user options and their validation
//! - [`env`] - snapshot of the environment variables the driver reads
//! - [`session`] - verbosity-aware progress output and statistics

pub mod config;
pub mod env;
pub mod error;
pub mod session;

pub use config::{Action, Configuration};
pub use env::HostEnv;
pub use error::{DriverError, DriverResult};
pub use session::SessionStats;
