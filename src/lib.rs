//! Fork-per-class test partitioning
//!
//! Resolves which test classes run in a freshly forked process each, either
//! one at a time (sequential) or several at a time (parallel), and plans how
//! the two resulting test tasks are wired into a project's verification
//! pipeline.
//!
//! ```no_run
//! use run_tests_separate::config::{resolve, EnvSource, HostCapabilities, LayeredSources, MapSource};
//!
//! let sources = LayeredSources::new(
//!     MapSource::project().with("plugins.runtestsseparatejvm.listOfTests.sequential", "DbTest"),
//!     MapSource::properties(),
//!     EnvSource::snapshot(),
//! );
//! let resolution = resolve(&sources, HostCapabilities::default())?;
//! # Ok::<(), run_tests_separate::error::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod utils;
pub mod wiring;

pub use config::{resolve, Resolution, ResolvedConfiguration};
pub use error::{ConfigError, ErrorKind};
pub use wiring::{plan, WiringPlan};
