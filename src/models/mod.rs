//! Host build models
//!
//! Projects and test tasks as seen by the plugin.

mod project;
mod task;

pub use project::{Project, JAVA_PLUGINS, RETRY_PLUGINS};
pub use task::{RetryPolicy, TestTask, TEST_KIND};
