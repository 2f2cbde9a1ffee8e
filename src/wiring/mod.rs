//! Task wiring
//!
//! Maps a resolved configuration onto a host project's test tasks.

mod plan;

pub use plan::{plan, DependencyEdge, Exclusion, WiringPlan, BASE_TASK_NAME, VERIFICATION_GROUP};
