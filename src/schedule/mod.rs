//! Evaluation order for graphs that may contain feedback cycles.

pub mod cache;
pub mod plan;
pub(crate) mod scc;

pub use cache::ScheduleCache;
pub use plan::{FeedbackEdge, Schedule, build_schedule, topology_hash};
