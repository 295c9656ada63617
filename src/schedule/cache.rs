use crate::foundation::error::PatchResult;
use crate::graph::Graph;
use crate::registry::NodeRegistry;
use crate::schedule::plan::{Schedule, build_schedule, topology_hash};
use std::sync::Arc;

/// Lazily rebuilt schedule keyed by graph revision and topology hash.
///
/// A revision bump that leaves the topology unchanged (a control edit, say) keeps the
/// cached plan.
#[derive(Debug, Default)]
pub struct ScheduleCache {
    current: Option<Arc<Schedule>>,
    revision: Option<u64>,
    rebuilds: u64,
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, graph: &Graph, registry: &NodeRegistry) -> PatchResult<Arc<Schedule>> {
        if let Some(current) = &self.current {
            if self.revision == Some(graph.revision()) {
                return Ok(Arc::clone(current));
            }
            if current.topology == topology_hash(graph, registry) {
                self.revision = Some(graph.revision());
                return Ok(Arc::clone(current));
            }
        }

        let schedule = Arc::new(build_schedule(graph, registry)?);
        self.rebuilds += 1;
        tracing::debug!(
            revision = graph.revision(),
            rebuilds = self.rebuilds,
            "schedule rebuilt"
        );
        self.current = Some(Arc::clone(&schedule));
        self.revision = Some(graph.revision());
        Ok(schedule)
    }

    pub fn invalidate(&mut self) {
        self.current = None;
        self.revision = None;
    }

    pub fn current(&self) -> Option<&Arc<Schedule>> {
        self.current.as_ref()
    }

    /// Number of times a schedule was built from scratch.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/cache.rs"]
mod tests;
