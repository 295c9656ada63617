//! Node kinds: declared ports, options, state and evaluation function per slug.

pub mod context;
pub mod descriptor;
pub mod kinds;
pub mod state;

pub use context::{EvalCtx, EvalError, EvalResult, PortValues, SinkRequests};
pub use descriptor::{
    EvalFn, InitFn, InputSpec, NodeDescriptor, OptionSpec, OutputSpec, PortDefault,
};
pub use state::{AnimationState, EdgeTrigger, NodeInit, NodeState, OutputState};

use std::collections::BTreeMap;

/// Lookup table from kind slug to [`NodeDescriptor`].
///
/// Unknown kinds resolve to a passthrough descriptor instead of failing.
#[derive(Debug)]
pub struct NodeRegistry {
    kinds: BTreeMap<&'static str, NodeDescriptor>,
    passthrough: NodeDescriptor,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl NodeRegistry {
    /// A registry with no kinds; every lookup falls back to passthrough.
    pub fn empty() -> Self {
        Self {
            kinds: BTreeMap::new(),
            passthrough: NodeDescriptor::passthrough(),
        }
    }

    /// A registry with every built-in kind.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        kinds::register_standard_kinds(&mut reg);
        reg
    }

    /// Add or replace a kind.
    pub fn register(&mut self, desc: NodeDescriptor) {
        if self.kinds.insert(desc.kind, desc).is_some() {
            tracing::debug!("node kind re-registered");
        }
    }

    pub fn get(&self, kind: &str) -> Option<&NodeDescriptor> {
        self.kinds.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Descriptor for `kind`, or the passthrough descriptor when unknown.
    pub fn describe(&self, kind: &str) -> &NodeDescriptor {
        self.get(kind).unwrap_or(&self.passthrough)
    }

    pub fn passthrough(&self) -> &NodeDescriptor {
        &self.passthrough
    }

    /// Registered slugs in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/registry.rs"]
mod tests;
