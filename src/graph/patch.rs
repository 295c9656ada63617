use crate::foundation::core::NodeId;
use crate::foundation::diagnostic::{Diagnostic, Severity};
use crate::foundation::error::{PatchError, PatchResult};
use crate::graph::model::MetaDef;
use crate::graph::validate;
use crate::ports::Value;
use crate::registry::NodeRegistry;
use serde_json::{Map, Value as Json};
use std::collections::{BTreeMap, HashMap};

/// Override of a scalar control's declared `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
}

impl ControlRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp into the range; an inverted or non-finite range leaves `v` untouched.
    pub fn clamp(self, v: f32) -> f32 {
        if self.min <= self.max {
            v.clamp(self.min, self.max)
        } else {
            v
        }
    }
}

/// One node instance in a patch.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Registry slug.
    pub kind: String,
    /// Typed static control values, validated against the kind's input ports.
    pub controls: BTreeMap<String, Value>,
    pub options: BTreeMap<String, String>,
    pub control_ranges: BTreeMap<String, ControlRange>,
    /// Node-owned persisted state (`startValue`, `isRunning`, `smoothing`, ...).
    pub values: Map<String, Json>,
    /// Editor-only position, carried verbatim.
    pub x: Option<Json>,
    pub y: Option<Json>,
    /// Literals of unknown-kind nodes that had no typed reading; kept for round-trips.
    pub(crate) raw_controls: BTreeMap<String, Json>,
    pub(crate) known: bool,
    pub(crate) malformed: bool,
    /// Bumped when options change so the evaluator rebuilds node state.
    pub(crate) epoch: u64,
}

impl Node {
    pub fn new(id: NodeId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            controls: BTreeMap::new(),
            options: BTreeMap::new(),
            control_ranges: BTreeMap::new(),
            values: Map::new(),
            x: None,
            y: None,
            raw_controls: BTreeMap::new(),
            known: false,
            malformed: false,
            epoch: 0,
        }
    }

    pub fn with_control(mut self, name: impl Into<String>, value: Value) -> Self {
        self.controls.insert(name.into(), value);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, choice: impl Into<String>) -> Self {
        self.options.insert(name.into(), choice.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: Json) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Kind resolved in the registry.
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// References controls its kind does not declare; evaluates to neutral outputs.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }
}

/// Directed edge `(from, from_port) -> (to, to_port)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    pub from: NodeId,
    pub from_port: String,
    pub to: NodeId,
    pub to_port: String,
}

impl Connection {
    pub fn new(
        from: NodeId,
        from_port: impl Into<String>,
        to: NodeId,
        to_port: impl Into<String>,
    ) -> Self {
        Self {
            from,
            from_port: from_port.into(),
            to,
            to_port: to_port.into(),
        }
    }
}

/// In-memory patch: nodes by id, accepted connections in registration order, adjacency.
///
/// Topology changes go through `add_node`, `add_connection` and `remove_node`; each bumps
/// [`Graph::revision`]. Schedules are derived elsewhere and rebuilt lazily.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    connections: Vec<Connection>,
    out_edges: BTreeMap<NodeId, Vec<usize>>,
    in_edges: BTreeMap<NodeId, Vec<usize>>,
    pub meta: Option<MetaDef>,
    pub editor_width: Option<Json>,
    revision: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// `(index, connection)` for every edge leaving `id`.
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = (usize, &Connection)> {
        self.edges_of(&self.out_edges, id)
    }

    /// `(index, connection)` for every edge entering `id`, shadowed ones included.
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = (usize, &Connection)> {
        self.edges_of(&self.in_edges, id)
    }

    fn edges_of<'a>(
        &'a self,
        map: &'a BTreeMap<NodeId, Vec<usize>>,
        id: NodeId,
    ) -> impl Iterator<Item = (usize, &'a Connection)> + 'a {
        map.get(&id)
            .into_iter()
            .flatten()
            .map(|&i| (i, &self.connections[i]))
    }

    /// The connection feeding `(id, port)`: the last one registered.
    pub fn effective_input(&self, id: NodeId, port: &str) -> Option<usize> {
        self.in_edges
            .get(&id)?
            .iter()
            .rev()
            .copied()
            .find(|&i| self.connections[i].to_port == port)
    }

    /// Indices of connections not shadowed by a later one into the same input port, ascending.
    pub fn effective_connections(&self) -> Vec<usize> {
        let mut last: HashMap<(NodeId, &str), usize> = HashMap::new();
        for (i, c) in self.connections.iter().enumerate() {
            last.insert((c.to, c.to_port.as_str()), i);
        }
        let mut out: Vec<usize> = last.into_values().collect();
        out.sort_unstable();
        out
    }

    /// Inbound connections of `id` that are in effect, one per target port, sorted by port name.
    pub fn effective_inputs(&self, id: NodeId) -> Vec<(usize, &Connection)> {
        let mut by_port: BTreeMap<&str, (usize, &Connection)> = BTreeMap::new();
        for (i, c) in self.in_edges(id) {
            by_port.insert(c.to_port.as_str(), (i, c));
        }
        by_port.into_values().collect()
    }

    /// Insert a node, resolving its kind and typing its controls.
    ///
    /// Fails only on a duplicate id; everything else degrades and is reported.
    pub fn add_node(
        &mut self,
        mut node: Node,
        registry: &NodeRegistry,
    ) -> PatchResult<Vec<Diagnostic>> {
        if self.nodes.contains_key(&node.id) {
            return Err(PatchError::validation(format!(
                "duplicate node id {}",
                node.id
            )));
        }
        let diags = validate::check_node(&mut node, registry);
        self.nodes.insert(node.id, node);
        self.revision += 1;
        Ok(diags)
    }

    /// Register a connection after validating it.
    ///
    /// Structural problems reject the edit; coercions and shadowing come back as warnings.
    pub fn add_connection(
        &mut self,
        conn: Connection,
        registry: &NodeRegistry,
    ) -> PatchResult<Vec<Diagnostic>> {
        let index = self.connections.len();
        self.try_connect(conn, index, registry)
            .map_err(|d| PatchError::validation(d.to_string()))
    }

    /// Validate and push `conn`; `index` is its position in the patch for diagnostics.
    pub(crate) fn try_connect(
        &mut self,
        conn: Connection,
        index: usize,
        registry: &NodeRegistry,
    ) -> Result<Vec<Diagnostic>, Diagnostic> {
        let mut diags = validate::check_connection(self, &conn, registry)
            .map_err(|d| d.at_connection(index))?;
        if let Some(prev) = self.effective_input(conn.to, &conn.to_port) {
            diags.push(
                Diagnostic::structural(format!(
                    "input '{}' of {} already fed by connection[{prev}]; the later connection wins",
                    conn.to_port, conn.to
                ))
                .with_severity(Severity::Warning)
                .at_node(conn.to),
            );
        }
        for d in &mut diags {
            d.connection = Some(index);
        }
        let i = self.connections.len();
        self.out_edges.entry(conn.from).or_default().push(i);
        self.in_edges.entry(conn.to).or_default().push(i);
        self.connections.push(conn);
        self.revision += 1;
        Ok(diags)
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.connections.retain(|c| c.from != id && c.to != id);
        self.rebuild_adjacency();
        self.revision += 1;
        Some(node)
    }

    pub fn remove_connection(&mut self, index: usize) -> Option<Connection> {
        if index >= self.connections.len() {
            return None;
        }
        let c = self.connections.remove(index);
        self.rebuild_adjacency();
        self.revision += 1;
        Some(c)
    }

    /// Replace a static control value. The value is coerced to the port type.
    pub fn set_control(
        &mut self,
        id: NodeId,
        name: &str,
        value: Value,
        registry: &NodeRegistry,
    ) -> PatchResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| PatchError::validation(format!("no node {id}")))?;
        let value = validate::typed_control(node, name, value, registry)
            .map_err(|d| PatchError::validation(d.to_string()))?;
        node.controls.insert(name.to_owned(), value);
        node.raw_controls.remove(name);
        self.revision += 1;
        Ok(())
    }

    /// Replace an option choice. Node-local state is rebuilt on the next tick.
    pub fn set_option(
        &mut self,
        id: NodeId,
        name: &str,
        choice: &str,
        registry: &NodeRegistry,
    ) -> PatchResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| PatchError::validation(format!("no node {id}")))?;
        if node.known {
            let spec = registry.describe(&node.kind).option(name).ok_or_else(|| {
                PatchError::validation(format!("kind '{}' has no option '{name}'", node.kind))
            })?;
            if !spec.accepts(choice) {
                return Err(PatchError::validation(format!(
                    "'{choice}' is not a valid choice for option '{name}'"
                )));
            }
        }
        node.options.insert(name.to_owned(), choice.to_owned());
        node.epoch += 1;
        self.revision += 1;
        Ok(())
    }

    /// Mutable access to a node's persisted values.
    pub fn values_mut(&mut self, id: NodeId) -> Option<&mut Map<String, Json>> {
        self.nodes.get_mut(&id).map(|n| &mut n.values)
    }

    fn rebuild_adjacency(&mut self) {
        self.out_edges.clear();
        self.in_edges.clear();
        for (i, c) in self.connections.iter().enumerate() {
            self.out_edges.entry(c.from).or_default().push(i);
            self.in_edges.entry(c.to).or_default().push(i);
        }
    }

    /// Insert a node without checks; the loader has already run them.
    pub(crate) fn insert_checked(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
        self.revision += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/patch.rs"]
mod tests;
