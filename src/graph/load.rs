use crate::foundation::diagnostic::{Diagnostic, LoadFailure, Severity};
use crate::foundation::error::PatchResult;
use crate::graph::patch::{Connection, ControlRange, Graph, Node};
use crate::graph::model::{NodeDef, PatchDef};
use crate::graph::validate;
use crate::ports::Value;
use crate::registry::NodeRegistry;
use anyhow::Context;
use serde_json::Value as Json;
use std::collections::BTreeSet;
use std::path::Path;

/// Version written by [`crate::graph::serialize_patch`].
pub const CURRENT_VERSION: &str = "0.2";
/// Oldest accepted version; also assumed when the tag is missing.
pub const LEGACY_VERSION: &str = "0.1";

/// A loaded graph plus every non-fatal diagnostic found on the way.
#[derive(Debug)]
pub struct LoadedPatch {
    pub graph: Graph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse and validate a JSON patch.
///
/// Structural problems are isolated and reported; only unparseable input, an unsupported
/// version or duplicate node ids abort the load.
#[tracing::instrument(skip_all, fields(bytes = json.len()))]
pub fn load_patch(json: &str, registry: &NodeRegistry) -> Result<LoadedPatch, LoadFailure> {
    let def: PatchDef = serde_json::from_str(json)
        .map_err(|e| LoadFailure::single(Diagnostic::structural(format!("parse: {e}"))))?;
    load_patch_def(def, registry)
}

pub fn load_patch_path(
    path: impl AsRef<Path>,
    registry: &NodeRegistry,
) -> PatchResult<LoadedPatch> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read patch '{}'", path.display()))?;
    Ok(load_patch(&json, registry)?)
}

pub fn load_patch_def(
    def: PatchDef,
    registry: &NodeRegistry,
) -> Result<LoadedPatch, LoadFailure> {
    let mut diagnostics = Vec::new();

    let legacy = match def.version_str().as_deref() {
        None => true,
        Some(LEGACY_VERSION) => true,
        Some(CURRENT_VERSION) => false,
        Some(other) => return Err(LoadFailure::version(other)),
    };

    let mut seen = BTreeSet::new();
    let dups: Vec<Diagnostic> = def
        .nodes
        .iter()
        .filter(|n| !seen.insert(n.id))
        .map(|n| Diagnostic::structural(format!("duplicate node id {}", n.id)).at_node(n.id))
        .collect();
    if !dups.is_empty() {
        return Err(LoadFailure::new(dups));
    }

    let mut graph = Graph::new();
    graph.meta = def.meta;
    graph.editor_width = def.editor_width;

    for nd in def.nodes {
        let (mut node, mut diags) = node_from_def(nd, legacy, registry);
        diags.extend(validate::check_node(&mut node, registry));
        diagnostics.extend(diags);
        graph.insert_checked(node);
    }

    for (i, cd) in def.connections.into_iter().enumerate() {
        let conn = Connection::new(cd.from_node, cd.from_port, cd.to_node, cd.to_port);
        match graph.try_connect(conn, i, registry) {
            Ok(warnings) => diagnostics.extend(warnings),
            Err(rejected) => diagnostics.push(rejected.at_connection(i)),
        }
    }

    if !graph
        .nodes()
        .any(|n| n.is_known() && registry.describe(&n.kind).sink)
    {
        diagnostics.push(
            Diagnostic::structural("patch has no output node; nothing will render")
                .with_severity(Severity::Info),
        );
    }

    for d in &diagnostics {
        d.log();
    }
    tracing::debug!(
        nodes = graph.len(),
        connections = graph.connections().len(),
        diagnostics = diagnostics.len(),
        "patch loaded"
    );
    Ok(LoadedPatch { graph, diagnostics })
}

fn option_string(v: &Json) -> String {
    match v {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Type the literal bag of one node. Legacy patches may keep options among the controls.
fn node_from_def(nd: NodeDef, legacy: bool, registry: &NodeRegistry) -> (Node, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let mut node = Node::new(nd.id, nd.slug);
    node.x = nd.x;
    node.y = nd.y;
    node.values = nd.values;
    node.options = nd
        .option_values
        .iter()
        .map(|(k, v)| (k.clone(), option_string(v)))
        .collect();
    node.control_ranges = nd
        .control_ranges
        .into_iter()
        .map(|(k, r)| (k, ControlRange::new(r.min, r.max)))
        .collect();

    let desc = registry.get(&node.kind);
    for (name, lit) in nd.controls {
        let Some(desc) = desc else {
            match Value::infer_from_literal(&lit) {
                Some(v) => {
                    node.controls.insert(name, v);
                }
                None => {
                    node.raw_controls.insert(name, lit);
                }
            }
            continue;
        };
        if legacy && desc.option(&name).is_some() {
            diags.push(
                Diagnostic::upgrade(format!("option '{name}' moved from controls to optionValues"))
                    .at_node(node.id),
            );
            node.options
                .entry(name)
                .or_insert_with(|| option_string(&lit));
            continue;
        }
        let Some(spec) = desc.input(&name) else {
            node.raw_controls.insert(name, lit);
            continue;
        };
        match Value::from_literal(&lit, spec.ty) {
            Some(v) => {
                node.controls.insert(name, v);
            }
            None => diags.push(
                Diagnostic::coercion(format!(
                    "control '{name}' literal {lit} is not a {}; using the default",
                    spec.ty
                ))
                .at_node(node.id),
            ),
        }
    }
    (node, diags)
}

#[cfg(test)]
#[path = "../../tests/unit/graph/load.rs"]
mod tests;
