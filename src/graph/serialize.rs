use crate::foundation::error::{PatchError, PatchResult};
use crate::graph::patch::Graph;
use crate::graph::load::CURRENT_VERSION;
use crate::graph::model::{ConnectionDef, NodeDef, PatchDef, RangeDef};
use serde_json::Value as Json;

impl Graph {
    /// Boundary form of the graph at the current format version.
    ///
    /// Typed controls are written as canonical literals; editor hints, meta and values are
    /// copied verbatim.
    pub fn to_def(&self) -> PatchDef {
        let nodes = self
            .nodes()
            .map(|n| {
                let mut controls: std::collections::BTreeMap<String, Json> = n
                    .controls
                    .iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.to_literal()?)))
                    .collect();
                for (k, lit) in &n.raw_controls {
                    controls.entry(k.clone()).or_insert_with(|| lit.clone());
                }
                NodeDef {
                    id: n.id,
                    slug: n.kind.clone(),
                    x: n.x.clone(),
                    y: n.y.clone(),
                    controls,
                    option_values: n
                        .options
                        .iter()
                        .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                        .collect(),
                    control_ranges: n
                        .control_ranges
                        .iter()
                        .map(|(k, r)| {
                            (
                                k.clone(),
                                RangeDef {
                                    min: r.min,
                                    max: r.max,
                                },
                            )
                        })
                        .collect(),
                    values: n.values.clone(),
                }
            })
            .collect();

        let connections = self
            .connections()
            .iter()
            .map(|c| ConnectionDef {
                from_node: c.from,
                from_port: c.from_port.clone(),
                to_node: c.to,
                to_port: c.to_port.clone(),
            })
            .collect();

        PatchDef {
            nodes,
            connections,
            editor_width: self.editor_width.clone(),
            meta: self.meta.clone(),
            version: Some(Json::String(CURRENT_VERSION.to_owned())),
        }
    }
}

/// Pretty-printed JSON of `graph` at the current format version.
pub fn serialize_patch(graph: &Graph) -> PatchResult<String> {
    serde_json::to_string_pretty(&graph.to_def())
        .map_err(|e| PatchError::parse(format!("serialize patch: {e}")))
}
