//! Serialized patch format. These structs mirror the JSON layout and carry no validation; the
//! loader turns them into a [`crate::graph::Graph`].

use crate::foundation::core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDef {
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_width: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaDef>,
    /// `"0.1"` or `"0.2"`; older files may store a bare number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Json>,
}

/// Opaque patch metadata; never read by evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Json>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
    pub id: NodeId,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Json>,
    #[serde(default)]
    pub controls: BTreeMap<String, Json>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub option_values: BTreeMap<String, Json>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub control_ranges: BTreeMap<String, RangeDef>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub values: Map<String, Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDef {
    pub from_node: NodeId,
    pub from_port: String,
    pub to_node: NodeId,
    pub to_port: String,
}

/// `{"min": a, "max": b}` or `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeDef {
    pub min: f32,
    pub max: f32,
}

impl<'de> Deserialize<'de> for RangeDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f32; 2]),
            Obj { min: f32, max: f32 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([min, max]) => Ok(Self { min, max }),
            Repr::Obj { min, max } => Ok(Self { min, max }),
        }
    }
}

impl PatchDef {
    /// The `version` tag as a string, `None` when absent.
    pub fn version_str(&self) -> Option<String> {
        match self.version.as_ref()? {
            Json::String(s) => Some(s.trim().to_owned()),
            Json::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }
}
