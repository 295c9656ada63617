//! Patch graph model: serialized form, loading and validation, the in-memory graph.

pub mod load;
pub mod model;
pub mod patch;
pub mod serialize;
mod validate;

pub use load::{
    CURRENT_VERSION, LEGACY_VERSION, LoadedPatch, load_patch, load_patch_def, load_patch_path,
};
pub use model::{ConnectionDef, MetaDef, NodeDef, PatchDef, RangeDef};
pub use patch::{Connection, ControlRange, Graph, Node};
pub use serialize::serialize_patch;
