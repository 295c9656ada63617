use crate::animation::{AnimationSpec, Animator};
use crate::audio::{AudioBridge, AudioOpts};
use crate::foundation::core::{NodeId, Texture};
use crate::ports::Value;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// What a kind's init function sees when a node is first scheduled.
pub struct NodeInit<'a> {
    pub node: NodeId,
    pub controls: &'a BTreeMap<String, Value>,
    pub options: &'a BTreeMap<String, String>,
    pub values: &'a Map<String, Json>,
    pub audio: &'a AudioOpts,
}

/// Rising-edge detector for pulse inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeTrigger {
    high: bool,
}

impl EdgeTrigger {
    pub const THRESHOLD: f32 = 0.5;

    /// True on the first frame `v` crosses above the threshold.
    pub fn rising(&mut self, v: f32) -> bool {
        let high = v > Self::THRESHOLD;
        let fired = high && !self.high;
        self.high = high;
        fired
    }
}

#[derive(Clone, Debug)]
pub struct AnimationState {
    pub animator: Animator,
    /// Spec read from persisted values; unsupplied range inputs fall back to it.
    pub stored: AnimationSpec,
    pub start_stop: EdgeTrigger,
    pub restart: EdgeTrigger,
}

#[derive(Clone, Debug, Default)]
pub struct OutputState {
    pub snap: EdgeTrigger,
    pub rec: EdgeTrigger,
    pub show_a: EdgeTrigger,
    pub show_b: EdgeTrigger,
    pub recording: bool,
}

/// Node-local state, owned by the evaluator and keyed by node id.
///
/// Survives edits that do not remove the node; dropped with it.
#[derive(Clone, Debug, Default)]
pub enum NodeState {
    #[default]
    Stateless,
    Animation(AnimationState),
    Audio(AudioBridge),
    /// Accumulation buffer of a self-feeding effect.
    Frame(Option<Texture>),
    Output(OutputState),
}

impl NodeState {
    /// Write the user-visible parts of the state back into the node's persisted values.
    pub fn persist(&self, values: &mut Map<String, Json>) {
        if let Self::Animation(anim) = self {
            values.insert(
                "isRunning".to_owned(),
                Json::Bool(anim.animator.is_running()),
            );
        }
    }
}
