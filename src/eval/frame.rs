use crate::audio::{AudioOpts, BandEnergies};
use crate::eval::fingerprint::fingerprint_frame;
use crate::foundation::core::{Canvas, FrameIndex, NodeId, Texture};
use crate::foundation::diagnostic::Diagnostic;
use crate::foundation::hash::Fingerprint;
use crate::graph::{Connection, ControlRange, Graph, Node};
use crate::ports::{PortType, Value, coerce};
use crate::registry::kinds::passthrough::WILDCARD;
use crate::registry::{
    EvalCtx, EvalError, InputSpec, NodeDescriptor, NodeInit, NodeRegistry, NodeState, PortValues,
    SinkRequests,
};
use crate::schedule::Schedule;
use crate::sink::SinkEvent;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

/// Per-tick inputs coming from outside the graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInputs<'a> {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Raw band energies for this tick, `None` when no audio stream is available.
    pub audio: Option<&'a BandEnergies>,
}

/// Everything one tick produced.
#[derive(Clone, Debug)]
pub struct FrameResult {
    pub frame: FrameIndex,
    /// Texture presented by the lowest-id output node, or black.
    pub image: Texture,
    /// Frames handed to output nodes, in evaluation order.
    pub presented: Vec<(NodeId, Texture)>,
    pub events: Vec<(NodeId, SinkEvent)>,
    pub diagnostics: Vec<Diagnostic>,
    pub fingerprint: Fingerprint,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct FeedbackKey {
    from: NodeId,
    from_port: String,
    to: NodeId,
    to_port: String,
}

impl FeedbackKey {
    fn new(from: NodeId, from_port: &str, to: NodeId, to_port: &str) -> Self {
        Self {
            from,
            from_port: from_port.to_owned(),
            to,
            to_port: to_port.to_owned(),
        }
    }

    fn of(c: &Connection) -> Self {
        Self::new(c.from, &c.from_port, c.to, &c.to_port)
    }
}

#[derive(Debug)]
struct StateSlot {
    kind: String,
    epoch: u64,
    state: NodeState,
}

/// Replays a [`Schedule`] once per tick.
///
/// Owns node-local state (animation phase, audio envelopes, accumulation buffers) and the
/// one-frame feedback buffers. Outputs of the current tick live only until the next one starts.
#[derive(Debug)]
pub struct FrameEvaluator {
    canvas: Canvas,
    audio: AudioOpts,
    states: BTreeMap<NodeId, StateSlot>,
    feedback: BTreeMap<FeedbackKey, Value>,
    outputs: HashMap<NodeId, PortValues<'static>>,
    frame: FrameIndex,
}

impl FrameEvaluator {
    pub fn new(canvas: Canvas, audio: AudioOpts) -> Self {
        Self {
            canvas,
            audio,
            states: BTreeMap::new(),
            feedback: BTreeMap::new(),
            outputs: HashMap::new(),
            frame: FrameIndex(0),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Index the next tick will carry.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Output of `node` on the last tick.
    pub fn output(&self, node: NodeId, port: &str) -> Option<&Value> {
        let values = self.outputs.get(&node)?;
        values
            .iter()
            .find(|(n, _)| *n == port)
            .or_else(|| values.iter().find(|(n, _)| *n == WILDCARD))
            .map(|(_, v)| v)
    }

    pub fn state(&self, node: NodeId) -> Option<&NodeState> {
        self.states.get(&node).map(|slot| &slot.state)
    }

    pub fn states(&self) -> impl Iterator<Item = (NodeId, &NodeState)> {
        self.states.iter().map(|(id, slot)| (*id, &slot.state))
    }

    /// Previous-frame value buffered for a feedback connection.
    pub fn feedback_value(&self, conn: &Connection) -> Option<&Value> {
        self.feedback.get(&FeedbackKey::of(conn))
    }

    /// Drop all node state and feedback buffers; the frame counter keeps running.
    pub fn reset(&mut self) {
        self.states.clear();
        self.feedback.clear();
        self.outputs.clear();
    }

    /// Evaluate one frame.
    ///
    /// Node failures never abort the tick: the failing node yields neutral outputs for this
    /// frame and a `RuntimeEval` diagnostic.
    #[tracing::instrument(skip_all, fields(frame = self.frame.0))]
    pub fn tick(
        &mut self,
        graph: &Graph,
        schedule: &Schedule,
        registry: &NodeRegistry,
        inputs: FrameInputs<'_>,
    ) -> FrameResult {
        self.reconcile(graph, registry);
        self.outputs.clear();

        let frame = self.frame;
        let mut diagnostics = Vec::new();
        let mut presented = Vec::new();
        let mut events = Vec::new();

        for &id in &schedule.order {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let desc = effective_descriptor(node, schedule, registry);
            let resolved: PortValues<'_> = if desc.is_passthrough() {
                self.passthrough_inputs(graph, schedule, registry, id)
            } else {
                desc.inputs
                    .iter()
                    .map(|spec| {
                        let v = self.resolve_input(graph, schedule, registry, node, spec);
                        (spec.name, v)
                    })
                    .collect()
            };

            let supplied: SmallVec<[&str; 6]> = desc
                .inputs
                .iter()
                .filter(|spec| {
                    graph.effective_input(id, spec.name).is_some()
                        || node.controls.contains_key(spec.name)
                })
                .map(|spec| spec.name)
                .collect();

            let mut outs: PortValues<'static> = SmallVec::new();
            let mut requests = SinkRequests::default();
            let result = if node.is_malformed() && !desc.is_passthrough() {
                Ok(())
            } else {
                let mut scratch = NodeState::Stateless;
                let state = match self.states.get_mut(&id) {
                    Some(slot) if !desc.is_passthrough() => &mut slot.state,
                    _ => &mut scratch,
                };
                let mut ctx = EvalCtx {
                    node: id,
                    frame,
                    dt: inputs.dt,
                    canvas: self.canvas,
                    state,
                    inputs: &resolved,
                    supplied: &supplied,
                    options: &node.options,
                    audio: inputs.audio,
                    outputs: &mut outs,
                    sink: &mut requests,
                };
                (desc.eval)(&mut ctx).and_then(|()| check_finite(&outs))
            };

            if let Err(err) = result {
                let d = Diagnostic::runtime(id, err.to_string());
                d.log();
                diagnostics.push(d);
                outs.clear();
                requests = SinkRequests::default();
            }
            for spec in &desc.outputs {
                if !outs.iter().any(|(n, _)| *n == spec.name) {
                    outs.push((spec.name, Value::neutral(spec.ty, self.canvas)));
                }
            }

            if desc.sink {
                if let Some(tex) = requests.presented {
                    presented.push((id, tex));
                }
                events.extend(requests.events.into_iter().map(|ev| (id, ev)));
            }
            self.outputs.insert(id, outs);
        }

        self.swap_feedback(graph, schedule, registry);

        let image = presented
            .iter()
            .min_by_key(|(id, _)| *id)
            .map(|(_, t)| t.clone())
            .unwrap_or_else(|| Texture::black(self.canvas));
        let fingerprint = fingerprint_frame(&image, &presented, &events);
        self.frame = FrameIndex(frame.0 + 1);

        FrameResult {
            frame,
            image,
            presented,
            events,
            diagnostics,
            fingerprint,
        }
    }

    /// Create state for new nodes, rebuild it when a node's options or kind changed, and drop
    /// it for removed nodes.
    fn reconcile(&mut self, graph: &Graph, registry: &NodeRegistry) {
        self.states.retain(|id, _| graph.contains(*id));
        for node in graph.nodes() {
            let fresh = self
                .states
                .get(&node.id)
                .is_some_and(|slot| slot.epoch == node.epoch && slot.kind == node.kind);
            if fresh {
                continue;
            }
            let state = if node.is_known() {
                let init = NodeInit {
                    node: node.id,
                    controls: &node.controls,
                    options: &node.options,
                    values: &node.values,
                    audio: &self.audio,
                };
                (registry.describe(&node.kind).init)(&init)
            } else {
                NodeState::Stateless
            };
            tracing::trace!(node = %node.id, kind = %node.kind, "node state created");
            self.states.insert(
                node.id,
                StateSlot {
                    kind: node.kind.clone(),
                    epoch: node.epoch,
                    state,
                },
            );
        }
    }

    fn resolve_input(
        &self,
        graph: &Graph,
        schedule: &Schedule,
        registry: &NodeRegistry,
        node: &Node,
        spec: &InputSpec,
    ) -> Value {
        match graph.effective_input(node.id, spec.name) {
            Some(conn) => {
                let v = self.upstream(graph, schedule, registry, conn);
                coerce(&v, spec.ty, self.canvas)
            }
            None => static_control(node, spec, self.canvas),
        }
    }

    /// Every effective inbound value of a passthrough node, by port name, uncoerced.
    fn passthrough_inputs<'g>(
        &self,
        graph: &'g Graph,
        schedule: &Schedule,
        registry: &NodeRegistry,
        id: NodeId,
    ) -> PortValues<'g> {
        graph
            .effective_inputs(id)
            .into_iter()
            .map(|(conn, c)| {
                (
                    c.to_port.as_str(),
                    self.upstream(graph, schedule, registry, conn),
                )
            })
            .collect()
    }

    /// Value carried by connection `conn` this frame: the buffered previous-frame value on a
    /// feedback edge, the current output of its source otherwise.
    fn upstream(
        &self,
        graph: &Graph,
        schedule: &Schedule,
        registry: &NodeRegistry,
        conn: usize,
    ) -> Value {
        let c = &graph.connections()[conn];
        let found = if schedule.is_feedback(conn) {
            self.feedback.get(&FeedbackKey::of(c))
        } else {
            self.output(c.from, &c.from_port)
        };
        match found {
            Some(v) => v.clone(),
            None => Value::neutral(source_type(graph, registry, c), self.canvas),
        }
    }

    /// Overwrite every feedback buffer with its source's value from this frame.
    fn swap_feedback(&mut self, graph: &Graph, schedule: &Schedule, registry: &NodeRegistry) {
        let mut next = BTreeMap::new();
        for fb in &schedule.feedback {
            let v = match self.output(fb.from, &fb.from_port) {
                Some(v) => v.clone(),
                None => {
                    let ty = graph
                        .connections()
                        .get(fb.connection)
                        .map_or(PortType::Texture, |c| source_type(graph, registry, c));
                    Value::neutral(ty, self.canvas)
                }
            };
            next.insert(
                FeedbackKey::new(fb.from, &fb.from_port, fb.to, &fb.to_port),
                v,
            );
        }
        self.feedback = next;
    }
}

/// Declared type of a connection's source port; unknown kinds produce textures.
fn source_type(graph: &Graph, registry: &NodeRegistry, c: &Connection) -> PortType {
    graph
        .node(c.from)
        .filter(|n| n.is_known())
        .and_then(|n| registry.describe(&n.kind).output(&c.from_port))
        .map_or(PortType::Texture, |o| o.ty)
}

/// Static control coerced to the port type, scalars clamped into the effective range; the
/// declared default when the node sets nothing.
fn static_control(node: &Node, spec: &InputSpec, canvas: Canvas) -> Value {
    let Some(v) = node.controls.get(spec.name) else {
        return spec.default.to_value(spec.ty, canvas);
    };
    match coerce(v, spec.ty, canvas) {
        Value::Scalar(x) => {
            let range = node
                .control_ranges
                .get(spec.name)
                .copied()
                .or_else(|| spec.range.map(|(min, max)| ControlRange::new(min, max)));
            Value::Scalar(range.map_or(x, |r| r.clamp(x)))
        }
        other => other,
    }
}

fn check_finite(outs: &PortValues<'static>) -> Result<(), EvalError> {
    for (name, v) in outs {
        if let Value::Scalar(x) = v
            && !x.is_finite()
        {
            return Err(EvalError::NonFinite {
                port: (*name).to_owned(),
            });
        }
    }
    Ok(())
}

/// Descriptor used for `node` on this schedule.
pub(crate) fn effective_descriptor<'r>(
    node: &Node,
    schedule: &Schedule,
    registry: &'r NodeRegistry,
) -> &'r NodeDescriptor {
    if node.is_known() && !schedule.is_isolated(node.id) {
        registry.describe(&node.kind)
    } else {
        registry.passthrough()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/frame.rs"]
mod tests;
