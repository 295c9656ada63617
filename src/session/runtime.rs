use crate::audio::{AudioOpts, AudioSource, SilentSource};
use crate::eval::{FrameEvaluator, FrameInputs, FrameResult};
use crate::foundation::core::{Canvas, FrameIndex, NodeId, Texture};
use crate::foundation::diagnostic::Diagnostic;
use crate::foundation::error::{PatchError, PatchResult};
use crate::foundation::hash::Fingerprint;
use crate::graph::{Connection, Graph, LoadedPatch, Node, load_patch};
use crate::ports::Value;
use crate::registry::NodeRegistry;
use crate::schedule::{Schedule, ScheduleCache};
use crate::sink::{DisplaySlot, NullSink, OutputSink, SinkEvent};
use std::sync::Arc;

/// Runtime configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeOpts {
    /// Size of every texture produced during a tick.
    pub canvas: Canvas,
    /// Defaults for audio nodes that do not configure themselves.
    pub audio: AudioOpts,
    /// Return per-tick diagnostics in [`TickReport`]. They are logged either way.
    pub record_diagnostics: bool,
}

impl Default for RuntimeOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            audio: AudioOpts::default(),
            record_diagnostics: true,
        }
    }
}

/// Outcome of one [`Runtime::tick`].
#[derive(Clone, Debug)]
pub struct TickReport {
    pub frame: FrameIndex,
    pub image: Texture,
    pub fingerprint: Fingerprint,
    /// Schedule diagnostics when the schedule was rebuilt for this tick, then per-node
    /// evaluation failures.
    pub diagnostics: Vec<Diagnostic>,
}

/// A running patch: graph, schedule cache, evaluator, audio source and output sink.
///
/// Edits take `&mut self` and therefore never overlap a tick. The schedule is rebuilt lazily on
/// the next tick after a structural edit.
pub struct Runtime<S: OutputSink = NullSink> {
    registry: Arc<NodeRegistry>,
    graph: Graph,
    cache: ScheduleCache,
    evaluator: FrameEvaluator,
    audio: Box<dyn AudioSource>,
    sink: S,
    load_diagnostics: Vec<Diagnostic>,
    opts: RuntimeOpts,
}

impl Runtime<NullSink> {
    /// Load a JSON patch against the built-in node kinds.
    pub fn from_json(json: &str, opts: RuntimeOpts) -> PatchResult<Self> {
        let registry = Arc::new(NodeRegistry::standard());
        let loaded = load_patch(json, &registry)?;
        Self::from_loaded(loaded, registry, opts)
    }

    pub fn from_loaded(
        loaded: LoadedPatch,
        registry: Arc<NodeRegistry>,
        opts: RuntimeOpts,
    ) -> PatchResult<Self> {
        let mut rt = Self::new(loaded.graph, registry, opts)?;
        let mut diags = loaded.diagnostics;
        diags.append(&mut rt.load_diagnostics);
        rt.load_diagnostics = diags;
        Ok(rt)
    }

    /// Activate `graph`. Fails only when no schedule can be built for it.
    pub fn new(graph: Graph, registry: Arc<NodeRegistry>, opts: RuntimeOpts) -> PatchResult<Self> {
        let mut cache = ScheduleCache::new();
        let schedule = cache.get(&graph, &registry)?;
        Ok(Self {
            evaluator: FrameEvaluator::new(opts.canvas, opts.audio),
            load_diagnostics: schedule.diagnostics.clone(),
            registry,
            graph,
            cache,
            audio: Box::new(SilentSource),
            sink: NullSink,
            opts,
        })
    }
}

impl<S: OutputSink> Runtime<S> {
    pub fn with_audio_source(mut self, source: impl AudioSource + 'static) -> Self {
        self.audio = Box::new(source);
        self
    }

    pub fn with_sink<T: OutputSink>(self, sink: T) -> Runtime<T> {
        Runtime {
            registry: self.registry,
            graph: self.graph,
            cache: self.cache,
            evaluator: self.evaluator,
            audio: self.audio,
            sink,
            load_diagnostics: self.load_diagnostics,
            opts: self.opts,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn evaluator(&self) -> &FrameEvaluator {
        &self.evaluator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn opts(&self) -> &RuntimeOpts {
        &self.opts
    }

    /// Diagnostics from loading and from the initial schedule.
    pub fn load_diagnostics(&self) -> &[Diagnostic] {
        &self.load_diagnostics
    }

    /// Current schedule, rebuilt first if the topology changed.
    pub fn schedule(&mut self) -> PatchResult<Arc<Schedule>> {
        self.cache.get(&self.graph, &self.registry)
    }

    /// Evaluate one frame `dt` seconds after the previous one and hand the results to the sink.
    #[tracing::instrument(skip(self), fields(frame = self.evaluator.frame().0))]
    pub fn tick(&mut self, dt: f32) -> PatchResult<TickReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PatchError::evaluation(format!(
                "tick dt must be finite and non-negative, got {dt}"
            )));
        }

        let rebuilds = self.cache.rebuilds();
        let schedule = self.cache.get(&self.graph, &self.registry)?;
        let mut diagnostics = Vec::new();
        if self.cache.rebuilds() != rebuilds {
            diagnostics.extend(schedule.diagnostics.iter().cloned());
        }

        let audio = self.audio.band_energies(dt);
        let result = self.evaluator.tick(
            &self.graph,
            &schedule,
            &self.registry,
            FrameInputs {
                dt,
                audio: audio.as_ref(),
            },
        );
        self.dispatch(&result)?;

        diagnostics.extend(result.diagnostics);
        if !self.opts.record_diagnostics {
            diagnostics.clear();
        }
        Ok(TickReport {
            frame: result.frame,
            image: result.image,
            fingerprint: result.fingerprint,
            diagnostics,
        })
    }

    /// Present every output node's frame, then forward its events.
    fn dispatch(&mut self, result: &FrameResult) -> PatchResult<()> {
        let frame = result.frame;
        for (node, tex) in &result.presented {
            self.sink.present(frame, *node, tex)?;
            for (_, ev) in result.events.iter().filter(|(n, _)| n == node) {
                match ev {
                    SinkEvent::Snapshot => self.sink.capture_snapshot(frame, *node, tex)?,
                    SinkEvent::StartRecording => self.sink.start_recording(frame, *node)?,
                    SinkEvent::StopRecording => self.sink.stop_recording(frame, *node)?,
                    SinkEvent::ShowA => self.sink.show(*node, DisplaySlot::A)?,
                    SinkEvent::ShowB => self.sink.show(*node, DisplaySlot::B)?,
                }
            }
        }
        Ok(())
    }

    pub fn add_node(&mut self, node: Node) -> PatchResult<Vec<Diagnostic>> {
        self.graph.add_node(node, &self.registry)
    }

    pub fn add_connection(&mut self, conn: Connection) -> PatchResult<Vec<Diagnostic>> {
        self.graph.add_connection(conn, &self.registry)
    }

    /// Remove a node with its connections; its state and feedback buffers go on the next tick.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        self.graph.remove_node(id)
    }

    pub fn remove_connection(&mut self, index: usize) -> Option<Connection> {
        self.graph.remove_connection(index)
    }

    pub fn set_control(&mut self, id: NodeId, name: &str, value: Value) -> PatchResult<()> {
        self.graph.set_control(id, name, value, &self.registry)
    }

    pub fn set_option(&mut self, id: NodeId, name: &str, choice: &str) -> PatchResult<()> {
        self.graph.set_option(id, name, choice, &self.registry)
    }

    /// Write node-owned runtime state (an animation's `isRunning`) back into `values`.
    pub fn persist_values(&mut self) {
        for (id, state) in self.evaluator.states() {
            if let Some(values) = self.graph.values_mut(id) {
                state.persist(values);
            }
        }
    }

    /// Persist runtime state and give the graph back, e.g. for serialization.
    pub fn into_graph(mut self) -> Graph {
        self.persist_values();
        self.graph
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/runtime.rs"]
mod tests;
