use crate::audio::BandEnergies;
use crate::foundation::core::{Canvas, FrameIndex, NodeId, Rgba, Texture};
use crate::ports::{PortType, Value};
use crate::registry::state::NodeState;
use crate::sink::SinkEvent;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Per-port values keyed by port name, in declaration order.
pub type PortValues<'a> = SmallVec<[(&'a str, Value); 6]>;

pub type EvalResult<T> = Result<T, EvalError>;

/// Failure of a single node for a single frame.
///
/// The evaluator turns this into a `RuntimeEval` diagnostic and substitutes neutral outputs; the
/// rest of the frame continues.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivideByZero,
    #[error("output '{port}' is not finite")]
    NonFinite { port: String },
    #[error("unknown option value '{value}' for '{option}'")]
    BadOption { option: String, value: String },
    #[error("{0}")]
    Failed(String),
}

impl EvalError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Side effects an output node requests for this frame.
#[derive(Debug, Default)]
pub struct SinkRequests {
    pub presented: Option<Texture>,
    pub events: Vec<SinkEvent>,
}

/// Everything a node's eval function may read or write for one frame.
pub struct EvalCtx<'a> {
    pub node: NodeId,
    pub frame: FrameIndex,
    /// Seconds since the previous tick.
    pub dt: f32,
    pub canvas: Canvas,
    pub state: &'a mut NodeState,
    pub(crate) inputs: &'a [(&'a str, Value)],
    /// Inputs fed by a wire or an explicit control, as opposed to the declared default.
    pub(crate) supplied: &'a [&'a str],
    pub(crate) options: &'a BTreeMap<String, String>,
    pub(crate) audio: Option<&'a BandEnergies>,
    pub(crate) outputs: &'a mut PortValues<'static>,
    pub(crate) sink: &'a mut SinkRequests,
}

impl<'a> EvalCtx<'a> {
    /// Resolved input by name; `None` if the node declares no such port.
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// True when `name` is wired or set as a control rather than falling back to its default.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains(&name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inputs.iter().map(|(n, v)| (*n, v))
    }

    pub fn scalar(&self, name: &str) -> f32 {
        self.input(name).and_then(Value::as_scalar).unwrap_or(0.0)
    }

    pub fn color(&self, name: &str) -> Rgba {
        self.input(name)
            .and_then(Value::as_color)
            .unwrap_or(Rgba::TRANSPARENT)
    }

    /// Input texture fitted to the canvas; black when absent.
    pub fn texture(&self, name: &str) -> Texture {
        match self.input(name).and_then(Value::as_texture) {
            Some(t) => t.fit(self.canvas),
            None => Texture::black(self.canvas),
        }
    }

    /// Option choice, already validated at load. Missing options read as `""`.
    pub fn option(&self, name: &str) -> &str {
        self.options.get(name).map(String::as_str).unwrap_or("")
    }

    /// Raw band energies sampled from the audio source this tick; `None` when no stream is
    /// available.
    pub fn raw_audio(&self) -> Option<&BandEnergies> {
        self.audio
    }

    pub fn set_output(&mut self, name: &'static str, value: Value) {
        if let Some(slot) = self.outputs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.outputs.push((name, value));
        }
    }

    pub fn set_scalar(&mut self, name: &'static str, v: f32) {
        self.set_output(name, Value::Scalar(v));
    }

    pub fn set_color(&mut self, name: &'static str, c: Rgba) {
        self.set_output(name, Value::Color(c));
    }

    pub fn set_texture(&mut self, name: &'static str, t: Texture) {
        self.set_output(name, Value::Texture(t));
    }

    /// Hand a frame to the output sink.
    pub fn present(&mut self, texture: Texture) {
        self.sink.presented = Some(texture);
    }

    pub fn emit(&mut self, event: SinkEvent) {
        self.sink.events.push(event);
    }

    pub fn neutral(&self, ty: PortType) -> Value {
        Value::neutral(ty, self.canvas)
    }
}
