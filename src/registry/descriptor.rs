use crate::foundation::core::{Canvas, Rgba};
use crate::ports::{PortType, Value};
use crate::registry::context::{EvalCtx, EvalResult};
use crate::registry::state::{NodeInit, NodeState};

/// Evaluation entry point of a node kind.
///
/// Must be a pure function of the resolved inputs, the node's options and its own
/// [`NodeState`]; it never sees other nodes.
pub type EvalFn = fn(&mut EvalCtx<'_>) -> EvalResult<()>;

/// Builds the node-local state when a node is first scheduled.
pub type InitFn = fn(&NodeInit<'_>) -> NodeState;

/// Static default of an input port.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PortDefault {
    Scalar(f32),
    Color(Rgba),
    Enum(&'static str),
    /// Use the type's neutral value.
    Neutral,
}

impl PortDefault {
    pub fn to_value(self, ty: PortType, canvas: Canvas) -> Value {
        match self {
            Self::Scalar(v) => crate::ports::coerce(&Value::Scalar(v), ty, canvas),
            Self::Color(c) => crate::ports::coerce(&Value::Color(c), ty, canvas),
            Self::Enum(s) => crate::ports::coerce(&Value::Enum(s.to_owned()), ty, canvas),
            Self::Neutral => Value::neutral(ty, canvas),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InputSpec {
    pub name: &'static str,
    pub ty: PortType,
    pub default: PortDefault,
    /// Declared `[min, max]` for scalar controls.
    pub range: Option<(f32, f32)>,
}

impl InputSpec {
    pub fn scalar(name: &'static str, default: f32) -> Self {
        Self {
            name,
            ty: PortType::Scalar,
            default: PortDefault::Scalar(default),
            range: None,
        }
    }

    pub fn color(name: &'static str, default: Rgba) -> Self {
        Self {
            name,
            ty: PortType::Color,
            default: PortDefault::Color(default),
            range: None,
        }
    }

    pub fn texture(name: &'static str) -> Self {
        Self {
            name,
            ty: PortType::Texture,
            default: PortDefault::Neutral,
            range: None,
        }
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.range = Some((min, max));
        self
    }
}

#[derive(Clone, Debug)]
pub struct OutputSpec {
    pub name: &'static str,
    pub ty: PortType,
}

impl OutputSpec {
    pub fn new(name: &'static str, ty: PortType) -> Self {
        Self { name, ty }
    }
}

/// A fixed enum choice read once at load; options are not wire-able.
#[derive(Clone, Debug)]
pub struct OptionSpec {
    pub name: &'static str,
    pub choices: &'static [&'static str],
    pub default: &'static str,
    check: Option<fn(&str) -> bool>,
}

impl OptionSpec {
    pub fn new(
        name: &'static str,
        choices: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            name,
            choices,
            default,
            check: None,
        }
    }

    /// An option whose choices are too many to list (curve names); `check` decides validity.
    pub fn open(name: &'static str, default: &'static str, check: fn(&str) -> bool) -> Self {
        Self {
            name,
            choices: &[],
            default,
            check: Some(check),
        }
    }

    pub fn accepts(&self, choice: &str) -> bool {
        match self.check {
            Some(check) => check(choice),
            None => self.choices.contains(&choice),
        }
    }
}

/// Everything the runtime knows about one node kind.
#[derive(Clone)]
pub struct NodeDescriptor {
    pub kind: &'static str,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    pub options: Vec<OptionSpec>,
    /// Holds an internal frame buffer, so a cycle may be broken on an edge into it.
    pub delay_capable: bool,
    /// Terminal node; scheduling walks backward from these.
    pub sink: bool,
    pub init: InitFn,
    pub eval: EvalFn,
}

impl std::fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("kind", &self.kind)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("delay_capable", &self.delay_capable)
            .finish()
    }
}

impl NodeDescriptor {
    pub fn new(kind: &'static str, eval: EvalFn) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            options: Vec::new(),
            delay_capable: false,
            sink: false,
            init: |_| NodeState::Stateless,
            eval,
        }
    }

    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, name: &'static str, ty: PortType) -> Self {
        self.outputs.push(OutputSpec::new(name, ty));
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_state(mut self, init: InitFn) -> Self {
        self.init = init;
        self
    }

    pub fn delay_capable(mut self) -> Self {
        self.delay_capable = true;
        self
    }

    pub fn sink(mut self) -> Self {
        self.sink = true;
        self
    }

    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The descriptor for kinds the registry does not know.
    pub fn passthrough() -> Self {
        Self::new(
            crate::registry::kinds::passthrough::KIND,
            crate::registry::kinds::passthrough::eval,
        )
    }

    pub fn is_passthrough(&self) -> bool {
        self.kind == crate::registry::kinds::passthrough::KIND
    }
}
