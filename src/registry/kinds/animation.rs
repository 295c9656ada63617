use crate::animation::{AnimationSpec, Animator, Ease, LoopMode};
use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalError, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor, OptionSpec};
use crate::registry::state::{AnimationState, EdgeTrigger, NodeInit, NodeState};
use serde_json::Value as Json;

pub const KIND: &str = "animation";

fn is_curve(name: &str) -> bool {
    name.is_empty() || Ease::from_name(name).is_some()
}

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new(KIND, eval)
            .with_input(InputSpec::scalar("startStop", 0.0).range(0.0, 1.0))
            .with_input(InputSpec::scalar("restart", 0.0).range(0.0, 1.0))
            .with_input(InputSpec::scalar("startValue", 0.0))
            .with_input(InputSpec::scalar("endValue", 1.0))
            .with_input(InputSpec::scalar("duration", 1.0))
            .with_option(OptionSpec::new("loop_mode", LoopMode::NAMES, "once"))
            .with_option(OptionSpec::open("tween", "linear", is_curve))
            .with_option(OptionSpec::open("approach_curve", "", is_curve))
            .with_option(OptionSpec::open("return_curve", "", is_curve))
            .with_state(init)
            .with_output("value", PortType::Scalar),
    );
}

fn init(node: &NodeInit<'_>) -> NodeState {
    let spec = AnimationSpec::from_node(node.values, node.options);
    let running = matches!(node.values.get("isRunning"), Some(Json::Bool(true)));
    NodeState::Animation(AnimationState {
        animator: Animator::new(spec, running),
        stored: spec,
        start_stop: EdgeTrigger::default(),
        restart: EdgeTrigger::default(),
    })
}

/// Wired or control value of `name`; `None` when the port falls back to its default.
fn supplied(ctx: &EvalCtx<'_>, name: &str) -> Option<f32> {
    ctx.is_supplied(name).then(|| ctx.scalar(name))
}

fn eval(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let (start_stop, restart, dt) = (ctx.scalar("startStop"), ctx.scalar("restart"), ctx.dt);
    let range = ["startValue", "endValue", "duration"].map(|name| supplied(&*ctx, name));
    let NodeState::Animation(st) = &mut *ctx.state else {
        return Err(EvalError::failed("animation node without animation state"));
    };
    let [start, end, duration] = range;
    st.animator.set_range(
        start.unwrap_or(st.stored.start),
        end.unwrap_or(st.stored.end),
        duration.unwrap_or(st.stored.duration),
    );
    if st.restart.rising(restart) {
        st.animator.restart();
    }
    if st.start_stop.rising(start_stop) {
        st.animator.toggle();
    }
    let v = st.animator.step(dt);
    ctx.set_scalar("value", v);
    Ok(())
}
