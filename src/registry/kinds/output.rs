use crate::registry::context::{EvalCtx, EvalError, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor};
use crate::registry::state::{NodeState, OutputState};
use crate::registry::NodeRegistry;
use crate::sink::SinkEvent;

pub const KIND: &str = "output";

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new(KIND, eval)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::scalar("snap", 0.0).range(0.0, 1.0))
            .with_input(InputSpec::scalar("rec", 0.0).range(0.0, 1.0))
            .with_input(InputSpec::scalar("showA", 0.0).range(0.0, 1.0))
            .with_input(InputSpec::scalar("showB", 0.0).range(0.0, 1.0))
            .with_state(|_| NodeState::Output(OutputState::default()))
            .sink(),
    );
}

fn eval(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let (snap, rec, show_a, show_b) = (
        ctx.scalar("snap"),
        ctx.scalar("rec"),
        ctx.scalar("showA"),
        ctx.scalar("showB"),
    );
    let NodeState::Output(st) = &mut *ctx.state else {
        return Err(EvalError::failed("output node without output state"));
    };

    let mut events = Vec::new();
    if st.snap.rising(snap) {
        events.push(SinkEvent::Snapshot);
    }
    if st.rec.rising(rec) {
        st.recording = !st.recording;
        events.push(if st.recording {
            SinkEvent::StartRecording
        } else {
            SinkEvent::StopRecording
        });
    }
    if st.show_a.rising(show_a) {
        events.push(SinkEvent::ShowA);
    }
    if st.show_b.rising(show_b) {
        events.push(SinkEvent::ShowB);
    }

    let frame = ctx.texture("input");
    ctx.present(frame);
    for ev in events {
        ctx.emit(ev);
    }
    Ok(())
}
