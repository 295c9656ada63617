use crate::audio::{AudioBridge, Band, BridgeSettings};
use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalError, EvalResult};
use crate::registry::descriptor::NodeDescriptor;
use crate::registry::state::{NodeInit, NodeState};

/// Live device input. Device selection (`selectedDeviceId`) is host configuration.
pub const MICROPHONE: &str = "microphone";
/// File-backed input; the file itself is opened by the host.
pub const AUDIO_FILE: &str = "audiofile";

pub(super) fn register(reg: &mut NodeRegistry) {
    for kind in [MICROPHONE, AUDIO_FILE] {
        let mut desc = NodeDescriptor::new(kind, eval).with_state(init);
        for band in Band::ALL {
            desc = desc.with_output(band.name(), PortType::Scalar);
        }
        for band in Band::ALL {
            desc = desc.with_output(band.event_port(), PortType::Scalar);
        }
        reg.register(desc);
    }
}

fn init(node: &NodeInit<'_>) -> NodeState {
    NodeState::Audio(AudioBridge::new(BridgeSettings::from_values(
        node.values,
        node.audio,
    )))
}

fn eval(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let (raw, dt) = (ctx.raw_audio().copied(), ctx.dt);
    let NodeState::Audio(bridge) = &mut *ctx.state else {
        return Err(EvalError::failed("audio node without audio state"));
    };
    let frame = bridge.process(raw.as_ref(), dt);
    for band in Band::ALL {
        ctx.set_scalar(band.name(), frame.levels.get(band));
        let pulse = if frame.events[band.index()] { 1.0 } else { 0.0 };
        ctx.set_scalar(band.event_port(), pulse);
    }
    Ok(())
}
