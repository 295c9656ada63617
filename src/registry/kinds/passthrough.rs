use crate::ports::{PortType, Value};
use crate::registry::context::{EvalCtx, EvalResult};

pub const KIND: &str = "passthrough";

/// Output port name a passthrough node answers for every requested port.
pub const WILDCARD: &str = "*";

/// Forward the first texture input (inputs are ordered by port name), else the first input of
/// any type, else a black frame.
pub fn eval(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let forwarded = ctx
        .inputs()
        .find(|(_, v)| v.port_type() == PortType::Texture)
        .or_else(|| ctx.inputs().next())
        .map(|(_, v)| v.clone());
    let out = match forwarded {
        Some(Value::Texture(t)) => Value::Texture(t.fit(ctx.canvas)),
        Some(v) => v,
        None => ctx.neutral(PortType::Texture),
    };
    ctx.set_output(WILDCARD, out);
    Ok(())
}
