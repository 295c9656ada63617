use crate::foundation::core::Texture;
use crate::foundation::math::{lerp_u8, unit_to_weight};
use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalError, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor};
use crate::registry::state::NodeState;

use super::zip_pixels;

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new("feedback", eval_feedback)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::scalar("decay", 0.9).range(0.0, 1.0))
            .with_input(InputSpec::scalar("offsetX", 0.0).range(-1.0, 1.0))
            .with_input(InputSpec::scalar("offsetY", 0.0).range(-1.0, 1.0))
            .with_output("output", PortType::Texture)
            .delay_capable(),
    );

    reg.register(
        NodeDescriptor::new("feedbackmix", eval_feedbackmix)
            .with_input(InputSpec::texture("current"))
            .with_input(InputSpec::texture("previous"))
            .with_input(InputSpec::scalar("mix", 0.5).range(0.0, 1.0))
            .with_output("output", PortType::Texture)
            .delay_capable(),
    );

    reg.register(
        NodeDescriptor::new("geissflow", eval_geissflow)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::scalar("decay", 0.95).range(0.0, 1.0))
            .with_input(InputSpec::scalar("flow", 0.02).range(-0.5, 0.5))
            .with_state(|_| NodeState::Frame(None))
            .with_output("output", PortType::Texture)
            .delay_capable(),
    );
}

/// Scroll the input by a fractional offset and fade it toward black.
fn eval_feedback(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let src = ctx.texture("input");
    let w = unit_to_weight(ctx.scalar("decay"));
    let (ox, oy) = (ctx.scalar("offsetX"), ctx.scalar("offsetY"));
    let (fw, fh) = (src.width() as f32, src.height() as f32);
    let out = Texture::from_fn(src.canvas(), |x, y| {
        let [r, g, b, a] = src.sample_wrapped(
            (x as f32 + 0.5) / fw - ox,
            (y as f32 + 0.5) / fh - oy,
        );
        [lerp_u8(0, r, w), lerp_u8(0, g, w), lerp_u8(0, b, w), a]
    });
    ctx.set_texture("output", out);
    Ok(())
}

fn eval_feedbackmix(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let cur = ctx.texture("current");
    let prev = ctx.texture("previous");
    let w = unit_to_weight(ctx.scalar("mix"));
    let out = zip_pixels(&cur, &prev, |c, p| {
        [
            lerp_u8(c[0], p[0], w),
            lerp_u8(c[1], p[1], w),
            lerp_u8(c[2], p[2], w),
            lerp_u8(c[3], p[3], w),
        ]
    });
    ctx.set_texture("output", out);
    Ok(())
}

/// Accumulating radial flow: the previous accumulation is zoomed by `flow`, faded by `decay`
/// and max-combined with the new input.
fn eval_geissflow(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let input = ctx.texture("input");
    let w = unit_to_weight(ctx.scalar("decay"));
    let zoom = 1.0 - ctx.scalar("flow");
    let canvas = ctx.canvas;
    let NodeState::Frame(acc) = &mut *ctx.state else {
        return Err(EvalError::failed("geissflow node without frame state"));
    };

    let prev = match acc.take() {
        Some(t) => t.fit(canvas),
        None => Texture::black(canvas),
    };
    let (fw, fh) = (canvas.width as f32, canvas.height as f32);
    let flowed = Texture::from_fn(canvas, |x, y| {
        let u = ((x as f32 + 0.5) / fw - 0.5) * zoom + 0.5;
        let v = ((y as f32 + 0.5) / fh - 0.5) * zoom + 0.5;
        let [r, g, b, a] = prev.sample_wrapped(u, v);
        [lerp_u8(0, r, w), lerp_u8(0, g, w), lerp_u8(0, b, w), a]
    });
    let out = zip_pixels(&flowed, &input, |f, i| {
        [f[0].max(i[0]), f[1].max(i[1]), f[2].max(i[2]), f[3].max(i[3])]
    });
    *acc = Some(out.clone());
    ctx.set_texture("output", out);
    Ok(())
}

