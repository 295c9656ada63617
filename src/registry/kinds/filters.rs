use crate::foundation::core::{Rgba, Texture};
use crate::foundation::math::{lerp_u8, mul_div255_u8, unit_to_weight};
use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor};
use std::f32::consts::TAU;

use super::map_pixels;

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new("mosaic", eval_mosaic)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::scalar("cells", 16.0).range(1.0, 512.0))
            .with_output("output", PortType::Texture),
    );

    reg.register(
        NodeDescriptor::new("kaleidoscope", eval_kaleidoscope)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::scalar("segments", 6.0).range(1.0, 32.0))
            .with_input(InputSpec::scalar("rotation", 0.0).range(0.0, 1.0))
            .with_output("output", PortType::Texture),
    );

    reg.register(
        NodeDescriptor::new("invert", eval_invert)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::scalar("amount", 1.0).range(0.0, 1.0))
            .with_output("output", PortType::Texture),
    );

    reg.register(
        NodeDescriptor::new("tint", eval_tint)
            .with_input(InputSpec::texture("input"))
            .with_input(InputSpec::color("color", Rgba::new(1.0, 0.5, 0.0, 1.0)))
            .with_input(InputSpec::scalar("amount", 0.5).range(0.0, 1.0))
            .with_output("output", PortType::Texture),
    );
}

fn eval_mosaic(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let src = ctx.texture("input");
    let cells = ctx.scalar("cells").max(1.0);
    let cw = (src.width() as f32 / cells).ceil().max(1.0) as u32;
    let ch = (src.height() as f32 / cells).ceil().max(1.0) as u32;
    let out = Texture::from_fn(src.canvas(), |x, y| {
        src.pixel((x / cw) * cw + cw / 2, (y / ch) * ch + ch / 2)
    });
    ctx.set_texture("output", out);
    Ok(())
}

/// Mirror every wedge of `TAU / segments` onto the first one around the canvas center.
fn eval_kaleidoscope(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let src = ctx.texture("input");
    let segments = ctx.scalar("segments").round().max(1.0);
    let rotation = ctx.scalar("rotation") * TAU;
    let wedge = TAU / segments;
    let (w, h) = (src.width() as f32, src.height() as f32);
    let (cx, cy) = (w * 0.5, h * 0.5);

    let out = Texture::from_fn(src.canvas(), |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let r = (dx * dx + dy * dy).sqrt();
        let mut a = (dy.atan2(dx) - rotation).rem_euclid(wedge);
        if a > wedge * 0.5 {
            a = wedge - a;
        }
        let (s, c) = (a + rotation).sin_cos();
        let sx = (cx + r * c).clamp(0.0, w - 1.0);
        let sy = (cy + r * s).clamp(0.0, h - 1.0);
        src.pixel(sx as u32, sy as u32)
    });
    ctx.set_texture("output", out);
    Ok(())
}

fn eval_invert(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let src = ctx.texture("input");
    let w = unit_to_weight(ctx.scalar("amount"));
    let out = map_pixels(&src, |[r, g, b, a]| {
        [
            lerp_u8(r, 255 - r, w),
            lerp_u8(g, 255 - g, w),
            lerp_u8(b, 255 - b, w),
            a,
        ]
    });
    ctx.set_texture("output", out);
    Ok(())
}

fn eval_tint(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let src = ctx.texture("input");
    let [tr, tg, tb, _] = ctx.color("color").to_u8();
    let w = unit_to_weight(ctx.scalar("amount"));
    let out = map_pixels(&src, |[r, g, b, a]| {
        [
            lerp_u8(r, mul_div255_u8(r, tr), w),
            lerp_u8(g, mul_div255_u8(g, tg), w),
            lerp_u8(b, mul_div255_u8(b, tb), w),
            a,
        ]
    });
    ctx.set_texture("output", out);
    Ok(())
}
