use crate::foundation::core::{Rgba, Texture};
use crate::foundation::math::{lerp_rgba, smoothstep};
use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor, OptionSpec};

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new("color", eval_color)
            .with_input(InputSpec::color("color", Rgba::WHITE))
            .with_output("color", PortType::Color)
            .with_output("texture", PortType::Texture),
    );

    reg.register(
        NodeDescriptor::new("checkerboard", eval_checkerboard)
            .with_input(InputSpec::color("colorA", Rgba::WHITE))
            .with_input(InputSpec::color("colorB", Rgba::BLACK))
            .with_input(InputSpec::scalar("size", 8.0).range(1.0, 256.0))
            .with_output("texture", PortType::Texture),
    );

    reg.register(
        NodeDescriptor::new("gradient", eval_gradient)
            .with_input(InputSpec::color("colorA", Rgba::BLACK))
            .with_input(InputSpec::color("colorB", Rgba::WHITE))
            .with_input(InputSpec::scalar("angle", 0.0).range(0.0, 360.0))
            .with_option(OptionSpec::new("shape", &["linear", "radial"], "linear"))
            .with_output("texture", PortType::Texture),
    );
}

fn eval_color(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let c = ctx.color("color");
    let fill = Texture::solid(ctx.canvas, c);
    ctx.set_color("color", c);
    ctx.set_texture("texture", fill);
    Ok(())
}

fn eval_checkerboard(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let a = ctx.color("colorA").to_u8();
    let b = ctx.color("colorB").to_u8();
    let cell = ctx.scalar("size").max(1.0);
    let tex = Texture::from_fn(ctx.canvas, |x, y| {
        let cx = (x as f32 / cell).floor() as i64;
        let cy = (y as f32 / cell).floor() as i64;
        if (cx + cy).rem_euclid(2) == 0 { a } else { b }
    });
    ctx.set_texture("texture", tex);
    Ok(())
}

fn eval_gradient(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let a = ctx.color("colorA");
    let b = ctx.color("colorB");
    let radial = ctx.option("shape") == "radial";
    let (sin, cos) = ctx.scalar("angle").to_radians().sin_cos();
    let canvas = ctx.canvas;
    let (w, h) = (canvas.width as f32, canvas.height as f32);

    let tex = Texture::from_fn(canvas, |x, y| {
        let u = (x as f32 + 0.5) / w - 0.5;
        let v = (y as f32 + 0.5) / h - 0.5;
        let t = if radial {
            smoothstep((u * u + v * v).sqrt() * 2.0)
        } else {
            (u * cos + v * sin + 0.5).clamp(0.0, 1.0)
        };
        lerp_rgba(a, b, t).to_u8()
    });
    ctx.set_texture("texture", tex);
    Ok(())
}
