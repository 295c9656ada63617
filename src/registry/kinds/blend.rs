use crate::foundation::math::{lerp_u8, mul_div255_u8, unit_to_weight};
use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalError, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor, OptionSpec};

use super::zip_pixels;

const MODES: &[&str] = &["normal", "add", "multiply", "screen", "difference"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Add,
    Multiply,
    Screen,
    Difference,
}

impl BlendMode {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "normal" | "" => Self::Normal,
            "add" => Self::Add,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "difference" => Self::Difference,
            _ => return None,
        })
    }

    pub fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            Self::Normal => b,
            Self::Add => a.saturating_add(b),
            Self::Multiply => mul_div255_u8(a, b),
            Self::Screen => 255 - mul_div255_u8(255 - a, 255 - b),
            Self::Difference => a.abs_diff(b),
        }
    }
}

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new("blend", eval)
            .with_input(InputSpec::texture("a"))
            .with_input(InputSpec::texture("b"))
            .with_input(InputSpec::scalar("mix", 0.5).range(0.0, 1.0))
            .with_option(OptionSpec::new("mode", MODES, "normal"))
            .with_output("output", PortType::Texture),
    );
}

fn eval(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let mode = ctx.option("mode");
    let mode = BlendMode::parse(mode).ok_or_else(|| EvalError::BadOption {
        option: "mode".to_owned(),
        value: mode.to_owned(),
    })?;
    let a = ctx.texture("a");
    let b = ctx.texture("b");
    let w = unit_to_weight(ctx.scalar("mix"));
    let out = zip_pixels(&a, &b, |pa, pb| {
        [
            lerp_u8(pa[0], mode.apply(pa[0], pb[0]), w),
            lerp_u8(pa[1], mode.apply(pa[1], pb[1]), w),
            lerp_u8(pa[2], mode.apply(pa[2], pb[2]), w),
            pa[3].max(pb[3]),
        ]
    });
    ctx.set_texture("output", out);
    Ok(())
}
