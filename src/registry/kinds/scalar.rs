use crate::ports::PortType;
use crate::registry::NodeRegistry;
use crate::registry::context::{EvalCtx, EvalError, EvalResult};
use crate::registry::descriptor::{InputSpec, NodeDescriptor, OptionSpec};

const OPERATIONS: &[&str] = &["add", "subtract", "multiply", "divide", "min", "max"];

pub(super) fn register(reg: &mut NodeRegistry) {
    reg.register(
        NodeDescriptor::new("number", eval_number)
            .with_input(InputSpec::scalar("value", 0.0))
            .with_output("value", PortType::Scalar),
    );

    reg.register(
        NodeDescriptor::new("math", eval_math)
            .with_input(InputSpec::scalar("a", 0.0))
            .with_input(InputSpec::scalar("b", 0.0))
            .with_option(OptionSpec::new("operation", OPERATIONS, "add"))
            .with_output("result", PortType::Scalar),
    );
}

fn eval_number(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let v = ctx.scalar("value");
    ctx.set_scalar("value", v);
    Ok(())
}

fn eval_math(ctx: &mut EvalCtx<'_>) -> EvalResult<()> {
    let (a, b) = (ctx.scalar("a"), ctx.scalar("b"));
    let out = match ctx.option("operation") {
        "add" | "" => a + b,
        "subtract" => a - b,
        "multiply" => a * b,
        "divide" => {
            if b == 0.0 {
                return Err(EvalError::DivideByZero);
            }
            a / b
        }
        "min" => a.min(b),
        "max" => a.max(b),
        other => {
            return Err(EvalError::BadOption {
                option: "operation".to_owned(),
                value: other.to_owned(),
            });
        }
    };
    ctx.set_scalar("result", out);
    Ok(())
}
