use crate::foundation::core::{Canvas, Rgba, Texture};
use crate::foundation::math::luminance;
use crate::ports::value::{PortType, Value};

/// How a connection between two port types is realised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compatibility {
    /// Same type, value passes unchanged.
    Exact,
    /// Deterministic but information-losing conversion (luminance, broadcast, parse).
    Lossy,
    /// Scalar/color into a texture port: an implicit constant-fill adapter is inserted.
    Adapter,
    /// No conversion exists; the connection is rejected at load.
    Incompatible,
}

pub fn compatibility(from: PortType, to: PortType) -> Compatibility {
    use PortType::*;
    match (from, to) {
        (a, b) if a == b => Compatibility::Exact,
        (Scalar, Texture) | (Color, Texture) => Compatibility::Adapter,
        (Texture, _) | (_, Texture) => Compatibility::Incompatible,
        _ => Compatibility::Lossy,
    }
}

/// Convert `value` to `to`.
///
/// Total: a pair [`compatibility`] calls incompatible yields the neutral value of `to`, so a
/// passthrough node feeding a scalar port still produces something defined.
pub fn coerce(value: &Value, to: PortType, canvas: Canvas) -> Value {
    match (value, to) {
        (Value::Texture(t), PortType::Texture) => Value::Texture(t.fit(canvas)),
        (v, ty) if v.port_type() == ty => v.clone(),

        (Value::Scalar(v), PortType::Color) => Value::Color(Rgba::gray(v.clamp(0.0, 1.0))),
        (Value::Color(c), PortType::Scalar) => Value::Scalar(luminance(*c)),

        (Value::Scalar(v), PortType::Texture) => {
            Value::Texture(Texture::solid(canvas, Rgba::gray(v.clamp(0.0, 1.0))))
        }
        (Value::Color(c), PortType::Texture) => Value::Texture(Texture::solid(canvas, *c)),

        (Value::Enum(s), PortType::Scalar) => Value::Scalar(
            s.trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
        ),
        (Value::Enum(s), PortType::Color) => {
            Value::Color(Rgba::from_hex(s).unwrap_or(Rgba::TRANSPARENT))
        }
        (Value::Scalar(v), PortType::Enum) => Value::Enum(format!("{}", v.round() as i64)),
        (Value::Color(c), PortType::Enum) => Value::Enum(c.to_hex()),

        (_, ty) => Value::neutral(ty, canvas),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ports/coerce.rs"]
mod tests;
