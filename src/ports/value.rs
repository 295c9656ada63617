use crate::foundation::core::{Canvas, Rgba, Texture};
use serde_json::Value as Json;
use std::fmt;

/// Value domain of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortType {
    Scalar,
    Color,
    Texture,
    Enum,
}

impl PortType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Color => "color",
            Self::Texture => "texture",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value flowing through a port or stored as a static control.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f32),
    Color(Rgba),
    Texture(Texture),
    Enum(String),
}

impl Value {
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Scalar(_) => PortType::Scalar,
            Self::Color(_) => PortType::Color,
            Self::Texture(_) => PortType::Texture,
            Self::Enum(_) => PortType::Enum,
        }
    }

    /// Type-appropriate neutral value: 0, transparent, a black frame, or the empty choice.
    pub fn neutral(ty: PortType, canvas: Canvas) -> Self {
        match ty {
            PortType::Scalar => Self::Scalar(0.0),
            PortType::Color => Self::Color(Rgba::TRANSPARENT),
            PortType::Texture => Self::Texture(Texture::black(canvas)),
            PortType::Enum => Self::Enum(String::new()),
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            Self::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a JSON control literal as a value of type `ty`.
    ///
    /// Returns `None` when the literal has no sensible reading for that type. Texture controls
    /// never parse: textures only arrive over connections.
    pub fn from_literal(lit: &Json, ty: PortType) -> Option<Self> {
        match ty {
            PortType::Scalar => literal_scalar(lit).map(Self::Scalar),
            PortType::Color => literal_color(lit).map(Self::Color),
            PortType::Enum => match lit {
                Json::String(s) => Some(Self::Enum(s.clone())),
                Json::Number(n) => Some(Self::Enum(n.to_string())),
                Json::Bool(b) => Some(Self::Enum(b.to_string())),
                _ => None,
            },
            PortType::Texture => None,
        }
    }

    /// Best-effort typing for controls whose port type is unknown (unregistered kinds).
    pub fn infer_from_literal(lit: &Json) -> Option<Self> {
        match lit {
            Json::Number(_) | Json::Bool(_) => literal_scalar(lit).map(Self::Scalar),
            Json::String(s) if s.starts_with('#') => {
                Rgba::from_hex(s).map(Self::Color).or(Some(Self::Enum(s.clone())))
            }
            Json::String(s) => Some(Self::Enum(s.clone())),
            Json::Array(_) | Json::Object(_) => literal_color(lit).map(Self::Color),
            Json::Null => None,
        }
    }

    /// Canonical JSON literal for persistence. Textures have none.
    ///
    /// Byte-exact colors are written as hex, anything finer as an `{r, g, b, a}` object so a
    /// reload yields the same value.
    pub fn to_literal(&self) -> Option<Json> {
        match self {
            Self::Scalar(v) => serde_json::Number::from_f64(f64::from(*v)).map(Json::Number),
            Self::Color(c) if Rgba::from_u8(c.to_u8()) == *c => Some(Json::String(c.to_hex())),
            Self::Color(c) => {
                let num = |v: f32| serde_json::Number::from_f64(f64::from(v)).map(Json::Number);
                let mut m = serde_json::Map::new();
                m.insert("r".into(), num(c.r)?);
                m.insert("g".into(), num(c.g)?);
                m.insert("b".into(), num(c.b)?);
                m.insert("a".into(), num(c.a)?);
                Some(Json::Object(m))
            }
            Self::Enum(s) => Some(Json::String(s.clone())),
            Self::Texture(_) => None,
        }
    }
}

fn literal_scalar(lit: &Json) -> Option<f32> {
    match lit {
        Json::Number(n) => n.as_f64().map(|v| v as f32).filter(|v| v.is_finite()),
        Json::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Json::String(s) => s.trim().parse::<f32>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn literal_color(lit: &Json) -> Option<Rgba> {
    match lit {
        Json::String(s) => Rgba::from_hex(s),
        Json::Number(_) => literal_scalar(lit).map(Rgba::gray),
        Json::Array(items) => {
            let comps: Vec<f32> = items.iter().filter_map(literal_scalar).collect();
            if comps.len() != items.len() || !(3..=4).contains(&comps.len()) {
                return None;
            }
            // Byte-valued arrays are recognised by any component above 1.
            let scale = if comps.iter().any(|c| *c > 1.0) {
                255.0
            } else {
                1.0
            };
            let a = comps.get(3).copied().unwrap_or(scale);
            Some(Rgba::new(
                comps[0] / scale,
                comps[1] / scale,
                comps[2] / scale,
                a / scale,
            ))
        }
        Json::Object(map) => {
            let get = |k: &str| map.get(k).and_then(literal_scalar);
            Some(Rgba::new(
                get("r")?,
                get("g")?,
                get("b")?,
                get("a").unwrap_or(1.0),
            ))
        }
        _ => None,
    }
}
