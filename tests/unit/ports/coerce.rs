use super::*;

fn canvas() -> Canvas {
    Canvas::new(2, 2)
}

#[test]
fn compatibility_table() {
    use PortType::*;
    assert_eq!(compatibility(Scalar, Scalar), Compatibility::Exact);
    assert_eq!(compatibility(Scalar, Color), Compatibility::Lossy);
    assert_eq!(compatibility(Color, Scalar), Compatibility::Lossy);
    assert_eq!(compatibility(Scalar, Texture), Compatibility::Adapter);
    assert_eq!(compatibility(Color, Texture), Compatibility::Adapter);
    assert_eq!(compatibility(Texture, Scalar), Compatibility::Incompatible);
    assert_eq!(compatibility(Texture, Color), Compatibility::Incompatible);
    assert_eq!(compatibility(Enum, Texture), Compatibility::Incompatible);
    assert_eq!(compatibility(Enum, Scalar), Compatibility::Lossy);
}

#[test]
fn color_to_scalar_uses_fixed_luma() {
    let v = coerce(&Value::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)), PortType::Scalar, canvas());
    assert_eq!(v, Value::Scalar(0.2126));
}

#[test]
fn scalar_to_color_broadcasts_gray() {
    let v = coerce(&Value::Scalar(0.25), PortType::Color, canvas());
    assert_eq!(v, Value::Color(Rgba::new(0.25, 0.25, 0.25, 1.0)));
}

#[test]
fn scalar_into_texture_fills_constant() {
    let v = coerce(&Value::Scalar(1.0), PortType::Texture, canvas());
    let t = v.as_texture().unwrap();
    assert_eq!(t.width(), 2);
    assert_eq!(t.pixel(1, 1), [255, 255, 255, 255]);
}

#[test]
fn texture_into_scalar_is_neutral() {
    let t = Value::Texture(Texture::solid(canvas(), Rgba::WHITE));
    assert_eq!(coerce(&t, PortType::Scalar, canvas()), Value::Scalar(0.0));
}

#[test]
fn texture_is_refit_to_canvas() {
    let t = Value::Texture(Texture::black(Canvas::new(8, 8)));
    let out = coerce(&t, PortType::Texture, canvas());
    assert_eq!(out.as_texture().unwrap().width(), 2);
}

#[test]
fn coercion_is_deterministic() {
    let c = Value::Color(Rgba::new(0.3, 0.6, 0.9, 1.0));
    let a = coerce(&c, PortType::Scalar, canvas());
    let b = coerce(&c, PortType::Scalar, canvas());
    assert_eq!(a.as_scalar().unwrap().to_bits(), b.as_scalar().unwrap().to_bits());
}

#[test]
fn enum_parses_numbers_and_falls_back() {
    assert_eq!(
        coerce(&Value::Enum("2.5".into()), PortType::Scalar, canvas()),
        Value::Scalar(2.5)
    );
    assert_eq!(
        coerce(&Value::Enum("add".into()), PortType::Scalar, canvas()),
        Value::Scalar(0.0)
    );
    assert_eq!(
        coerce(&Value::Scalar(2.6), PortType::Enum, canvas()),
        Value::Enum("3".into())
    );
}

#[test]
fn literals_parse_per_declared_type() {
    use serde_json::json;
    assert_eq!(
        Value::from_literal(&json!(0.5), PortType::Scalar),
        Some(Value::Scalar(0.5))
    );
    assert_eq!(
        Value::from_literal(&json!(true), PortType::Scalar),
        Some(Value::Scalar(1.0))
    );
    assert_eq!(
        Value::from_literal(&json!("#ffffff"), PortType::Color),
        Some(Value::Color(Rgba::WHITE))
    );
    assert_eq!(
        Value::from_literal(&json!([255, 0, 0]), PortType::Color),
        Some(Value::Color(Rgba::new(1.0, 0.0, 0.0, 1.0)))
    );
    assert_eq!(
        Value::from_literal(&json!({"r": 0.0, "g": 1.0, "b": 0.0}), PortType::Color),
        Some(Value::Color(Rgba::new(0.0, 1.0, 0.0, 1.0)))
    );
    assert_eq!(Value::from_literal(&json!("abc"), PortType::Scalar), None);
    assert_eq!(Value::from_literal(&json!(1.0), PortType::Texture), None);
}

#[test]
fn literal_round_trip_for_scalar_keeps_f32_bits() {
    let v = Value::Scalar(0.7);
    let lit = v.to_literal().unwrap();
    assert_eq!(Value::from_literal(&lit, PortType::Scalar), Some(v));
}
