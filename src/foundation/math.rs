use crate::foundation::core::Rgba;

/// Rec. 709 luma weights used for every color→scalar conversion.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

pub fn luminance(c: Rgba) -> f32 {
    c.r * LUMA_WEIGHTS[0] + c.g * LUMA_WEIGHTS[1] + c.b * LUMA_WEIGHTS[2]
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    Rgba::new(
        lerp(a.r, b.r, t),
        lerp(a.g, b.g, t),
        lerp(a.b, b.b, t),
        lerp(a.a, b.a, t),
    )
}

/// Interpolate two bytes with a `[0, 255]` weight, rounding to nearest.
pub fn lerp_u8(a: u8, b: u8, w: u16) -> u8 {
    let w = u32::from(w.min(255));
    ((u32::from(a) * (255 - w) + u32::from(b) * w + 127) / 255) as u8
}

pub fn mul_div255_u8(x: u8, y: u8) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

/// Map a unit float to the `[0, 255]` weight used by the byte helpers.
pub fn unit_to_weight(t: f32) -> u16 {
    if !t.is_finite() {
        return 0;
    }
    (t.clamp(0.0, 1.0) * 255.0).round() as u16
}

pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
