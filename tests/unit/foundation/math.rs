use super::*;

#[test]
fn luma_weights_sum_to_one() {
    let sum: f32 = LUMA_WEIGHTS.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert!((luminance(Rgba::WHITE) - 1.0).abs() < 1e-6);
    assert_eq!(luminance(Rgba::BLACK), 0.0);
}

#[test]
fn lerp_u8_hits_endpoints() {
    assert_eq!(lerp_u8(10, 200, 0), 10);
    assert_eq!(lerp_u8(10, 200, 255), 200);
    assert_eq!(lerp_u8(0, 255, 128), 128);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 128), 64);
}

#[test]
fn unit_to_weight_rejects_nan() {
    assert_eq!(unit_to_weight(f32::NAN), 0);
    assert_eq!(unit_to_weight(2.0), 255);
    assert_eq!(unit_to_weight(-1.0), 0);
}

#[test]
fn smoothstep_is_symmetric() {
    assert_eq!(smoothstep(0.0), 0.0);
    assert_eq!(smoothstep(1.0), 1.0);
    assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
}
