use super::*;
use crate::ports::PortType;

#[test]
fn standard_registry_has_every_builtin_kind() {
    let reg = NodeRegistry::standard();
    let kinds: Vec<&str> = reg.kinds().collect();
    for kind in [
        "animation",
        "audiofile",
        "blend",
        "checkerboard",
        "color",
        "feedback",
        "feedbackmix",
        "geissflow",
        "gradient",
        "invert",
        "kaleidoscope",
        "math",
        "microphone",
        "mosaic",
        "number",
        "output",
        "tint",
    ] {
        assert!(kinds.contains(&kind), "missing kind {kind}");
    }
    let mut sorted = kinds.clone();
    sorted.sort_unstable();
    assert_eq!(kinds, sorted);
}

#[test]
fn only_feedback_kinds_are_delay_capable() {
    let reg = NodeRegistry::standard();
    let delay: Vec<&str> = reg
        .kinds()
        .filter(|k| reg.describe(k).delay_capable)
        .collect();
    assert_eq!(delay, vec!["feedback", "feedbackmix", "geissflow"]);
}

#[test]
fn output_is_the_only_sink() {
    let reg = NodeRegistry::standard();
    let sinks: Vec<&str> = reg.kinds().filter(|k| reg.describe(k).sink).collect();
    assert_eq!(sinks, vec!["output"]);
}

#[test]
fn unknown_kind_describes_as_passthrough() {
    let reg = NodeRegistry::standard();
    assert!(!reg.contains("doesNotExist"));
    assert!(reg.get("doesNotExist").is_none());
    let desc = reg.describe("doesNotExist");
    assert!(desc.is_passthrough());
    assert!(desc.inputs.is_empty());
    assert!(!desc.sink);
}

#[test]
fn empty_registry_knows_nothing() {
    let reg = NodeRegistry::empty();
    assert_eq!(reg.kinds().count(), 0);
    assert!(reg.describe("output").is_passthrough());
}

#[test]
fn register_replaces_existing_kind() {
    let mut reg = NodeRegistry::standard();
    let custom = NodeDescriptor::new("number", |_| Ok(())).with_output("value", PortType::Color);
    reg.register(custom);
    let desc = reg.describe("number");
    assert_eq!(desc.output("value").map(|o| o.ty), Some(PortType::Color));
}

#[test]
fn declared_ranges_and_options() {
    let reg = NodeRegistry::standard();
    let checker = reg.describe("checkerboard");
    assert_eq!(checker.input("size").and_then(|p| p.range), Some((1.0, 256.0)));

    let blend = reg.describe("blend");
    let mode = blend.option("mode").unwrap();
    assert_eq!(mode.default, "normal");
    assert!(mode.accepts("screen"));
    assert!(!mode.accepts("overlay"));

    let anim = reg.describe("animation");
    let tween = anim.option("tween").unwrap();
    assert!(tween.accepts("easeInOutSine"));
    assert!(!tween.accepts("wobble"));
}
