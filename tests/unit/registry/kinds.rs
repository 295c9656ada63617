use super::*;
use crate::audio::AudioOpts;
use crate::foundation::core::{Canvas, FrameIndex, NodeId, Rgba};
use crate::ports::Value;
use crate::registry::{EvalCtx, EvalError, EvalResult, NodeInit, NodeState, PortValues, SinkRequests};
use crate::sink::SinkEvent;
use serde_json::{Map, json};
use std::collections::BTreeMap;

const CANVAS: Canvas = Canvas {
    width: 4,
    height: 4,
};

struct Run {
    outputs: PortValues<'static>,
    sink: SinkRequests,
    result: EvalResult<()>,
}

impl Run {
    fn value(&self, port: &str) -> &Value {
        &self.outputs.iter().find(|(n, _)| *n == port).unwrap().1
    }

    fn scalar(&self, port: &str) -> f32 {
        self.value(port).as_scalar().unwrap()
    }

    fn texture(&self, port: &str) -> &Texture {
        self.value(port).as_texture().unwrap()
    }
}

fn options(kind: &str, overrides: &[(&str, &str)]) -> BTreeMap<String, String> {
    let reg = NodeRegistry::standard();
    let desc = reg.get(kind).unwrap();
    desc.options
        .iter()
        .map(|o| (o.name.to_owned(), o.default.to_owned()))
        .chain(overrides.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())))
        .collect()
}

fn init(kind: &str, values: Map<String, serde_json::Value>, opts: &[(&str, &str)]) -> NodeState {
    let reg = NodeRegistry::standard();
    let desc = reg.get(kind).unwrap();
    (desc.init)(&NodeInit {
        node: NodeId(1),
        controls: &BTreeMap::new(),
        options: &options(kind, opts),
        values: &values,
        audio: &AudioOpts::default(),
    })
}

fn run_with(
    kind: &str,
    inputs: &[(&str, Value)],
    opts: &[(&str, &str)],
    state: &mut NodeState,
) -> Run {
    let reg = NodeRegistry::standard();
    let desc = reg.get(kind).unwrap();
    let options = options(kind, opts);
    let resolved: Vec<(&str, Value)> = desc
        .inputs
        .iter()
        .map(|spec| {
            let v = inputs
                .iter()
                .find(|(n, _)| *n == spec.name)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| spec.default.to_value(spec.ty, CANVAS));
            (spec.name, v)
        })
        .collect();
    let supplied: Vec<&str> = inputs.iter().map(|(n, _)| *n).collect();
    let mut outputs = PortValues::new();
    let mut sink = SinkRequests::default();
    let result = {
        let mut ctx = EvalCtx {
            node: NodeId(1),
            frame: FrameIndex(0),
            dt: 0.25,
            canvas: CANVAS,
            state,
            inputs: &resolved,
            supplied: &supplied,
            options: &options,
            audio: None,
            outputs: &mut outputs,
            sink: &mut sink,
        };
        (desc.eval)(&mut ctx)
    };
    Run {
        outputs,
        sink,
        result,
    }
}

fn run(kind: &str, inputs: &[(&str, Value)], opts: &[(&str, &str)]) -> Run {
    let mut state = init(kind, Map::new(), opts);
    run_with(kind, inputs, opts, &mut state)
}

fn solid(px: [u8; 4]) -> Value {
    Value::Texture(Texture::solid(CANVAS, Rgba::from_u8(px)))
}

#[test]
fn math_operations() {
    let ab = [("a", Value::Scalar(3.0)), ("b", Value::Scalar(4.0))];
    assert_eq!(run("math", &ab, &[]).scalar("result"), 7.0);
    assert_eq!(run("math", &ab, &[("operation", "multiply")]).scalar("result"), 12.0);
    assert_eq!(run("math", &ab, &[("operation", "min")]).scalar("result"), 3.0);
    assert_eq!(run("math", &ab, &[("operation", "divide")]).scalar("result"), 0.75);
}

#[test]
fn math_divide_by_zero_is_an_eval_error() {
    let r = run(
        "math",
        &[("a", Value::Scalar(1.0)), ("b", Value::Scalar(0.0))],
        &[("operation", "divide")],
    );
    assert_eq!(r.result, Err(EvalError::DivideByZero));
}

#[test]
fn math_rejects_unknown_operation_at_eval() {
    let r = run("math", &[], &[("operation", "pow")]);
    assert!(matches!(r.result, Err(EvalError::BadOption { .. })));
}

#[test]
fn checkerboard_alternates_cells() {
    let r = run("checkerboard", &[("size", Value::Scalar(2.0))], &[]);
    let tex = r.texture("texture");
    assert_eq!(tex.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(tex.pixel(2, 0), [0, 0, 0, 255]);
    assert_eq!(tex.pixel(2, 2), [255, 255, 255, 255]);
}

#[test]
fn color_fills_texture() {
    let c = Rgba::from_u8([10, 20, 30, 255]);
    let r = run("color", &[("color", Value::Color(c))], &[]);
    assert_eq!(r.value("color"), &Value::Color(c));
    assert_eq!(r.texture("texture").pixel(3, 3), [10, 20, 30, 255]);
}

#[test]
fn invert_full_amount() {
    let r = run("invert", &[("input", solid([10, 20, 30, 200]))], &[]);
    assert_eq!(r.texture("output").pixel(1, 1), [245, 235, 225, 200]);
}

#[test]
fn blend_add_at_full_mix() {
    let r = run(
        "blend",
        &[
            ("a", solid([100, 100, 100, 255])),
            ("b", solid([50, 50, 50, 255])),
            ("mix", Value::Scalar(1.0)),
        ],
        &[("mode", "add")],
    );
    assert_eq!(r.texture("output").pixel(0, 0), [150, 150, 150, 255]);
}

#[test]
fn feedbackmix_zero_mix_keeps_current() {
    let r = run(
        "feedbackmix",
        &[
            ("current", solid([9, 8, 7, 255])),
            ("previous", solid([200, 200, 200, 255])),
            ("mix", Value::Scalar(0.0)),
        ],
        &[],
    );
    assert_eq!(r.texture("output").pixel(2, 1), [9, 8, 7, 255]);
}

#[test]
fn geissflow_keeps_its_accumulation_buffer() {
    let mut state = init("geissflow", Map::new(), &[]);
    let inputs = |px| {
        [
            ("input", solid(px)),
            ("decay", Value::Scalar(1.0)),
            ("flow", Value::Scalar(0.0)),
        ]
    };
    let first = run_with("geissflow", &inputs([255, 255, 255, 255]), &[], &mut state);
    assert_eq!(first.texture("output").pixel(0, 0), [255, 255, 255, 255]);

    let second = run_with("geissflow", &inputs([0, 0, 0, 255]), &[], &mut state);
    assert_eq!(second.texture("output").pixel(0, 0), [255, 255, 255, 255]);
    assert!(matches!(state, NodeState::Frame(Some(_))));
}

#[test]
fn output_presents_and_edge_triggers() {
    let mut state = init("output", Map::new(), &[]);
    let pulse = [
        ("input", solid([1, 2, 3, 255])),
        ("snap", Value::Scalar(1.0)),
        ("rec", Value::Scalar(1.0)),
    ];
    let first = run_with("output", &pulse, &[], &mut state);
    assert_eq!(first.sink.presented.as_ref().unwrap().pixel(0, 0), [1, 2, 3, 255]);
    assert_eq!(
        first.sink.events,
        vec![SinkEvent::Snapshot, SinkEvent::StartRecording]
    );

    // Held high: no new edges.
    let held = run_with("output", &pulse, &[], &mut state);
    assert!(held.sink.events.is_empty());

    let low = [("rec", Value::Scalar(0.0))];
    run_with("output", &low, &[], &mut state);
    let again = run_with("output", &[("rec", Value::Scalar(1.0))], &[], &mut state);
    assert_eq!(again.sink.events, vec![SinkEvent::StopRecording]);
}

#[test]
fn animation_runs_from_persisted_values() {
    let values = json!({"startValue": 0, "endValue": 1, "duration": 1, "isRunning": true});
    let serde_json::Value::Object(values) = values else {
        unreachable!()
    };
    let mut state = init("animation", values, &[]);
    let a = run_with("animation", &[], &[], &mut state);
    let b = run_with("animation", &[], &[], &mut state);
    assert_eq!(a.scalar("value"), 0.0);
    assert_eq!(b.scalar("value"), 0.25);
}

#[test]
fn animation_range_inputs_override_persisted_values() {
    let values = json!({"startValue": 10, "endValue": 20, "duration": 1, "isRunning": true});
    let serde_json::Value::Object(values) = values else {
        unreachable!()
    };
    let mut state = init("animation", values, &[]);
    let end = [("endValue", Value::Scalar(14.0))];
    let a = run_with("animation", &end, &[], &mut state);
    let b = run_with("animation", &end, &[], &mut state);
    assert_eq!(a.scalar("value"), 10.0);
    assert_eq!(b.scalar("value"), 11.0);

    // Unsupplied again: back to the persisted end value, phase kept.
    let c = run_with("animation", &[], &[], &mut state);
    assert_eq!(c.scalar("value"), 15.0);
}

#[test]
fn animation_start_stop_is_edge_triggered() {
    let mut state = init("animation", Map::new(), &[]);
    let on = [("startStop", Value::Scalar(1.0))];
    run_with("animation", &on, &[], &mut state);
    let NodeState::Animation(anim) = &state else {
        panic!("expected animation state");
    };
    assert!(anim.animator.is_running());

    // Still high on the next frame: stays running.
    run_with("animation", &on, &[], &mut state);
    let NodeState::Animation(anim) = &state else {
        panic!("expected animation state");
    };
    assert!(anim.animator.is_running());
}

#[test]
fn audio_without_stream_reports_silence() {
    let r = run("microphone", &[], &[]);
    assert!(r.result.is_ok());
    for band in crate::audio::Band::ALL {
        assert_eq!(r.scalar(band.name()), 0.0);
        assert_eq!(r.scalar(band.event_port()), 0.0);
    }
}

#[test]
fn passthrough_forwards_first_texture() {
    let mut state = NodeState::Stateless;
    let resolved = vec![("a", Value::Scalar(0.3)), ("b", solid([7, 7, 7, 255]))];
    let options = BTreeMap::new();
    let mut outputs = PortValues::new();
    let mut sink = SinkRequests::default();
    let mut ctx = EvalCtx {
        node: NodeId(1),
        frame: FrameIndex(0),
        dt: 0.0,
        canvas: CANVAS,
        state: &mut state,
        inputs: &resolved,
        supplied: &[],
        options: &options,
        audio: None,
        outputs: &mut outputs,
        sink: &mut sink,
    };
    passthrough::eval(&mut ctx).unwrap();
    let out = &outputs[0];
    assert_eq!(out.0, passthrough::WILDCARD);
    assert_eq!(out.1.as_texture().unwrap().pixel(0, 0), [7, 7, 7, 255]);
}

#[test]
fn map_pixels_visits_every_pixel() {
    let src = Texture::solid(CANVAS, Rgba::BLACK);
    let out = map_pixels(&src, |[_, _, _, a]| [1, 2, 3, a]);
    assert_eq!(out.pixel(3, 0), [1, 2, 3, 255]);
}
