use super::*;
use crate::foundation::diagnostic::DiagnosticKind;
use crate::sink::{InMemorySink, SinkRecord};
use serde_json::Value as Json;

const PATCH: &str = r#"{
    "version": "0.2",
    "nodes": [
        {"id": 1, "slug": "checkerboard", "controls": {"size": 2}},
        {"id": 2, "slug": "number", "controls": {"value": 1}},
        {"id": 3, "slug": "output", "controls": {}},
        {"id": 4, "slug": "animation", "controls": {},
         "values": {"startValue": 0, "endValue": 1, "duration": 1, "isRunning": false}}
    ],
    "connections": [
        {"fromNode": 1, "fromPort": "texture", "toNode": 3, "toPort": "input"},
        {"fromNode": 2, "fromPort": "value", "toNode": 3, "toPort": "snap"},
        {"fromNode": 4, "fromPort": "value", "toNode": 3, "toPort": "showA"}
    ]
}"#;

fn opts() -> RuntimeOpts {
    RuntimeOpts {
        canvas: Canvas::new(4, 4),
        ..RuntimeOpts::default()
    }
}

#[test]
fn tick_presents_and_forwards_events() {
    let mut rt = Runtime::from_json(PATCH, opts())
        .unwrap()
        .with_sink(InMemorySink::new());
    assert!(rt.load_diagnostics().is_empty());

    let a = rt.tick(0.25).unwrap();
    let b = rt.tick(0.25).unwrap();
    assert_eq!(a.frame, FrameIndex(0));
    assert_eq!(b.frame, FrameIndex(1));
    assert_eq!(a.image.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(a.image.pixel(2, 0), [0, 0, 0, 255]);

    let sink = rt.sink();
    assert_eq!(sink.frames.len(), 2);
    assert_eq!(sink.frames[0].1, NodeId(3));
    // The snap input is held high: one snapshot on the rising edge only.
    assert_eq!(sink.records, vec![SinkRecord::Snapshot(FrameIndex(0), NodeId(3))]);
    assert_eq!(sink.snapshots[0].2, a.image);
}

#[test]
fn negative_dt_is_rejected() {
    let mut rt = Runtime::from_json(PATCH, opts()).unwrap();
    assert!(matches!(rt.tick(-1.0), Err(PatchError::Evaluation(_))));
    assert!(rt.tick(f32::NAN).is_err());
}

#[test]
fn unsupported_version_fails_activation() {
    let json = PATCH.replace("\"0.2\"", "\"7.0\"");
    let err = Runtime::from_json(&json, opts()).err().unwrap();
    assert!(matches!(err, PatchError::UnsupportedVersion(v) if v == "7.0"));
}

#[test]
fn edits_apply_between_ticks() {
    let mut rt = Runtime::from_json(PATCH, opts()).unwrap();
    rt.tick(0.1).unwrap();

    rt.add_node(Node::new(NodeId(5), "invert")).unwrap();
    rt.add_connection(Connection::new(NodeId(1), "texture", NodeId(5), "input"))
        .unwrap();
    rt.add_connection(Connection::new(NodeId(5), "output", NodeId(3), "input"))
        .unwrap();
    let r = rt.tick(0.1).unwrap();
    assert_eq!(r.image.pixel(0, 0), [0, 0, 0, 255]);
    assert!(rt.schedule().unwrap().order.contains(&NodeId(5)));

    rt.set_control(NodeId(5), "amount", Value::Scalar(0.0)).unwrap();
    let r = rt.tick(0.1).unwrap();
    assert_eq!(r.image.pixel(0, 0), [255, 255, 255, 255]);

    assert!(rt.remove_node(NodeId(5)).is_some());
    assert!(rt.evaluator().state(NodeId(5)).is_some());
    rt.tick(0.1).unwrap();
    assert!(rt.evaluator().state(NodeId(5)).is_none());
}

#[test]
fn bad_option_edit_is_rejected() {
    let mut rt = Runtime::from_json(PATCH, opts()).unwrap();
    assert!(rt.set_option(NodeId(4), "loop_mode", "bounce").is_err());
    rt.set_option(NodeId(4), "loop_mode", "pingpong").unwrap();
    assert_eq!(
        rt.graph().node(NodeId(4)).unwrap().options["loop_mode"],
        "pingpong"
    );
}

#[test]
fn rebuilt_schedule_reports_its_diagnostics_once() {
    let mut rt = Runtime::from_json(PATCH, opts()).unwrap();
    rt.tick(0.1).unwrap();

    rt.add_node(Node::new(NodeId(6), "invert")).unwrap();
    rt.add_node(Node::new(NodeId(7), "invert")).unwrap();
    rt.add_connection(Connection::new(NodeId(6), "output", NodeId(7), "input"))
        .unwrap();
    rt.add_connection(Connection::new(NodeId(7), "output", NodeId(6), "input"))
        .unwrap();
    rt.add_connection(Connection::new(NodeId(7), "output", NodeId(3), "input"))
        .unwrap();

    let first = rt.tick(0.1).unwrap();
    assert!(
        first
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Structural)
    );
    let second = rt.tick(0.1).unwrap();
    assert!(second.diagnostics.is_empty());
}

#[test]
fn persist_values_writes_running_state() {
    let mut rt = Runtime::from_json(PATCH, opts()).unwrap();
    rt.tick(0.1).unwrap();
    rt.persist_values();
    let values = &rt.graph().node(NodeId(4)).unwrap().values;
    assert_eq!(values.get("isRunning"), Some(&Json::Bool(false)));
}

#[test]
fn silent_diagnostics_when_not_recorded() {
    let json = PATCH.replace(
        r#""slug": "number", "controls": {"value": 1}"#,
        r#""slug": "math", "controls": {"a": 1}, "optionValues": {"operation": "divide"}"#,
    );
    let json = json.replace(
        r#""fromNode": 2, "fromPort": "value""#,
        r#""fromNode": 2, "fromPort": "result""#,
    );

    let mut loud = Runtime::from_json(&json, opts()).unwrap();
    assert_eq!(loud.tick(0.1).unwrap().diagnostics.len(), 1);

    let quiet_opts = RuntimeOpts {
        record_diagnostics: false,
        ..opts()
    };
    let mut quiet = Runtime::from_json(&json, quiet_opts).unwrap();
    assert!(quiet.tick(0.1).unwrap().diagnostics.is_empty());
}
