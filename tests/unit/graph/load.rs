use super::*;
use crate::foundation::core::NodeId;
use crate::foundation::diagnostic::DiagnosticKind;
use crate::graph::serialize_patch;

fn reg() -> NodeRegistry {
    NodeRegistry::standard()
}

const BASIC: &str = r##"{
  "version": "0.2",
  "editorWidth": 1200,
  "meta": { "name": "basic", "author": "a", "thumbnail": "data:image/png;base64,AAAA" },
  "nodes": [
    { "id": 1, "slug": "checkerboard", "x": 10, "y": 20,
      "controls": { "colorA": "#ff0000", "size": 4 } },
    { "id": 2, "slug": "output", "x": 300, "y": 20, "controls": {} }
  ],
  "connections": [
    { "fromNode": 1, "fromPort": "texture", "toNode": 2, "toPort": "input" }
  ]
}"##;

#[test]
fn loads_typed_controls_and_defaults_options() {
    let loaded = load_patch(BASIC, &reg()).unwrap();
    let g = &loaded.graph;
    assert_eq!(g.len(), 2);
    assert_eq!(g.connections().len(), 1);
    let cb = g.node(NodeId(1)).unwrap();
    assert_eq!(cb.controls["size"], Value::Scalar(4.0));
    assert!(matches!(cb.controls["colorA"], Value::Color(_)));
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
}

#[test]
fn missing_version_is_treated_as_legacy_and_options_are_upgraded() {
    let json = r#"{
      "nodes": [
        { "id": 1, "slug": "blend", "controls": { "mode": "screen", "mix": 0.25 } }
      ],
      "connections": []
    }"#;
    let loaded = load_patch(json, &reg()).unwrap();
    let n = loaded.graph.node(NodeId(1)).unwrap();
    assert_eq!(n.options["mode"], "screen");
    assert!(!n.controls.contains_key("mode"));
    assert!(!n.is_malformed());
    assert!(
        loaded
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Upgrade)
    );
}

#[test]
fn current_version_does_not_upgrade_options() {
    let json = r#"{
      "version": "0.2",
      "nodes": [ { "id": 1, "slug": "blend", "controls": { "mode": "screen" } } ]
    }"#;
    let loaded = load_patch(json, &reg()).unwrap();
    assert!(loaded.graph.node(NodeId(1)).unwrap().is_malformed());
}

#[test]
fn numeric_version_is_accepted() {
    let json = r#"{ "version": 0.1, "nodes": [] }"#;
    assert!(load_patch(json, &reg()).is_ok());
}

#[test]
fn unknown_version_is_rejected() {
    let json = r#"{ "version": "3.0", "nodes": [] }"#;
    let err = load_patch(json, &reg()).unwrap_err();
    assert_eq!(err.unsupported_version.as_deref(), Some("3.0"));
}

#[test]
fn duplicate_ids_abort_the_load() {
    let json = r#"{ "nodes": [ { "id": 4, "slug": "color" }, { "id": 4, "slug": "invert" } ] }"#;
    let err = load_patch(json, &reg()).unwrap_err();
    assert!(err.to_string().contains("duplicate node id #4"));
}

#[test]
fn garbage_is_a_load_failure_not_a_panic() {
    assert!(load_patch("{ not json", &reg()).is_err());
    assert!(load_patch(r#"{ "nodes": 3 }"#, &reg()).is_err());
}

#[test]
fn bad_connections_are_dropped_with_indices() {
    let json = r#"{
      "version": "0.2",
      "nodes": [
        { "id": 1, "slug": "checkerboard" },
        { "id": 2, "slug": "output" }
      ],
      "connections": [
        { "fromNode": 1, "fromPort": "texture", "toNode": 99, "toPort": "input" },
        { "fromNode": 1, "fromPort": "texture", "toNode": 2, "toPort": "input" },
        { "fromNode": 1, "fromPort": "texture", "toNode": 2, "toPort": "snap" }
      ]
    }"#;
    let loaded = load_patch(json, &reg()).unwrap();
    assert_eq!(loaded.graph.connections().len(), 1);
    let structural: Vec<_> = loaded
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Structural)
        .map(|d| d.connection)
        .collect();
    assert_eq!(structural, vec![Some(0), Some(2)]);
}

#[test]
fn unknown_kind_degrades() {
    let json = r#"{
      "version": "0.2",
      "nodes": [
        { "id": 1, "slug": "doesNotExist", "controls": { "amount": 3, "tag": "x", "blob": null } },
        { "id": 2, "slug": "output" }
      ],
      "connections": [
        { "fromNode": 1, "fromPort": "out", "toNode": 2, "toPort": "input" }
      ]
    }"#;
    let loaded = load_patch(json, &reg()).unwrap();
    let n = loaded.graph.node(NodeId(1)).unwrap();
    assert!(!n.is_known());
    assert_eq!(loaded.graph.connections().len(), 1);
    assert!(
        loaded
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnknownKind && d.node == Some(NodeId(1)))
    );
}

#[test]
fn bad_option_value_falls_back_to_default() {
    let json = r#"{
      "version": "0.2",
      "nodes": [ { "id": 1, "slug": "animation", "optionValues": { "tween": "bounce", "loop_mode": "forever" } } ]
    }"#;
    let loaded = load_patch(json, &reg()).unwrap();
    let n = loaded.graph.node(NodeId(1)).unwrap();
    assert_eq!(n.options["tween"], "linear");
    assert_eq!(n.options["loop_mode"], "once");
    assert_eq!(loaded.diagnostics.iter().filter(|d| d.node == Some(NodeId(1))).count(), 2);
}

#[test]
fn control_ranges_accept_both_shapes() {
    let json = r#"{
      "version": "0.2",
      "nodes": [ { "id": 1, "slug": "invert",
        "controlRanges": { "amount": { "min": 0.2, "max": 0.4 } } },
                 { "id": 2, "slug": "mosaic",
        "controlRanges": { "cells": [2, 8], "input": [0, 1] } } ]
    }"#;
    let loaded = load_patch(json, &reg()).unwrap();
    let inv = loaded.graph.node(NodeId(1)).unwrap();
    assert_eq!(inv.control_ranges["amount"], ControlRange::new(0.2, 0.4));
    let mosaic = loaded.graph.node(NodeId(2)).unwrap();
    assert_eq!(mosaic.control_ranges.len(), 1);
}

#[test]
fn serialize_round_trips_nodes_edges_and_controls() {
    let reg = reg();
    let first = load_patch(BASIC, &reg).unwrap().graph;
    let json = serialize_patch(&first).unwrap();
    let second = load_patch(&json, &reg).unwrap().graph;

    assert_eq!(first.connections(), second.connections());
    let a: Vec<_> = first.nodes().map(|n| (n.id, &n.kind, &n.controls, &n.options)).collect();
    let b: Vec<_> = second.nodes().map(|n| (n.id, &n.kind, &n.controls, &n.options)).collect();
    assert_eq!(a, b);
    assert!(json.contains("\"version\": \"0.2\""));
    assert!(json.contains("\"editorWidth\": 1200"));
    assert!(json.contains("thumbnail"));
}
