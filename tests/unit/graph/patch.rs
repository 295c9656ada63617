use super::*;
use crate::foundation::core::Rgba;
use crate::foundation::diagnostic::DiagnosticKind;

fn reg() -> NodeRegistry {
    NodeRegistry::standard()
}

fn graph_with(nodes: &[(u64, &str)]) -> Graph {
    let reg = reg();
    let mut g = Graph::new();
    for &(id, kind) in nodes {
        g.add_node(Node::new(NodeId(id), kind), &reg).unwrap();
    }
    g
}

#[test]
fn duplicate_node_is_rejected() {
    let reg = reg();
    let mut g = graph_with(&[(1, "color")]);
    let err = g.add_node(Node::new(NodeId(1), "invert"), &reg).unwrap_err();
    assert!(err.to_string().contains("duplicate node id #1"));
}

#[test]
fn last_registered_connection_wins() {
    let reg = reg();
    let mut g = graph_with(&[(1, "checkerboard"), (2, "gradient"), (3, "invert")]);
    g.add_connection(Connection::new(NodeId(1), "texture", NodeId(3), "input"), &reg)
        .unwrap();
    let warnings = g
        .add_connection(Connection::new(NodeId(2), "texture", NodeId(3), "input"), &reg)
        .unwrap();

    assert_eq!(g.effective_input(NodeId(3), "input"), Some(1));
    assert_eq!(g.effective_connections(), vec![1]);
    assert!(warnings.iter().any(|d| d.kind == DiagnosticKind::Structural));
}

#[test]
fn dangling_and_undeclared_ports_are_rejected() {
    let reg = reg();
    let mut g = graph_with(&[(1, "color"), (2, "invert")]);
    assert!(
        g.add_connection(Connection::new(NodeId(9), "texture", NodeId(2), "input"), &reg)
            .is_err()
    );
    assert!(
        g.add_connection(Connection::new(NodeId(1), "nope", NodeId(2), "input"), &reg)
            .is_err()
    );
    assert!(
        g.add_connection(Connection::new(NodeId(1), "texture", NodeId(2), "nope"), &reg)
            .is_err()
    );
    assert!(g.connections().is_empty());
}

#[test]
fn texture_cannot_feed_scalar_but_scalar_fills_texture() {
    let reg = reg();
    let mut g = graph_with(&[(1, "checkerboard"), (2, "number"), (3, "invert")]);
    assert!(
        g.add_connection(Connection::new(NodeId(1), "texture", NodeId(3), "amount"), &reg)
            .is_err()
    );
    let warnings = g
        .add_connection(Connection::new(NodeId(2), "value", NodeId(3), "input"), &reg)
        .unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, DiagnosticKind::TypeCoercion);
}

#[test]
fn self_loop_needs_delay_capable_kind() {
    let reg = reg();
    let mut g = graph_with(&[(1, "invert"), (2, "feedback")]);
    assert!(
        g.add_connection(Connection::new(NodeId(1), "output", NodeId(1), "input"), &reg)
            .is_err()
    );
    assert!(
        g.add_connection(Connection::new(NodeId(2), "output", NodeId(2), "input"), &reg)
            .is_ok()
    );
}

#[test]
fn unknown_kind_accepts_any_port() {
    let reg = reg();
    let mut g = graph_with(&[(1, "retiredEffect"), (2, "output")]);
    assert!(!g.node(NodeId(1)).unwrap().is_known());
    g.add_connection(Connection::new(NodeId(1), "whatever", NodeId(2), "input"), &reg)
        .unwrap();
    assert_eq!(g.connections().len(), 1);
}

#[test]
fn remove_node_drops_its_connections() {
    let reg = reg();
    let mut g = graph_with(&[(1, "checkerboard"), (2, "invert"), (3, "output")]);
    g.add_connection(Connection::new(NodeId(1), "texture", NodeId(2), "input"), &reg)
        .unwrap();
    g.add_connection(Connection::new(NodeId(2), "output", NodeId(3), "input"), &reg)
        .unwrap();
    let rev = g.revision();

    assert!(g.remove_node(NodeId(2)).is_some());
    assert!(g.connections().is_empty());
    assert_eq!(g.in_edges(NodeId(3)).count(), 0);
    assert!(g.revision() > rev);
    assert!(g.remove_node(NodeId(2)).is_none());
}

#[test]
fn set_control_coerces_and_validates() {
    let reg = reg();
    let mut g = graph_with(&[(1, "invert")]);
    g.set_control(NodeId(1), "amount", Value::Enum("0.75".into()), &reg)
        .unwrap();
    assert_eq!(
        g.node(NodeId(1)).unwrap().controls["amount"],
        Value::Scalar(0.75)
    );
    g.set_control(NodeId(1), "amount", Value::Color(Rgba::BLACK), &reg)
        .unwrap();
    assert_eq!(
        g.node(NodeId(1)).unwrap().controls["amount"],
        Value::Scalar(0.0)
    );
    assert!(g.set_control(NodeId(1), "bogus", Value::Scalar(1.0), &reg).is_err());
    assert!(g.set_control(NodeId(1), "input", Value::Scalar(1.0), &reg).is_err());
    assert!(g.set_control(NodeId(7), "amount", Value::Scalar(1.0), &reg).is_err());
}

#[test]
fn set_option_checks_choices_and_bumps_epoch() {
    let reg = reg();
    let mut g = graph_with(&[(1, "blend")]);
    assert_eq!(g.node(NodeId(1)).unwrap().options["mode"], "normal");
    g.set_option(NodeId(1), "mode", "screen", &reg).unwrap();
    assert_eq!(g.node(NodeId(1)).unwrap().options["mode"], "screen");
    assert_eq!(g.node(NodeId(1)).unwrap().epoch, 1);
    assert!(g.set_option(NodeId(1), "mode", "overlay", &reg).is_err());
    assert!(g.set_option(NodeId(1), "shape", "linear", &reg).is_err());
}

#[test]
fn undeclared_control_marks_node_malformed() {
    let reg = reg();
    let mut g = Graph::new();
    let diags = g
        .add_node(
            Node::new(NodeId(1), "invert").with_control("wobble", Value::Scalar(1.0)),
            &reg,
        )
        .unwrap();
    assert!(g.node(NodeId(1)).unwrap().is_malformed());
    assert_eq!(diags[0].kind, DiagnosticKind::Structural);
}

#[test]
fn control_range_clamps_and_ignores_inverted() {
    assert_eq!(ControlRange::new(0.0, 2.0).clamp(5.0), 2.0);
    assert_eq!(ControlRange::new(2.0, 0.0).clamp(5.0), 5.0);
}
