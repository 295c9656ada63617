//! Load-time and edit-time checks shared by the loader and the graph edit API.

use crate::foundation::core::Canvas;
use crate::foundation::diagnostic::{Diagnostic, Severity};
use crate::graph::patch::{Connection, Graph, Node};
use crate::ports::{Compatibility, PortType, Value, coerce, compatibility};
use crate::registry::NodeRegistry;

/// Resolve `node.kind`, type-check its controls, options and ranges in place.
///
/// Never fails: unknown kinds become passthrough, undeclared controls mark the node malformed,
/// bad options fall back to their defaults.
pub(crate) fn check_node(node: &mut Node, registry: &NodeRegistry) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let Some(desc) = registry.get(&node.kind) else {
        node.known = false;
        node.malformed = false;
        diags.push(Diagnostic::unknown_kind(node.id, &node.kind));
        return diags;
    };
    node.known = true;
    node.malformed = false;

    let names: Vec<String> = node.controls.keys().cloned().collect();
    for name in names {
        let Some(spec) = desc.input(&name) else {
            node.malformed = true;
            diags.push(
                Diagnostic::structural(format!(
                    "control '{name}' is not a port of kind '{}'; node evaluates to neutral outputs",
                    node.kind
                ))
                .at_node(node.id),
            );
            continue;
        };
        let Some(value) = node.controls.get(&name) else {
            continue;
        };
        if spec.ty == PortType::Texture {
            node.controls.remove(&name);
            diags.push(
                Diagnostic::structural(format!("texture port '{name}' cannot hold a control"))
                    .with_severity(Severity::Warning)
                    .at_node(node.id),
            );
            continue;
        }
        match compatibility(value.port_type(), spec.ty) {
            Compatibility::Exact => {}
            Compatibility::Incompatible | Compatibility::Adapter => {
                node.controls.remove(&name);
                diags.push(
                    Diagnostic::coercion(format!(
                        "control '{name}' is not a {}; using the default",
                        spec.ty
                    ))
                    .at_node(node.id),
                );
            }
            Compatibility::Lossy => {
                let coerced = coerce(value, spec.ty, Canvas::default());
                diags.push(
                    Diagnostic::coercion(format!(
                        "control '{name}' converted from {} to {}",
                        value.port_type(),
                        spec.ty
                    ))
                    .at_node(node.id),
                );
                node.controls.insert(name, coerced);
            }
        }
    }

    for name in node.raw_controls.keys() {
        node.malformed = true;
        diags.push(
            Diagnostic::structural(format!(
                "control '{name}' is not a port of kind '{}'; node evaluates to neutral outputs",
                node.kind
            ))
            .at_node(node.id),
        );
    }

    node.options.retain(|name, _| {
        let keep = desc.option(name).is_some();
        if !keep {
            diags.push(
                Diagnostic::structural(format!("unknown option '{name}' ignored"))
                    .with_severity(Severity::Warning)
                    .at_node(node.id),
            );
        }
        keep
    });
    for spec in &desc.options {
        match node.options.get(spec.name) {
            Some(choice) if spec.accepts(choice) => {}
            Some(choice) => {
                diags.push(
                    Diagnostic::structural(format!(
                        "option '{}' has unknown value '{choice}'; using '{}'",
                        spec.name, spec.default
                    ))
                    .with_severity(Severity::Warning)
                    .at_node(node.id),
                );
                node.options
                    .insert(spec.name.to_owned(), spec.default.to_owned());
            }
            None => {
                node.options
                    .insert(spec.name.to_owned(), spec.default.to_owned());
            }
        }
    }

    node.control_ranges.retain(|name, _| {
        let ok = desc
            .input(name)
            .is_some_and(|p| p.ty == PortType::Scalar);
        if !ok {
            diags.push(
                Diagnostic::structural(format!(
                    "control range for '{name}' ignored: not a scalar port"
                ))
                .with_severity(Severity::Warning)
                .at_node(node.id),
            );
        }
        ok
    });

    diags
}

/// Validate one connection against the nodes already in `graph`.
///
/// `Err` means the connection must be dropped; `Ok` carries coercion warnings.
pub(crate) fn check_connection(
    graph: &Graph,
    conn: &Connection,
    registry: &NodeRegistry,
) -> Result<Vec<Diagnostic>, Diagnostic> {
    let from = graph.node(conn.from).ok_or_else(|| {
        Diagnostic::structural(format!("dangling fromNode {}", conn.from))
    })?;
    let to = graph
        .node(conn.to)
        .ok_or_else(|| Diagnostic::structural(format!("dangling toNode {}", conn.to)))?;

    if conn.from == conn.to && !registry.describe(&to.kind).delay_capable {
        return Err(Diagnostic::structural(format!(
            "self-loop on '{}' which cannot delay its input",
            to.kind
        ))
        .at_node(to.id));
    }

    let out_ty = if from.known {
        let spec = registry
            .describe(&from.kind)
            .output(&conn.from_port)
            .ok_or_else(|| {
                Diagnostic::structural(format!(
                    "kind '{}' has no output '{}'",
                    from.kind, conn.from_port
                ))
                .at_node(from.id)
            })?;
        Some(spec.ty)
    } else {
        None
    };
    let in_ty = if to.known {
        let spec = registry
            .describe(&to.kind)
            .input(&conn.to_port)
            .ok_or_else(|| {
                Diagnostic::structural(format!(
                    "kind '{}' has no input '{}'",
                    to.kind, conn.to_port
                ))
                .at_node(to.id)
            })?;
        Some(spec.ty)
    } else {
        None
    };

    let (Some(out_ty), Some(in_ty)) = (out_ty, in_ty) else {
        return Ok(Vec::new());
    };
    match compatibility(out_ty, in_ty) {
        Compatibility::Exact => Ok(Vec::new()),
        Compatibility::Lossy => Ok(vec![
            Diagnostic::coercion(format!("lossy {out_ty} to {in_ty} conversion"))
                .at_node(to.id),
        ]),
        Compatibility::Adapter => Ok(vec![
            Diagnostic::coercion(format!(
                "{out_ty} wired into texture port '{}'; filled with a constant color",
                conn.to_port
            ))
            .at_node(to.id),
        ]),
        Compatibility::Incompatible => Err(Diagnostic::structural(format!(
            "{out_ty} output cannot feed {in_ty} input '{}'",
            conn.to_port
        ))
        .at_node(to.id)),
    }
}

/// Type a control edit for `node`, or explain why it is refused.
pub(crate) fn typed_control(
    node: &Node,
    name: &str,
    value: Value,
    registry: &NodeRegistry,
) -> Result<Value, Diagnostic> {
    if !node.known {
        return Ok(value);
    }
    let spec = registry.describe(&node.kind).input(name).ok_or_else(|| {
        Diagnostic::structural(format!(
            "kind '{}' has no control '{name}'",
            node.kind
        ))
        .at_node(node.id)
    })?;
    match (spec.ty, compatibility(value.port_type(), spec.ty)) {
        (PortType::Texture, _) | (_, Compatibility::Incompatible | Compatibility::Adapter) => {
            Err(Diagnostic::structural(format!(
                "control '{name}' cannot hold a {}",
                value.port_type()
            ))
            .at_node(node.id))
        }
        _ => Ok(coerce(&value, spec.ty, Canvas::default())),
    }
}
