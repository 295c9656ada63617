use crate::foundation::core::NodeId;
use std::fmt;

/// Category of a non-fatal problem found while loading, scheduling or evaluating a patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Dangling reference, rejected connection or unresolved cycle.
    Structural,
    /// A node references a kind the registry does not know.
    UnknownKind,
    /// A connection needed a lossy conversion or an implicit adapter.
    TypeCoercion,
    /// A node failed to evaluate for one frame.
    RuntimeEval,
    /// An older patch field was migrated to the current layout.
    Upgrade,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::UnknownKind => "unknown-kind",
            Self::TypeCoercion => "type-coercion",
            Self::RuntimeEval => "runtime-eval",
            Self::Upgrade => "upgrade",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One reported problem, tied to a node and/or connection when possible.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub node: Option<NodeId>,
    /// Index into the patch's connection list, in registration order.
    pub connection: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            node: None,
            connection: None,
            message: message.into(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Structural, Severity::Error, message)
    }

    pub fn unknown_kind(node: NodeId, kind: &str) -> Self {
        Self::new(
            DiagnosticKind::UnknownKind,
            Severity::Warning,
            format!("unknown node kind '{kind}', evaluating as passthrough"),
        )
        .at_node(node)
    }

    pub fn coercion(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::TypeCoercion, Severity::Warning, message)
    }

    pub fn runtime(node: NodeId, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::RuntimeEval, Severity::Warning, message).at_node(node)
    }

    pub fn upgrade(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Upgrade, Severity::Info, message)
    }

    pub fn at_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn at_connection(mut self, index: usize) -> Self {
        self.connection = Some(index);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Emit this diagnostic through `tracing` at a level matching its severity.
    pub(crate) fn log(&self) {
        match self.severity {
            Severity::Error | Severity::Warning => tracing::warn!(
                kind = self.kind.label(),
                node = ?self.node,
                connection = ?self.connection,
                "{}",
                self.message
            ),
            Severity::Info => tracing::debug!(
                kind = self.kind.label(),
                node = ?self.node,
                "{}",
                self.message
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind.label())?;
        if let Some(node) = self.node {
            write!(f, " node {node}")?;
        }
        if let Some(c) = self.connection {
            write!(f, " connection[{c}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Load aborted; every diagnostic gathered before the abort is kept.
#[derive(Clone, Debug)]
pub struct LoadFailure {
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the patch was rejected for its `version` tag.
    pub unsupported_version: Option<String>,
}

impl LoadFailure {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            unsupported_version: None,
        }
    }

    pub fn single(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }

    pub fn version(version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            diagnostics: vec![Diagnostic::structural(format!(
                "unsupported patch version '{version}'"
            ))],
            unsupported_version: Some(version),
        }
    }
}

impl From<LoadFailure> for crate::foundation::error::PatchError {
    fn from(f: LoadFailure) -> Self {
        match f.unsupported_version {
            Some(v) => Self::UnsupportedVersion(v),
            None => Self::Validation(f.to_string()),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadFailure {}
