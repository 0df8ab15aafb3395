use std::cell::RefCell;
use std::fmt;

/// What kind of best-effort failure a diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A `$ref`/`$dynamicRef` or pointer that could not be followed.
    UnresolvedReference,
    /// A referenced document that could not be fetched or parsed.
    UnreachableDocument,
    /// A construct the model does not understand (unknown style, format, ...).
    UnsupportedConstruct,
    /// A discriminator mapping or polymorphic branch that was dropped.
    DroppedMapping,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
            DiagnosticKind::UnreachableDocument => "unreachable-document",
            DiagnosticKind::UnsupportedConstruct => "unsupported-construct",
            DiagnosticKind::DroppedMapping => "dropped-mapping",
        }
    }
}

/// One soft failure, recorded instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

/// Collector for soft failures of a single generation run.
///
/// Runs are single-threaded, so the collector uses interior mutability and can
/// be shared by reference between the resolver and every later stage.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it through the `log` facade.
    pub fn warn(&self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}: {}", kind.as_str(), message);
        self.entries.borrow_mut().push(Diagnostic { kind, message });
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|d| d.message.contains(needle))
    }

    /// Move all entries of `other` into this collector.
    pub fn absorb(&self, other: Diagnostics) {
        self.entries
            .borrow_mut()
            .extend(other.entries.into_inner());
    }
}
