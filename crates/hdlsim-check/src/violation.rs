//! Violation records.

use std::fmt;

use hdlsim_core::Binding;
use serde::Serialize;

/// Which rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A binding connects the hardware and host domains directly.
    CrossDomain,
    /// A binding names an instance that does not exist.
    UnresolvedInstance,
    /// A binding names a port the instance does not declare.
    UnresolvedPort,
    /// A binding has two drivers or no driver.
    DirectionConflict,
    /// The two ports of a binding differ in width.
    WidthMismatch,
    /// An Extern leaf has no source files.
    MissingFileset,
    /// Two instances resolve to the same path or hardware identifier.
    DuplicatePath,
    /// A Transactor declares no protocol.
    MissingProtocol,
    /// Hardware placed beneath a host-only component.
    UnreachableHardware,
    /// A port declares width 0.
    ZeroWidth,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::CrossDomain => "cross-domain binding",
            ViolationKind::UnresolvedInstance => "unresolved instance",
            ViolationKind::UnresolvedPort => "unresolved port",
            ViolationKind::DirectionConflict => "direction conflict",
            ViolationKind::WidthMismatch => "width mismatch",
            ViolationKind::MissingFileset => "missing fileset",
            ViolationKind::DuplicatePath => "duplicate path",
            ViolationKind::MissingProtocol => "missing protocol",
            ViolationKind::UnreachableHardware => "unreachable hardware",
            ViolationKind::ZeroWidth => "zero-width port",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broken rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// The binding as declared, when the rule concerns a binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
    /// Path of the component that declares the binding or owns the instance.
    pub location: String,
    pub reason: String,
    /// Instance paths involved, relative to the checked root.
    pub offending_instances: Vec<String>,
}

impl Violation {
    pub(crate) fn new(kind: ViolationKind, location: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            kind,
            binding: None,
            location: location.into(),
            reason: reason.into(),
            offending_instances: Vec::new(),
        }
    }

    pub(crate) fn with_binding(mut self, binding: &Binding) -> Self {
        self.binding = Some(binding.clone());
        self
    }

    pub(crate) fn with_instances<I, S>(mut self, instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offending_instances = instances.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `path` is one of the offending instances.
    pub fn names(&self, path: &str) -> bool {
        self.offending_instances.iter().any(|p| p == path)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {}", self.kind, self.location, self.reason)?;
        if let Some(binding) = &self.binding {
            write!(f, " [binding {binding}]")?;
        }
        Ok(())
    }
}
