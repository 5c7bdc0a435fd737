//! Depth-first rule walker.
//!
//! [`check`] visits every instance of the tree (array elements individually)
//! and every binding declared along the way. It never stops at the first
//! problem: the returned list holds every violation found.

use std::collections::{HashMap, HashSet};

use hdlsim_core::{Binding, ComponentType, Direction, InstPath, PathSegment, PortRef, Role, Signal};
use tracing::debug;

use crate::violation::{Violation, ViolationKind};

/// Check a component hierarchy and return every violation found.
pub fn check(root: &ComponentType) -> Vec<Violation> {
    let mut walker = Walker {
        root_name: root.short_name().to_string(),
        violations: Vec::new(),
        idents: HashMap::new(),
    };
    walker.visit(root, &InstPath::root(), false, false);
    debug!(
        root = %root.name,
        violations = walker.violations.len(),
        "checked hierarchy"
    );
    walker.violations
}

/// True when `violations` is non-empty.
pub fn has_errors(violations: &[Violation]) -> bool {
    !violations.is_empty()
}

struct Walker {
    root_name: String,
    violations: Vec<Violation>,
    /// Flattened hardware identifier → first instance path that produced it.
    idents: HashMap<String, String>,
}

/// A binding endpoint resolved to its owning instance.
struct Endpoint {
    path: String,
    role: Role,
    /// Direction as seen from the declaring component.
    signal: Signal,
}

impl Walker {
    fn display(&self, path: &InstPath) -> String {
        if path.is_root() {
            self.root_name.clone()
        } else {
            path.to_string()
        }
    }

    fn visit(&mut self, ty: &ComponentType, path: &InstPath, under_host: bool, reported: bool) {
        let location = self.display(path);
        let mut reported = reported;

        for port in ty.ports.iter().filter(|p| p.signal.width == 0) {
            self.violations.push(
                Violation::new(
                    ViolationKind::ZeroWidth,
                    &location,
                    format!("port '{}' of {} has width 0", port.name, ty.name),
                )
                .with_instances([location.clone()]),
            );
        }

        match ty.role {
            // A Transactor without a fileset is legal: its service tasks get
            // acknowledge-only default bodies.
            Role::Transactor => {
                if ty.protocol.is_none() {
                    self.violations.push(
                        Violation::new(
                            ViolationKind::MissingProtocol,
                            &location,
                            format!("transactor {} declares no protocol", ty.name),
                        )
                        .with_instances([location.clone()]),
                    );
                }
            }
            Role::Extern => {
                if ty.is_leaf() && !ty.has_sources() {
                    self.violations.push(
                        Violation::new(
                            ViolationKind::MissingFileset,
                            &location,
                            format!("extern {} has no children and no source files", ty.name),
                        )
                        .with_instances([location.clone()]),
                    );
                } else if !ty.has_sources() {
                    for child in ty.children.iter().filter(|c| c.component.role == Role::Plain) {
                        self.violations.push(
                            Violation::new(
                                ViolationKind::MissingFileset,
                                &location,
                                format!(
                                    "extern {} has no source files and its child '{}' is host-only",
                                    ty.name, child.name
                                ),
                            )
                            .with_instances([location.clone()]),
                        );
                    }
                }
            }
            Role::Plain => {}
        }

        if ty.role.is_hardware() && !path.is_root() {
            if under_host && !reported {
                self.violations.push(
                    Violation::new(
                        ViolationKind::UnreachableHardware,
                        &location,
                        format!(
                            "{} {} sits beneath a host-only component and cannot be instanced",
                            ty.role, ty.name
                        ),
                    )
                    .with_instances([location.clone()]),
                );
                reported = true;
            }

            let ident = path.hdl_ident();
            match self.idents.get(&ident) {
                Some(previous) if *previous != location => {
                    self.violations.push(
                        Violation::new(
                            ViolationKind::DuplicatePath,
                            &location,
                            format!("hardware identifier '{ident}' is also produced by {previous}"),
                        )
                        .with_instances([previous.clone(), location.clone()]),
                    );
                }
                Some(_) => {}
                None => {
                    self.idents.insert(ident, location.clone());
                }
            }
        }

        let mut seen = HashSet::new();
        for child in &ty.children {
            if !seen.insert(child.name.as_str()) {
                let dup = self.display(&path.child(PathSegment::new(child.name.clone())));
                self.violations.push(
                    Violation::new(
                        ViolationKind::DuplicatePath,
                        &location,
                        format!("{} declares child '{}' more than once", ty.name, child.name),
                    )
                    .with_instances([dup]),
                );
            }
        }

        for binding in &ty.bindings {
            self.check_binding(ty, path, binding);
        }

        let child_under_host = under_host || (ty.role == Role::Plain && !path.is_root());
        for child in &ty.children {
            for seg in child.elements() {
                self.visit(&child.component, &path.child(seg), child_under_host, reported);
            }
        }
    }

    fn resolve(
        &self,
        owner: &ComponentType,
        owner_path: &InstPath,
        port: &PortRef,
        binding: &Binding,
    ) -> Result<Endpoint, Violation> {
        let location = self.display(owner_path);
        let path = self.display(&owner_path.join(&port.instance));
        let component = owner.resolve(&port.instance).map_err(|e| {
            Violation::new(ViolationKind::UnresolvedInstance, &location, e.to_string())
                .with_binding(binding)
                .with_instances([path.clone()])
        })?;
        let declared = component.port(&port.port).ok_or_else(|| {
            Violation::new(
                ViolationKind::UnresolvedPort,
                &location,
                format!("{} has no port '{}'", component.name, port.port),
            )
            .with_binding(binding)
            .with_instances([path.clone()])
        })?;
        let mut signal = declared.signal;
        if port.is_self() {
            signal.direction = signal.direction.flipped();
        }
        Ok(Endpoint {
            path,
            role: component.role,
            signal,
        })
    }

    fn check_binding(&mut self, owner: &ComponentType, owner_path: &InstPath, binding: &Binding) {
        let location = self.display(owner_path);
        let left = self.resolve(owner, owner_path, &binding.left, binding);
        let right = self.resolve(owner, owner_path, &binding.right, binding);
        let (left, right) = match (left, right) {
            (Ok(l), Ok(r)) => (l, r),
            (l, r) => {
                self.violations.extend(l.err());
                self.violations.extend(r.err());
                return;
            }
        };

        let crosses = left.role.domain() != right.role.domain();
        let via_transactor = left.role == Role::Transactor || right.role == Role::Transactor;
        if crosses && !via_transactor {
            self.violations.push(
                Violation::new(
                    ViolationKind::CrossDomain,
                    &location,
                    format!(
                        "{} ({}, {} domain) is bound to {} ({}, {} domain) without a transactor",
                        left.path,
                        left.role,
                        left.role.domain(),
                        right.path,
                        right.role,
                        right.role.domain()
                    ),
                )
                .with_binding(binding)
                .with_instances([left.path.clone(), right.path.clone()]),
            );
        }

        let (ld, rd) = (left.signal.direction, right.signal.direction);
        if ld != Direction::Inout && rd != Direction::Inout && ld == rd {
            let reason = if ld == Direction::Output {
                "both ports drive the connection"
            } else {
                "no port drives the connection"
            };
            self.violations.push(
                Violation::new(ViolationKind::DirectionConflict, &location, reason)
                    .with_binding(binding)
                    .with_instances([left.path.clone(), right.path.clone()]),
            );
        }

        if left.signal.width != right.signal.width {
            self.violations.push(
                Violation::new(
                    ViolationKind::WidthMismatch,
                    &location,
                    format!(
                        "{} is {} bits wide but {} is {} bits wide",
                        binding.left, left.signal.width, binding.right, right.signal.width
                    ),
                )
                .with_binding(binding)
                .with_instances([left.path, right.path]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hdlsim_core::{MethodSig, Protocol, SourceFileset};

    use super::*;

    fn dut() -> Arc<ComponentType> {
        Arc::new(
            ComponentType::extern_module("tb.Counter")
                .with_port("clock", Direction::Input, 1)
                .with_port("count", Direction::Output, 32)
                .with_fileset(SourceFileset::with_sources(["counter.sv"])),
        )
    }

    fn clock_xtor() -> Arc<ComponentType> {
        Arc::new(
            ComponentType::transactor(
                "tb.ClockXtor",
                Protocol::new(vec![MethodSig::new("tick").param("cycles", hdlsim_core::DataType::u32())]),
            )
            .with_port("clock", Direction::Output, 1),
        )
    }

    fn binding(l: &str, r: &str) -> Binding {
        Binding::parse(l, r).unwrap()
    }

    fn clocked_counter() -> ComponentType {
        ComponentType::plain("tb.Top")
            .with_child("dut", dut())
            .with_child("xtor", clock_xtor())
            .with_binding(binding("xtor.clock", "dut.clock"))
    }

    #[test]
    fn clocked_counter_is_clean() {
        let violations = check(&clocked_counter());
        assert!(violations.is_empty(), "{violations:?}");
        assert!(!has_errors(&violations));
    }

    #[test]
    fn plain_to_extern_binding_is_reported() {
        let scoreboard = Arc::new(
            ComponentType::plain("tb.Scoreboard").with_port("signal", Direction::Input, 32),
        );
        let root = clocked_counter()
            .with_child("scoreboard", scoreboard)
            .with_binding(binding("scoreboard.signal", "dut.count"));

        let violations = check(&root);
        assert_eq!(violations.len(), 1, "{violations:?}");
        let v = &violations[0];
        assert_eq!(v.kind, ViolationKind::CrossDomain);
        assert!(v.names("scoreboard"));
        assert!(v.names("dut"));
        assert_eq!(v.binding, Some(binding("scoreboard.signal", "dut.count")));
    }

    #[test]
    fn transactor_may_span_domains() {
        let monitor = Arc::new(ComponentType::plain("tb.Monitor").with_port("clk", Direction::Input, 1));
        let root = clocked_counter()
            .with_child("monitor", monitor)
            .with_binding(binding("monitor.clk", "xtor.clock"));
        assert!(check(&root).is_empty());
    }

    #[test]
    fn violations_are_all_collected() {
        let root = ComponentType::plain("tb.Top")
            .with_child("dut", dut())
            .with_child("other", dut())
            .with_binding(binding("dut.count", "other.count"))
            .with_binding(binding("ghost.clock", "dut.clock"))
            .with_binding(binding("dut.nope", "other.clock"))
            .with_binding(binding("dut.clock", "other.count"));

        let kinds: Vec<ViolationKind> = check(&root).iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::DirectionConflict,
                ViolationKind::UnresolvedInstance,
                ViolationKind::UnresolvedPort,
                ViolationKind::WidthMismatch,
            ]
        );
    }

    #[test]
    fn own_ports_drive_children() {
        // An extern composite forwarding its own clock input to a child input.
        let wrapper = Arc::new(
            ComponentType::extern_module("tb.Wrapper")
                .with_port("clock", Direction::Input, 1)
                .with_child("core", dut())
                .with_binding(binding("clock", "core.clock")),
        );
        let root = ComponentType::plain("tb.Top")
            .with_child("wrap", wrapper)
            .with_child("xtor", clock_xtor())
            .with_binding(binding("xtor.clock", "wrap.clock"));
        assert!(check(&root).is_empty());
    }

    #[test]
    fn structural_rules() {
        let bare_extern = Arc::new(ComponentType::extern_module("tb.Bare").with_port("a", Direction::Input, 1));
        let no_proto = Arc::new(ComponentType::new("tb.NoProto", Role::Transactor));
        let agent = Arc::new(ComponentType::plain("tb.Agent").with_child("inner", dut()));
        let root = ComponentType::plain("tb.Top")
            .with_child("bare", bare_extern)
            .with_child("np", no_proto)
            .with_child("agent", agent)
            .with_child("np", clock_xtor());

        let violations = check(&root);
        let find = |kind| violations.iter().find(|v| v.kind == kind).unwrap();
        assert!(find(ViolationKind::MissingFileset).names("bare"));
        assert!(find(ViolationKind::MissingProtocol).names("np"));
        assert!(find(ViolationKind::UnreachableHardware).names("agent.inner"));
        assert!(find(ViolationKind::DuplicatePath).names("np"));
    }

    #[test]
    fn zero_width_ports_are_reported() {
        let narrow = Arc::new(
            ComponentType::extern_module("tb.Narrow")
                .with_port("en", Direction::Input, 0)
                .with_fileset(SourceFileset::with_sources(["narrow.sv"])),
        );
        let root = clocked_counter().with_array("narrow", narrow, 2);
        let violations = check(&root);
        assert_eq!(violations.len(), 2, "{violations:?}");
        assert!(violations.iter().all(|v| v.kind == ViolationKind::ZeroWidth));
        assert!(violations[0].names("narrow[0]"));
        assert!(violations[1].reason.contains("'en'"));
    }

    #[test]
    fn flattened_identifier_collision() {
        let group = Arc::new(ComponentType::extern_module("tb.Group").with_child("b", dut()));
        let root = ComponentType::plain("tb.Top")
            .with_child("a", group)
            .with_child("a__b", dut());
        let violations = check(&root);
        assert_eq!(violations.len(), 1, "{violations:?}");
        assert_eq!(violations[0].kind, ViolationKind::DuplicatePath);
        assert!(violations[0].names("a.b"));
        assert!(violations[0].names("a__b"));
    }

    #[test]
    fn array_elements_checked_individually() {
        let root = ComponentType::plain("tb.Top").with_array(
            "xtors",
            Arc::new(ComponentType::new("tb.NoProto", Role::Transactor)),
            2,
        );
        let violations = check(&root);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].names("xtors[0]"));
        assert!(violations[1].names("xtors[1]"));
    }

    #[test]
    fn violations_serialize() {
        let scoreboard = Arc::new(ComponentType::plain("tb.Sb").with_port("signal", Direction::Input, 32));
        let root = clocked_counter()
            .with_child("sb", scoreboard)
            .with_binding(binding("sb.signal", "dut.count"));
        let json = serde_json::to_value(check(&root)).unwrap();
        assert_eq!(json[0]["kind"], "cross_domain");
        assert_eq!(json[0]["binding"]["left"], "sb.signal");
        assert_eq!(json[0]["offending_instances"][1], "dut");
    }
}
