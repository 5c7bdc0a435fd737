//! Testbench generator: checker gate, transactor duals, wiring module,
//! top wrapper and the ordered fileset.

use std::collections::HashMap;

use hdlsim_check::check;
use hdlsim_core::{ArtifactKind, ComponentType, GeneratedArtifact, Role};
use hdlsim_xtor::TransactorDual;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bridge::BridgeNames;
use crate::elaborate::{elaborate, Elaboration, HdlInstance};
use crate::error::{GenError, Result};
use crate::fileset::{FileGroup, Fileset};
use crate::wrapper::WrappedXtor;
use crate::{hdl_module, host_stub, wrapper};

/// Schema URL recorded in the combined API document.
pub const API_SCHEMA: &str =
    "https://raw.githubusercontent.com/fvutils/pyhdl-if-pytest/main/doc/pyhdl-if.schema.json";

/// Generator configuration.
#[derive(Debug, Clone, Default)]
pub struct GenConfig {
    pub bridge: BridgeNames,
}

/// Everything one generation run produces.
#[derive(Debug, Clone)]
pub struct TestbenchOutput {
    /// Compile-ordered hardware files.
    pub fileset: Fileset,
    /// One dual per distinct Transactor type, first-encountered order.
    pub duals: Vec<TransactorDual>,
    /// Host entry stub.
    pub host_wrapper: GeneratedArtifact,
}

impl TestbenchOutput {
    /// API manifest artifacts, one per distinct Transactor type.
    pub fn api_manifests(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.duals.iter().map(|d| &d.api_artifact)
    }

    /// Combined API document: `{"$schema": ..., "apis": [...]}`.
    pub fn combined_api_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Combined<'a> {
            #[serde(rename = "$schema")]
            schema: &'a str,
            apis: Vec<&'a hdlsim_xtor::ApiManifest>,
        }
        let doc = Combined {
            schema: API_SCHEMA,
            apis: self.duals.iter().map(|d| &d.manifest).collect(),
        };
        let mut text = serde_json::to_string_pretty(&doc)?;
        text.push('\n');
        Ok(text)
    }
}

/// Generates the testbench for a root component.
#[derive(Debug, Clone, Default)]
pub struct TestbenchGenerator {
    config: GenConfig,
}

impl TestbenchGenerator {
    pub fn new(config: GenConfig) -> Self {
        TestbenchGenerator { config }
    }

    /// Run the full generation. Refuses with the violation list when the
    /// checker reports anything; aborts on the first generation failure.
    pub fn generate(&self, root: &ComponentType) -> Result<TestbenchOutput> {
        let violations = check(root);
        if !violations.is_empty() {
            for v in &violations {
                warn!(root = %root.name, "{v}");
            }
            return Err(GenError::Violations(violations));
        }

        let elab = elaborate(root)?;

        let mut duals: Vec<TransactorDual> = Vec::new();
        let mut by_type: HashMap<String, usize> = HashMap::new();
        for inst in elab.transactors() {
            let ty = &inst.component;
            if by_type.contains_key(&ty.name) {
                continue;
            }
            let dual = hdlsim_xtor::generate(ty).map_err(|source| GenError::Transactor {
                path: inst.path.to_string(),
                source,
            })?;
            by_type.insert(ty.name.clone(), duals.len());
            duals.push(dual);
        }
        check_unit_names(root, &duals, &elab)?;

        let mut fileset = Fileset::new();
        for pkg in &elab.packages {
            fileset.push_source(FileGroup::Package, pkg.clone());
        }
        for src in &elab.sources {
            fileset.push_source(FileGroup::Source, src.clone());
        }
        for dual in &duals {
            fileset.push_artifact(FileGroup::Transactor, dual.hdl_artifact.clone());
        }

        let short = root.short_name();
        let hdl_name = hdl_module::hdl_module_name(root);
        fileset.push_artifact(
            FileGroup::HdlModule,
            GeneratedArtifact::new(
                hdl_name.clone(),
                ArtifactKind::HdlModule,
                format!("{hdl_name}.sv"),
                hdl_module::emit(root, &elab),
                format!("{}@hdl", root.name),
            ),
        );

        let dual_of = |inst: &HdlInstance| by_type.get(&inst.component.name).map(|&i| &duals[i]);
        let wrapped: Vec<WrappedXtor<'_>> = elab
            .transactors()
            .filter_map(|inst| {
                dual_of(inst).map(|d| WrappedXtor {
                    instance: inst,
                    package: d.package_name(),
                    api_class: d.api_class(),
                })
            })
            .collect();
        fileset.push_artifact(
            FileGroup::Wrapper,
            GeneratedArtifact::new(
                short,
                ArtifactKind::WrapperModule,
                format!("{short}.sv"),
                wrapper::emit(root, &wrapped, &self.config.bridge),
                format!("{}@wrapper", root.name),
            ),
        );
        fileset.set_incdirs(elab.incdirs.clone());
        fileset.set_defines(elab.defines.clone());

        let stub_entries: Vec<(&HdlInstance, &hdlsim_xtor::ApiManifest)> = elab
            .transactors()
            .filter_map(|inst| dual_of(inst).map(|d| (inst, &d.manifest)))
            .collect();
        let stub_name = host_stub::host_stub_name(root);
        let host_wrapper = GeneratedArtifact::new(
            stub_name.trim_end_matches(".py"),
            ArtifactKind::HostWrapper,
            stub_name.clone(),
            host_stub::emit(root, &stub_entries),
            format!("{}@host", root.name),
        );

        for artifact in fileset.artifacts() {
            debug!(file = artifact.file_name(), hash = artifact.hash(), "artifact");
        }
        info!(
            root = %root.name,
            files = fileset.len(),
            transactors = duals.len(),
            "generated testbench"
        );

        Ok(TestbenchOutput {
            fileset,
            duals,
            host_wrapper,
        })
    }
}

/// Every design unit the run emits must have one owning type; Extern
/// modules may share a name with each other but not with a generated unit.
fn check_unit_names(root: &ComponentType, duals: &[TransactorDual], elab: &Elaboration) -> Result<()> {
    let short = root.short_name();
    let mut units: Vec<(String, &str)> = vec![
        (short.to_string(), root.name.as_str()),
        (hdl_module::hdl_module_name(root), root.name.as_str()),
    ];
    for dual in duals {
        for name in [
            dual.module_name.clone(),
            format!("{}_if", dual.module_name),
            dual.package_name(),
        ] {
            units.push((name, dual.type_name.as_str()));
        }
    }

    let mut owners: HashMap<&str, &str> = HashMap::new();
    for (name, owner) in &units {
        match owners.get(name.as_str()) {
            Some(first) if first != owner => {
                return Err(GenError::NameCollision {
                    name: name.clone(),
                    first: first.to_string(),
                    second: owner.to_string(),
                });
            }
            _ => {
                owners.insert(name.as_str(), *owner);
            }
        }
    }

    for inst in elab.instances.iter().filter(|i| i.component.role == Role::Extern) {
        let name = inst.component.hdl_name();
        if let Some(first) = owners.get(name) {
            return Err(GenError::NameCollision {
                name: name.to_string(),
                first: first.to_string(),
                second: inst.component.name.clone(),
            });
        }
    }
    Ok(())
}

/// Generate the compile-ordered fileset for `root` with default settings.
pub fn generate(root: &ComponentType) -> Result<Fileset> {
    TestbenchGenerator::default()
        .generate(root)
        .map(|out| out.fileset)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hdlsim_check::ViolationKind;
    use hdlsim_core::{Binding, DataType, Direction, MethodSig, Protocol, SourceFileset};
    use hdlsim_xtor::XtorError;

    use super::*;
    use crate::fileset::FileEntry;

    fn dut() -> Arc<ComponentType> {
        Arc::new(
            ComponentType::extern_module("tb.Counter")
                .with_typename("counter")
                .with_port("clock", Direction::Input, 1)
                .with_port("count", Direction::Output, 32)
                .with_fileset(SourceFileset::with_sources(["rtl/counter.sv"])),
        )
    }

    fn clock_xtor() -> Arc<ComponentType> {
        Arc::new(
            ComponentType::transactor(
                "tb.ClockXtor",
                Protocol::new(vec![MethodSig::new("tick").param("cycles", DataType::u32())]),
            )
            .with_port("clock", Direction::Output, 1),
        )
    }

    fn clocked_counter() -> ComponentType {
        ComponentType::plain("tb.Top")
            .with_child("dut", dut())
            .with_child("xtor", clock_xtor())
            .with_binding(Binding::parse("xtor.clock", "dut.clock").unwrap())
    }

    #[test]
    fn clocked_counter_fileset() {
        let fileset = generate(&clocked_counter()).unwrap();
        let names: Vec<&str> = fileset.entries().iter().map(FileEntry::file_name).collect();
        assert_eq!(names, vec!["rtl/counter.sv", "ClockXtor.sv", "Top_hdl.sv", "Top.sv"]);

        let kinds: Vec<Option<ArtifactKind>> = fileset
            .entries()
            .iter()
            .map(|e| e.artifact().map(GeneratedArtifact::kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                None,
                Some(ArtifactKind::HdlModule),
                Some(ArtifactKind::HdlModule),
                Some(ArtifactKind::WrapperModule),
            ]
        );
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let a = TestbenchGenerator::default().generate(&clocked_counter()).unwrap();
        let b = TestbenchGenerator::default().generate(&clocked_counter()).unwrap();
        assert_eq!(a.fileset, b.fileset);
        assert_eq!(a.host_wrapper, b.host_wrapper);
        assert_eq!(a.combined_api_json().unwrap(), b.combined_api_json().unwrap());
    }

    #[test]
    fn refuses_on_violations() {
        let sb = Arc::new(ComponentType::plain("tb.Scoreboard").with_port("signal", Direction::Input, 32));
        let root = clocked_counter()
            .with_child("scoreboard", sb)
            .with_binding(Binding::parse("scoreboard.signal", "dut.count").unwrap());
        match generate(&root) {
            Err(GenError::Violations(v)) => {
                assert_eq!(v.len(), 1);
                assert_eq!(v[0].kind, ViolationKind::CrossDomain);
            }
            other => panic!("expected violations, got {other:?}"),
        }
    }

    #[test]
    fn transactor_failure_is_tagged() {
        let bad = Arc::new(ComponentType::transactor(
            "tb.Bad",
            Protocol::new(vec![MethodSig::new("send").param("msg", DataType::Str)]),
        ));
        let env = Arc::new(ComponentType::extern_module("tb.Env").with_array("bads", bad, 2));
        let root = ComponentType::plain("tb.Top").with_child("env", env);
        match generate(&root) {
            Err(GenError::Transactor { path, source }) => {
                assert_eq!(path, "env.bads[0]");
                assert!(matches!(source, XtorError::UnsupportedSignature { .. }));
            }
            other => panic!("expected transactor error, got {other:?}"),
        }
    }

    #[test]
    fn one_dual_per_type_in_first_seen_order() {
        let other = Arc::new(
            ComponentType::transactor("tb.ResetXtor", Protocol::new(vec![MethodSig::new("pulse")]))
                .with_port("rst", Direction::Output, 1),
        );
        let root = clocked_counter()
            .with_array("more", clock_xtor(), 2)
            .with_child("reset", other);
        let out = TestbenchGenerator::default().generate(&root).unwrap();

        let duals: Vec<&str> = out.duals.iter().map(|d| d.module_name.as_str()).collect();
        assert_eq!(duals, vec!["ClockXtor", "ResetXtor"]);
        assert_eq!(out.api_manifests().count(), 2);

        let wrapper = out.fileset.artifacts().last().unwrap().content().to_string();
        assert_eq!(wrapper.matches("import ClockXtor_pkg::*;").count(), 1);
        assert!(wrapper.contains("pyhdl_if_registerObject(more_1_impl, \"top.more\", 1);"));
        assert!(wrapper.contains("reset_impl = new(top.reset.xtor_if);"));

        let combined: serde_json::Value = serde_json::from_str(&out.combined_api_json().unwrap()).unwrap();
        assert_eq!(combined["$schema"], API_SCHEMA);
        assert_eq!(combined["apis"][1]["module_name"], "ResetXtor");
    }

    #[test]
    fn same_short_name_in_two_packages_is_refused() {
        let a = Arc::new(ComponentType::transactor("a.Xtor", Protocol::new(vec![MethodSig::new("tick")])));
        let b = Arc::new(ComponentType::transactor("b.Xtor", Protocol::new(vec![MethodSig::new("pulse")])));
        let root = ComponentType::plain("tb.Top").with_child("a", a).with_child("b", b);
        match generate(&root) {
            Err(GenError::NameCollision { name, first, second }) => {
                assert_eq!(name, "Xtor");
                assert_eq!(first, "a.Xtor");
                assert_eq!(second, "b.Xtor");
            }
            other => panic!("expected NameCollision, got {other:?}"),
        }
    }

    #[test]
    fn generated_units_do_not_shadow_root_or_externs() {
        let top_xtor = Arc::new(ComponentType::transactor("lib.Top", Protocol::new(vec![MethodSig::new("tick")])));
        let root = ComponentType::plain("tb.Top").with_child("x", top_xtor);
        assert!(matches!(
            generate(&root),
            Err(GenError::NameCollision { name, .. }) if name == "Top"
        ));

        let hdl_xtor = Arc::new(ComponentType::transactor("lib.Top_hdl", Protocol::default()));
        let root = ComponentType::plain("tb.Top").with_child("x", hdl_xtor);
        assert!(matches!(
            generate(&root),
            Err(GenError::NameCollision { name, .. }) if name == "Top_hdl"
        ));

        let rtl = Arc::new(
            ComponentType::extern_module("tb.ClockModel")
                .with_typename("ClockXtor")
                .with_fileset(SourceFileset::with_sources(["rtl/clock.sv"])),
        );
        let root = clocked_counter().with_child("model", rtl);
        assert!(matches!(
            generate(&root),
            Err(GenError::NameCollision { name, second, .. }) if name == "ClockXtor" && second == "tb.ClockModel"
        ));
    }

    #[test]
    fn externs_may_share_a_module() {
        let second = Arc::new(
            ComponentType::extern_module("tb.CounterView")
                .with_typename("counter")
                .with_fileset(SourceFileset::with_sources(["rtl/counter.sv"])),
        );
        let root = clocked_counter().with_child("view", second);
        assert!(generate(&root).is_ok());
    }

    #[test]
    fn custom_bridge_names() {
        let config = GenConfig {
            bridge: BridgeNames {
                configure: "my_configure".into(),
                ..Default::default()
            },
        };
        let out = TestbenchGenerator::new(config).generate(&clocked_counter()).unwrap();
        let wrapper = out.fileset.artifacts().last().unwrap();
        assert!(wrapper.content().contains("        my_configure(\"tb.Top\");\n"));
        assert_eq!(out.host_wrapper.file_name(), "test_top.py");
    }
}
