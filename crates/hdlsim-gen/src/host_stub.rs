//! Host test entry stub (`test_<root>.py`).

use hdlsim_core::ComponentType;
use hdlsim_xtor::ApiManifest;

use crate::elaborate::HdlInstance;
use crate::wrapper::TOP_INSTANCE;

/// File name of the host entry stub for `root`.
pub fn host_stub_name(root: &ComponentType) -> String {
    format!("test_{}.py", root.short_name().to_lowercase())
}

fn signature(manifest: &ApiManifest) -> Vec<String> {
    manifest
        .methods
        .iter()
        .map(|m| {
            let params: Vec<String> = m.params.iter().map(|p| format!("{}: {}", p.name, p.ty)).collect();
            format!("{}({}) -> {}", m.name, params.join(", "), m.return_type)
        })
        .collect()
}

/// Emit the stub. `xtors` pairs each transactor instance with its manifest.
pub fn emit(root: &ComponentType, xtors: &[(&HdlInstance, &ApiManifest)]) -> String {
    let class = root.short_name();
    let mut text = String::new();
    text.push_str(&format!("\"\"\"Host test entry for {}, generated by hdlsim.\n\n", root.name));
    text.push_str("Loaded by the host runner after the top wrapper has registered every\n");
    text.push_str("transactor. Constructing the root type yields the runtime proxy.\n");
    text.push_str("\"\"\"\n");
    match root.name.rsplit_once('.') {
        Some((module, _)) => text.push_str(&format!("from {module} import {class}\n")),
        None => text.push_str(&format!("# {class} must be importable from the host path\n")),
    }

    if !xtors.is_empty() {
        text.push_str("\n# Transactors:\n");
        for (inst, manifest) in xtors {
            text.push_str(&format!("#   {} ({})\n", inst.path.under(TOP_INSTANCE), manifest.module_name));
            for sig in signature(manifest) {
                text.push_str(&format!("#     {sig}\n"));
            }
        }
    }

    text.push_str(&format!("\n\nasync def test_{}():\n", class.to_lowercase()));
    text.push_str(&format!("    tb = {class}()\n"));
    for (inst, manifest) in xtors {
        if let Some(m) = manifest.methods.first() {
            text.push_str(&format!("    # await tb.{}.{}(...)\n", inst.path, m.name));
        }
    }
    text.push_str("    del tb\n");
    text
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hdlsim_core::{DataType, Direction, InstPath, MethodSig, PathSegment, Protocol};

    use super::*;

    #[test]
    fn stub_lists_transactors() {
        let xtor = Arc::new(
            ComponentType::transactor(
                "tb.ClockXtor",
                Protocol::new(vec![MethodSig::new("tick").param("n", DataType::u32())]),
            )
            .with_port("clock", Direction::Output, 1),
        );
        let inst = HdlInstance {
            path: InstPath::from_segments(vec![PathSegment::new("xtor")]),
            component: Arc::clone(&xtor),
        };
        let manifest = ApiManifest::from_component(&xtor);
        let root = ComponentType::plain("tb.Top");

        assert_eq!(host_stub_name(&root), "test_top.py");
        let py = emit(&root, &[(&inst, &manifest)]);
        assert!(py.contains("from tb import Top\n"));
        assert!(py.contains("#   top.xtor (ClockXtor)\n#     tick(n: uint32) -> void\n"));
        assert!(py.contains("async def test_top():\n    tb = Top()\n    # await tb.xtor.tick(...)\n"));
    }
}
