//! `<Root>`: the top wrapper bridging into the host domain.

use hdlsim_core::ComponentType;

use crate::bridge::BridgeNames;
use crate::elaborate::HdlInstance;
use crate::hdl_module::hdl_module_name;

/// Hierarchical name of the wiring module instance inside the wrapper.
pub const TOP_INSTANCE: &str = "top";

/// A transactor instance as the wrapper sees it.
pub struct WrappedXtor<'a> {
    pub instance: &'a HdlInstance,
    /// `<X>_pkg`
    pub package: String,
    /// `<X>_api_impl`
    pub api_class: String,
}

/// Emit the top wrapper.
///
/// With transactors present, one `initial` block starts the bridge,
/// constructs and registers one wrapper object per transactor instance,
/// hands the qualified root name to the host configuration entry point and
/// runs the host process before `$finish`.
pub fn emit(root: &ComponentType, xtors: &[WrappedXtor<'_>], names: &BridgeNames) -> String {
    let mut text = String::new();
    text.push_str(&format!("// Generated by hdlsim: top wrapper for {}\n", root.name));
    text.push_str(&format!("module {};\n", root.short_name()));

    if !xtors.is_empty() {
        text.push_str(&format!("    import {}::*;\n", names.package));
        let mut imported: Vec<&str> = Vec::new();
        for x in xtors {
            if !imported.contains(&x.package.as_str()) {
                imported.push(&x.package);
                text.push_str(&format!("    import {}::*;\n", x.package));
            }
        }
        text.push('\n');
    }

    text.push_str(&format!("    {} {TOP_INSTANCE}();\n", hdl_module_name(root)));

    if !xtors.is_empty() {
        text.push_str("\n    initial begin\n");
        for x in xtors {
            text.push_str(&format!("        {} {}_impl;\n", x.api_class, x.instance.ident()));
        }
        text.push('\n');
        text.push_str(&format!("        {}();\n", names.start));
        for x in xtors {
            let ident = x.instance.ident();
            let (path, index) = x.instance.path.registry_key(TOP_INSTANCE);
            text.push_str(&format!("        {ident}_impl = new({TOP_INSTANCE}.{ident}.xtor_if);\n"));
            text.push_str(&format!(
                "        {}({ident}_impl, \"{path}\", {index});\n",
                names.register
            ));
        }
        text.push_str(&format!("        {}(\"{}\");\n", names.configure, root.name));
        text.push_str(&format!("        {}(\"{}\");\n", names.run, names.run_arg));
        text.push_str("        $finish;\n");
        text.push_str("    end\n");
    }

    text.push_str("endmodule\n");
    text
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hdlsim_core::{InstPath, PathSegment, Protocol};

    use super::*;

    fn xtor_instance(path: InstPath) -> HdlInstance {
        HdlInstance {
            path,
            component: Arc::new(ComponentType::transactor("tb.BusXtor", Protocol::default())),
        }
    }

    #[test]
    fn registers_each_element() {
        let root = ComponentType::plain("tb.Top");
        let a = xtor_instance(InstPath::from_segments(vec![PathSegment::indexed("xtors", 0)]));
        let b = xtor_instance(InstPath::from_segments(vec![PathSegment::indexed("xtors", 1)]));
        let wrapped: Vec<WrappedXtor<'_>> = [&a, &b]
            .into_iter()
            .map(|instance| WrappedXtor {
                instance,
                package: "BusXtor_pkg".into(),
                api_class: "BusXtor_api_impl".into(),
            })
            .collect();

        let sv = emit(&root, &wrapped, &BridgeNames::default());
        let expected = "\
// Generated by hdlsim: top wrapper for tb.Top
module Top;
    import pyhdl_if::*;
    import BusXtor_pkg::*;

    Top_hdl top();

    initial begin
        BusXtor_api_impl xtors_0_impl;
        BusXtor_api_impl xtors_1_impl;

        pyhdl_if_start();
        xtors_0_impl = new(top.xtors_0.xtor_if);
        pyhdl_if_registerObject(xtors_0_impl, \"top.xtors\", 0);
        xtors_1_impl = new(top.xtors_1.xtor_if);
        pyhdl_if_registerObject(xtors_1_impl, \"top.xtors\", 1);
        hdlsim_configure(\"tb.Top\");
        pyhdl_pytest(\".\");
        $finish;
    end
endmodule
";
        assert_eq!(sv, expected);
    }

    #[test]
    fn no_transactors() {
        let root = ComponentType::plain("tb.Top");
        let sv = emit(&root, &[], &BridgeNames::default());
        assert_eq!(sv, "// Generated by hdlsim: top wrapper for tb.Top\nmodule Top;\n    Top_hdl top();\nendmodule\n");
    }
}
