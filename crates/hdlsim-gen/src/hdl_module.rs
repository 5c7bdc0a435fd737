//! `<Root>_hdl`: the hardware wiring module.

use hdlsim_core::ComponentType;
use hdlsim_xtor::hdl::width_range;

use crate::elaborate::Elaboration;

/// Module name of the wiring module for `root`.
pub fn hdl_module_name(root: &ComponentType) -> String {
    format!("{}_hdl", root.short_name())
}

/// Emit the wiring module: one net per connected port group, one instance
/// per elaborated Extern/Transactor.
pub fn emit(root: &ComponentType, elab: &Elaboration) -> String {
    let mut text = String::new();
    text.push_str(&format!("// Generated by hdlsim: hardware wiring for {}\n", root.name));
    text.push_str(&format!("module {};\n", hdl_module_name(root)));

    if !elab.nets.is_empty() {
        text.push('\n');
        for net in &elab.nets {
            text.push_str(&format!(
                "    {}{} {};\n",
                net.kind.keyword(),
                width_range(net.width),
                net.name
            ));
        }
    }

    for inst in &elab.instances {
        text.push('\n');
        let ports = &inst.component.ports;
        if ports.is_empty() {
            text.push_str(&format!("    {} {}();\n", inst.module_name(), inst.ident()));
            continue;
        }
        let conns: Vec<String> = ports
            .iter()
            .map(|p| {
                let net = elab.connection(&inst.path, &p.name).unwrap_or("");
                format!("        .{}({net})", p.name)
            })
            .collect();
        text.push_str(&format!(
            "    {} {}(\n{}\n    );\n",
            inst.module_name(),
            inst.ident(),
            conns.join(",\n")
        ));
    }

    text.push_str("endmodule\n");
    text
}
