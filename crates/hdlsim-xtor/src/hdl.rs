//! SystemVerilog emission for a transactor.
//!
//! The emitted file holds three units, in this order:
//!
//! - `interface <X>_if`: the request/acknowledge handshake. Each protocol
//!   method is a task that takes the `lock` semaphore, writes `method_id`
//!   and the argument slots, raises `req`, waits for `ack`, reads `result`
//!   and drops `req`. The semaphore keeps one request outstanding per
//!   instance.
//! - `package <X>_pkg`: class `<X>_api_impl`, the object handed to the
//!   bridge. It holds a `virtual <X>_if` and forwards each method to it.
//!   Blocking methods forward as tasks; non-blocking methods are functions
//!   that fork the interface task and return at once.
//! - `module <X>`: the declared ports, an `<X>_if xtor_if()` instance, the
//!   per-method `*_impl` tasks and the service loop dispatching on
//!   `method_id`. When the type declares sources, each one is included in
//!   place of the default `*_impl` bodies.
//!
//! Method and parameter names are emitted verbatim, so [`check_names`]
//! rejects keywords and the identifiers the generated units declare.

use std::path::Path;

use hdlsim_core::{ComponentType, DataType, Direction, MethodSig, Port, Protocol};

use crate::error::{Result, XtorError};
use crate::marshal::{sv_slice, sv_type};

/// Name of the output argument carrying a method's return value.
const RETVAL: &str = "retval";

/// Identifiers declared by the generated units themselves.
const GENERATED_NAMES: &[&str] = &[
    "req", "ack", "method_id", "args", "result", "lock", RETVAL, "vif", "this", "new", "xtor_if",
];

/// IEEE 1800-2017 reserved keywords.
const SV_KEYWORDS: &[&str] = &[
    "accept_on", "alias", "always", "always_comb", "always_ff", "always_latch", "and", "assert",
    "assign", "assume", "automatic", "before", "begin", "bind", "bins", "binsof", "bit", "break",
    "buf", "bufif0", "bufif1", "byte", "case", "casex", "casez", "cell", "chandle", "checker",
    "class", "clocking", "cmos", "config", "const", "constraint", "context", "continue", "cover",
    "covergroup", "coverpoint", "cross", "deassign", "default", "defparam", "design", "disable",
    "dist", "do", "edge", "else", "end", "endcase", "endchecker", "endclass", "endclocking",
    "endconfig", "endfunction", "endgenerate", "endgroup", "endinterface", "endmodule",
    "endpackage", "endprimitive", "endprogram", "endproperty", "endspecify", "endsequence",
    "endtable", "endtask", "enum", "event", "eventually", "expect", "export", "extends", "extern",
    "final", "first_match", "for", "force", "foreach", "forever", "fork", "forkjoin", "function",
    "generate", "genvar", "global", "highz0", "highz1", "if", "iff", "ifnone", "ignore_bins",
    "illegal_bins", "implements", "implies", "import", "incdir", "include", "initial", "inout",
    "input", "inside", "instance", "int", "integer", "interconnect", "interface", "intersect",
    "join", "join_any", "join_none", "large", "let", "liblist", "library", "local", "localparam",
    "logic", "longint", "macromodule", "matches", "medium", "modport", "module", "nand",
    "negedge", "nettype", "new", "nexttime", "nmos", "nor", "noshowcancelled", "not", "notif0",
    "notif1", "null", "or", "output", "package", "packed", "parameter", "pmos", "posedge",
    "primitive", "priority", "program", "property", "protected", "pull0", "pull1", "pulldown",
    "pullup", "pulsestyle_ondetect", "pulsestyle_onevent", "pure", "rand", "randc", "randcase",
    "randsequence", "rcmos", "real", "realtime", "ref", "reg", "reject_on", "release", "repeat",
    "restrict", "return", "rnmos", "rpmos", "rtran", "rtranif0", "rtranif1", "s_always",
    "s_eventually", "s_nexttime", "s_until", "s_until_with", "scalared", "sequence", "shortint",
    "shortreal", "showcancelled", "signed", "small", "soft", "solve", "specify", "specparam",
    "static", "string", "strong", "strong0", "strong1", "struct", "super", "supply0", "supply1",
    "sync_accept_on", "sync_reject_on", "table", "tagged", "task", "this", "throughout", "time",
    "timeprecision", "timeunit", "tran", "tranif0", "tranif1", "tri", "tri0", "tri1", "triand",
    "trior", "trireg", "type", "typedef", "union", "unique", "unique0", "unsigned", "until",
    "until_with", "untyped", "use", "uwire", "var", "vectored", "virtual", "void", "wait",
    "wait_order", "wand", "weak", "weak0", "weak1", "while", "wildcard", "wire", "with", "within",
    "wor", "xnor", "xor",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_usable(name: &str) -> bool {
    is_identifier(name) && !GENERATED_NAMES.contains(&name) && !SV_KEYWORDS.contains(&name)
}

/// Verify every method and parameter name of `protocol` can be emitted
/// verbatim into the units generated for `xtor`.
pub fn check_names(xtor: &ComponentType, protocol: &Protocol) -> Result<()> {
    let module = xtor.hdl_name();
    let mut methods: Vec<&str> = Vec::new();
    for method in &protocol.methods {
        let reserved = |name: &str| XtorError::ReservedName {
            method: method.name.clone(),
            name: name.to_string(),
        };
        if !is_usable(&method.name) {
            return Err(reserved(&method.name));
        }
        if methods.contains(&method.name.as_str()) {
            return Err(XtorError::DuplicateName {
                scope: format!("protocol of {}", xtor.name),
                name: method.name.clone(),
            });
        }
        methods.push(&method.name);

        let mut params: Vec<&str> = Vec::new();
        for param in &method.params {
            if !is_usable(&param.name) {
                return Err(reserved(&param.name));
            }
            if params.contains(&param.name.as_str()) {
                return Err(XtorError::DuplicateName {
                    scope: format!("method '{}'", method.name),
                    name: param.name.clone(),
                });
            }
            params.push(&param.name);
        }
    }

    // `<m>_impl` tasks and the interface instance share the module scope with the ports.
    let mut module_names: Vec<String> = methods.iter().map(|m| format!("{m}_impl")).collect();
    module_names.push("xtor_if".to_string());
    for name in module_names {
        if methods.contains(&name.as_str()) || xtor.ports.iter().any(|p| p.name == name) {
            return Err(XtorError::DuplicateName {
                scope: format!("module {module}"),
                name,
            });
        }
    }
    Ok(())
}

/// File name a declared source is included by; its directory goes on the
/// include path.
pub fn include_name(source: &str) -> &str {
    Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source)
}

/// ` [w-1:0]` for multi-bit signals, empty for single bits.
pub fn width_range(width: u32) -> String {
    if width > 1 {
        format!(" [{}:0]", width - 1)
    } else {
        String::new()
    }
}

/// Port declaration as it appears in a module header.
pub fn port_decl(port: &Port) -> String {
    let kind = match port.signal.direction {
        Direction::Inout => "wire",
        Direction::Input | Direction::Output => "logic",
    };
    format!(
        "{} {kind}{} {}",
        port.signal.direction.sv_keyword(),
        width_range(port.signal.width),
        port.name
    )
}

/// A protocol method with its hardware types resolved.
struct Method<'a> {
    id: usize,
    sig: &'a MethodSig,
    params: Vec<(&'a str, String)>,
    ret: Option<String>,
}

impl<'a> Method<'a> {
    fn resolve(id: usize, sig: &'a MethodSig) -> Result<Self> {
        let ty_of = |ty: &DataType| {
            sv_type(ty).ok_or_else(|| XtorError::UnsupportedSignature {
                method: sig.name.clone(),
                ty: ty.to_string(),
            })
        };
        let params = sig
            .params
            .iter()
            .map(|p| Ok((p.name.as_str(), ty_of(&p.ty)?)))
            .collect::<Result<Vec<_>>>()?;
        let ret = if sig.returns.is_void() {
            None
        } else {
            Some(ty_of(&sig.returns)?)
        };
        Ok(Method { id, sig, params, ret })
    }

    /// Formal argument list: inputs, then the return value as an output.
    fn formals(&self) -> String {
        let mut formals: Vec<String> = self
            .params
            .iter()
            .map(|(name, ty)| format!("input {ty} {name}"))
            .collect();
        if let Some(ty) = &self.ret {
            formals.push(format!("output {ty} {RETVAL}"));
        }
        formals.join(", ")
    }

    /// Actual argument list matching [`Method::formals`].
    fn actuals(&self) -> String {
        let mut actuals: Vec<&str> = self.params.iter().map(|(name, _)| *name).collect();
        if self.ret.is_some() {
            actuals.push(RETVAL);
        }
        actuals.join(", ")
    }
}

/// Emit the complete SystemVerilog source for a transactor.
pub fn emit(xtor: &ComponentType, protocol: &Protocol) -> Result<String> {
    check_names(xtor, protocol)?;
    let methods = protocol
        .methods
        .iter()
        .enumerate()
        .map(|(id, sig)| Method::resolve(id, sig))
        .collect::<Result<Vec<_>>>()?;
    let name = xtor.hdl_name();

    let mut text = String::new();
    text.push_str(&format!("// Generated by hdlsim: transactor {}\n\n", xtor.name));
    emit_interface(&mut text, name, &methods);
    emit_package(&mut text, name, &methods);
    emit_module(&mut text, xtor, name, &methods);
    Ok(text)
}

fn emit_interface(text: &mut String, name: &str, methods: &[Method<'_>]) {
    let slots = methods.iter().map(|m| m.params.len()).max().unwrap_or(0).max(1);

    text.push_str(&format!("interface {name}_if;\n"));
    text.push_str("    bit req = 0;\n");
    text.push_str("    bit ack = 0;\n");
    text.push_str("    int unsigned method_id;\n");
    text.push_str(&format!("    bit [63:0] args[{slots}];\n"));
    text.push_str("    bit [63:0] result;\n");
    text.push_str("    semaphore lock = new(1);\n");

    for m in methods {
        text.push('\n');
        text.push_str(&format!("    task automatic {}({});\n", m.sig.name, m.formals()));
        text.push_str("        lock.get();\n");
        text.push_str(&format!("        method_id = {};\n", m.id));
        for (i, (param, _)) in m.params.iter().enumerate() {
            text.push_str(&format!("        args[{i}] = 64'({param});\n"));
        }
        text.push_str("        req = 1;\n");
        text.push_str("        wait (ack);\n");
        if let Some(slice) = m.ret.as_ref().and_then(|_| sv_slice("result", &m.sig.returns)) {
            text.push_str(&format!("        {RETVAL} = {slice};\n"));
        }
        text.push_str("        req = 0;\n");
        text.push_str("        wait (!ack);\n");
        text.push_str("        lock.put();\n");
        text.push_str("    endtask\n");
    }
    text.push_str("endinterface\n\n");
}

fn emit_package(text: &mut String, name: &str, methods: &[Method<'_>]) {
    text.push_str(&format!("package {name}_pkg;\n"));
    text.push_str(&format!("    class {name}_api_impl;\n"));
    text.push_str(&format!("        virtual {name}_if vif;\n\n"));
    text.push_str(&format!("        function new(virtual {name}_if vif);\n"));
    text.push_str("            this.vif = vif;\n");
    text.push_str("        endfunction\n");
    for m in methods {
        text.push('\n');
        if m.sig.blocking {
            text.push_str(&format!("        task {}({});\n", m.sig.name, m.formals()));
            text.push_str(&format!("            vif.{}({});\n", m.sig.name, m.actuals()));
            text.push_str("        endtask\n");
        } else {
            text.push_str(&format!("        function void {}({});\n", m.sig.name, m.formals()));
            text.push_str("            fork\n");
            text.push_str(&format!("                vif.{}({});\n", m.sig.name, m.actuals()));
            text.push_str("            join_none\n");
            text.push_str("        endfunction\n");
        }
    }
    text.push_str("    endclass\n");
    text.push_str("endpackage\n\n");
}

fn emit_module(text: &mut String, xtor: &ComponentType, name: &str, methods: &[Method<'_>]) {
    if xtor.ports.is_empty() {
        text.push_str(&format!("module {name};\n"));
    } else {
        let ports: Vec<String> = xtor.ports.iter().map(|p| format!("    {}", port_decl(p))).collect();
        text.push_str(&format!("module {name}(\n{}\n);\n", ports.join(",\n")));
    }
    text.push_str(&format!("    {name}_if xtor_if();\n\n"));

    let sources = xtor.fileset.as_ref().map(|fs| fs.sources.as_slice()).unwrap_or_default();
    if !sources.is_empty() {
        for source in sources {
            text.push_str(&format!("`include \"{}\"\n", include_name(source)));
        }
        text.push('\n');
    } else {
        for m in methods {
            text.push_str(&format!("    task automatic {}_impl({});\n", m.sig.name, m.formals()));
            if m.ret.is_some() {
                text.push_str(&format!("        {RETVAL} = '0;\n"));
            }
            text.push_str("    endtask\n\n");
        }
    }

    text.push_str("    initial forever begin\n");
    text.push_str("        wait (xtor_if.req);\n");
    text.push_str("        case (xtor_if.method_id)\n");
    for m in methods {
        let mut actuals: Vec<String> = m
            .sig
            .params
            .iter()
            .enumerate()
            .filter_map(|(i, p)| sv_slice(&format!("xtor_if.args[{i}]"), &p.ty))
            .collect();
        text.push_str(&format!("            {}: begin\n", m.id));
        match &m.ret {
            Some(ty) => {
                actuals.push(RETVAL.to_string());
                text.push_str(&format!("                {ty} {RETVAL};\n"));
                text.push_str(&format!("                {}_impl({});\n", m.sig.name, actuals.join(", ")));
                text.push_str(&format!("                xtor_if.result = 64'({RETVAL});\n"));
            }
            None => {
                text.push_str(&format!("                {}_impl({});\n", m.sig.name, actuals.join(", ")));
                text.push_str("                xtor_if.result = '0;\n");
            }
        }
        text.push_str("            end\n");
    }
    text.push_str(&format!(
        "            default: $error(\"{name}: unknown method id %0d\", xtor_if.method_id);\n"
    ));
    text.push_str("        endcase\n");
    text.push_str("        xtor_if.ack = 1;\n");
    text.push_str("        wait (!xtor_if.req);\n");
    text.push_str("        xtor_if.ack = 0;\n");
    text.push_str("    end\n");
    text.push_str("endmodule\n");
}
