//! `hdlsim init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{HdlsimManifest, MANIFEST_FILE};

/// Starter catalog: one counter driven by one clock transactor.
const STARTER_CATALOG: &str = r#"[[component]]
name = "tb.Counter"
role = "extern"
typename = "counter"
ports = [
  { name = "clock", direction = "input" },
  { name = "count", direction = "output", width = 32 },
]
fileset = { sources = ["rtl/counter.sv"] }

[[component]]
name = "tb.ClockXtor"
role = "transactor"
ports = [{ name = "clock", direction = "output" }]

[[component.protocol.methods]]
name = "tick"
params = [{ name = "cycles", type = "u32" }]

[[component]]
name = "tb.Top"
role = "plain"
children = [
  { name = "dut", type = "tb.Counter" },
  { name = "xtor", type = "tb.ClockXtor" },
]
bindings = [["xtor.clock", "dut.clock"]]
"#;

const STARTER_RTL: &str = "module counter(
  input  logic        clock,
  output logic [31:0] count
);
  initial count = 0;
  always @(posedge clock) count <= count + 1;
endmodule
";

/// Create a new hdlsim project named `name` under the current directory.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("rtl")).context("creating rtl/ directory")?;

    fs::write(project_dir.join(MANIFEST_FILE), HdlsimManifest::template(name))
        .context("writing hdlsim.toml")?;
    fs::write(project_dir.join("components.toml"), STARTER_CATALOG)
        .context("writing components.toml")?;
    fs::write(project_dir.join("rtl").join("counter.sv"), STARTER_RTL)
        .context("writing rtl/counter.sv")?;
    fs::write(project_dir.join(".gitignore"), "generated/\n").context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/hdlsim.toml");
    println!("  {name}/components.toml");
    println!("  {name}/rtl/counter.sv");
    println!("  {name}/.gitignore");

    Ok(())
}
