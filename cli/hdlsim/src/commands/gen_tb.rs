//! `hdlsim gen-tb`: generate and write the testbench for a root type.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hdlsim_gen::{GenTbTask, TaskOutput};

use crate::commands::load_catalog;
use crate::manifest::HdlsimManifest;

/// Run the `gen-tb` task for `class_name` into `rundir`.
pub fn run(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    class_name: &str,
    rundir: Option<&str>,
    catalog: Option<&str>,
    report_format: Option<&str>,
) -> Result<()> {
    let rundir = rundir.map(Path::new).unwrap_or(project_dir);
    let output = generate(project_dir, manifest, class_name, rundir, catalog)?;

    match report_format.unwrap_or("human") {
        "human" => {
            println!("Generated testbench for {class_name}");
            for file in output.sv_files.iter().chain(&output.py_files).chain(&output.api_files) {
                println!("  {file}");
            }
        }
        "json" => {
            let json = serde_json::to_string_pretty(&output).context("serializing task outputs")?;
            println!("{json}");
        }
        other => bail!("unknown report format '{other}' (expected human or json)"),
    }
    Ok(())
}

pub(crate) fn generate(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    class_name: &str,
    rundir: &Path,
    catalog: Option<&str>,
) -> Result<TaskOutput> {
    let catalog = load_catalog(project_dir, manifest, catalog)?;
    let mut task = GenTbTask::new(class_name);
    if let Some(m) = manifest {
        task = task
            .with_output_dir(m.generate.output_dir.as_str())
            .with_config(m.gen_config());
    }
    task.run(&catalog, rundir)
        .with_context(|| format!("generating testbench for {class_name}"))
}
