//! `hdlsim check`: run the structural checker on a root type.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hdlsim_check::Violation;

use crate::commands::load_catalog;
use crate::manifest::HdlsimManifest;

/// Check `class_name` and print every violation.
///
/// Fails when at least one violation is reported.
pub fn run(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    class_name: &str,
    catalog: Option<&str>,
    report_format: Option<&str>,
) -> Result<()> {
    let violations = check_class(project_dir, manifest, class_name, catalog)?;

    match report_format.unwrap_or("human") {
        "human" => {
            if violations.is_empty() {
                println!("{class_name}: no violations");
            } else {
                println!("{class_name}: {} violation(s)", violations.len());
                for v in &violations {
                    println!("  {v}");
                }
            }
        }
        "json" => {
            let json = serde_json::to_string_pretty(&violations)
                .context("serializing violations")?;
            println!("{json}");
        }
        other => bail!("unknown report format '{other}' (expected human or json)"),
    }

    if !violations.is_empty() {
        bail!("{class_name} failed the structural check");
    }
    Ok(())
}

pub(crate) fn check_class(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    class_name: &str,
    catalog: Option<&str>,
) -> Result<Vec<Violation>> {
    let catalog = load_catalog(project_dir, manifest, catalog)?;
    let root = catalog
        .resolve(class_name)
        .with_context(|| format!("resolving {class_name}"))?;
    Ok(hdlsim_check::check(&root))
}
