//! `hdlsim api`: print the API manifests of a root type's transactors.

use std::path::Path;

use anyhow::{Context, Result};
use hdlsim_gen::TestbenchGenerator;

use crate::commands::load_catalog;
use crate::manifest::HdlsimManifest;

/// Print the combined API document for `class_name`.
pub fn run(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    class_name: &str,
    catalog: Option<&str>,
) -> Result<()> {
    print!("{}", render(project_dir, manifest, class_name, catalog)?);
    Ok(())
}

pub(crate) fn render(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    class_name: &str,
    catalog: Option<&str>,
) -> Result<String> {
    let catalog = load_catalog(project_dir, manifest, catalog)?;
    let root = catalog
        .resolve(class_name)
        .with_context(|| format!("resolving {class_name}"))?;
    let config = manifest.map(HdlsimManifest::gen_config).unwrap_or_default();
    let output = TestbenchGenerator::new(config)
        .generate(&root)
        .with_context(|| format!("generating transactors for {class_name}"))?;
    Ok(output.combined_api_json()?)
}
