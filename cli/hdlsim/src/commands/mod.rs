//! CLI command implementations.

pub mod api;
pub mod check;
pub mod gen_tb;
pub mod init;

use std::path::Path;

use anyhow::{Context, Result};
use hdlsim_core::TypeCatalog;
use tracing::debug;

use crate::manifest::HdlsimManifest;

/// Load the component catalog for a command.
///
/// An explicit `--catalog` wins; otherwise every catalog the manifest lists
/// is merged, falling back to `components.toml` in the project directory.
pub(crate) fn load_catalog(
    project_dir: &Path,
    manifest: Option<&HdlsimManifest>,
    catalog: Option<&str>,
) -> Result<TypeCatalog> {
    let paths = match (catalog, manifest) {
        (Some(path), _) => vec![Path::new(path).to_path_buf()],
        (None, Some(m)) => m.catalog_paths(project_dir),
        (None, None) => vec![project_dir.join("components.toml")],
    };

    let mut merged = TypeCatalog::new();
    for path in &paths {
        let loaded = TypeCatalog::load(path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
        merged
            .extend(loaded)
            .with_context(|| format!("merging catalog {}", path.display()))?;
    }
    debug!(catalogs = paths.len(), types = merged.len(), "catalog ready");
    Ok(merged)
}
