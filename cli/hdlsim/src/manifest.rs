//! `hdlsim.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hdlsim_gen::{BridgeNames, GenConfig};
use serde::{Deserialize, Serialize};

/// Manifest file name searched for by every command.
pub const MANIFEST_FILE: &str = "hdlsim.toml";

/// The top-level manifest structure for an hdlsim project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdlsimManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Generation settings.
    #[serde(default)]
    pub generate: GenerateConfig,
    /// Bridge entry point names used by the generated wrapper.
    #[serde(default)]
    pub bridge: BridgeNames,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required).
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Generation section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Output directory, relative to the run directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Component catalogs, relative to the project directory.
    #[serde(default = "default_catalogs")]
    pub catalogs: Vec<String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            output_dir: default_output_dir(),
            catalogs: default_catalogs(),
        }
    }
}

fn default_output_dir() -> String {
    hdlsim_gen::task::DEFAULT_OUTPUT_DIR.to_string()
}

fn default_catalogs() -> Vec<String> {
    vec!["components.toml".to_string()]
}

impl HdlsimManifest {
    /// Search upward from `start_dir` for an `hdlsim.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: HdlsimManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing hdlsim.toml")
    }

    /// Generator configuration derived from the `[bridge]` section.
    pub fn gen_config(&self) -> GenConfig {
        GenConfig {
            bridge: self.bridge.clone(),
        }
    }

    /// Catalog paths resolved against the project directory.
    pub fn catalog_paths(&self, project_dir: &Path) -> Vec<PathBuf> {
        self.generate
            .catalogs
            .iter()
            .map(|c| project_dir.join(c))
            .collect()
    }

    /// Generate the default template for `hdlsim init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[generate]
output_dir = "generated"
catalogs = ["components.toml"]
"#
        )
    }
}
