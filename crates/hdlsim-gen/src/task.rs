//! The `gen-tb` build task.
//!
//! Resolves a root type from a catalog, generates everything in memory and
//! only then writes the files, so a failed run leaves nothing behind that
//! could be mistaken for complete output.

use std::fs;
use std::path::{Path, PathBuf};

use hdlsim_core::{GeneratedArtifact, TypeCatalog};
use serde::Serialize;
use tracing::info;

use crate::error::{GenError, Result};
use crate::fileset::FileRef;
use crate::generator::{GenConfig, TestbenchGenerator};

/// Default output directory under the run directory.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// File name of the combined API document.
pub const COMBINED_API_FILE: &str = "transactor_apis.json";

/// Outputs reported by the task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskOutput {
    /// Generated hardware files, compile order.
    pub sv_files: Vec<String>,
    /// Generated host files.
    pub py_files: Vec<String>,
    /// Per-transactor manifests followed by the combined document.
    pub api_files: Vec<String>,
    /// Every file to compile, compile order.
    pub filesets: Vec<FileRef>,
    pub incdirs: Vec<String>,
    pub defines: Vec<String>,
}

/// Build task generating the testbench for one root type.
#[derive(Debug, Clone)]
pub struct GenTbTask {
    class_name: String,
    output_dir: String,
    config: GenConfig,
}

impl GenTbTask {
    pub fn new(class_name: impl Into<String>) -> Self {
        GenTbTask {
            class_name: class_name.into(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            config: GenConfig::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_config(mut self, config: GenConfig) -> Self {
        self.config = config;
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Directory the task writes into.
    pub fn output_path(&self, rundir: &Path) -> PathBuf {
        rundir.join(&self.output_dir)
    }

    /// Generate and persist the testbench for the configured class.
    pub fn run(&self, catalog: &TypeCatalog, rundir: &Path) -> Result<TaskOutput> {
        match self.class_name.rsplit_once('.') {
            Some((pkg, ty)) if !pkg.is_empty() && !ty.is_empty() => {}
            _ => {
                return Err(GenError::InvalidClassName {
                    name: self.class_name.clone(),
                })
            }
        }
        let root = catalog.resolve(&self.class_name)?;
        let out = TestbenchGenerator::new(self.config.clone()).generate(&root)?;
        let combined = if out.duals.is_empty() {
            None
        } else {
            Some(out.combined_api_json()?)
        };

        let dir = self.output_path(rundir);
        fs::create_dir_all(&dir)?;
        let write = |artifact: &GeneratedArtifact| -> Result<String> {
            let path = dir.join(artifact.file_name());
            fs::write(&path, artifact.content())?;
            Ok(path.to_string_lossy().into_owned())
        };

        let mut output = TaskOutput::default();
        for artifact in out.fileset.artifacts() {
            output.sv_files.push(write(artifact)?);
        }
        output.py_files.push(write(&out.host_wrapper)?);
        for artifact in out.api_manifests() {
            output.api_files.push(write(artifact)?);
        }
        if let Some(text) = combined {
            let path = dir.join(COMBINED_API_FILE);
            fs::write(&path, text)?;
            output.api_files.push(path.to_string_lossy().into_owned());
        }

        let dir_text = dir.to_string_lossy().into_owned();
        output.filesets = out.fileset.file_refs(Some(&dir_text));
        output.incdirs.push(dir_text.clone());
        for inc in out.fileset.incdirs() {
            if !output.incdirs.contains(inc) {
                output.incdirs.push(inc.clone());
            }
        }
        output.defines = out.fileset.defines().to_vec();

        info!(
            class = %self.class_name,
            dir = %dir_text,
            sv = output.sv_files.len(),
            api = output.api_files.len(),
            "gen-tb complete"
        );
        Ok(output)
    }
}
