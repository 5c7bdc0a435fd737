//! Ordered compilation fileset.
//!
//! Hardware compilers resolve packages and imports in file order, so the
//! fileset keeps entries partitioned into a fixed group precedence:
//! packages, Extern sources, generated transactors, the wiring module and
//! finally the top wrapper.

use std::collections::HashSet;

use hdlsim_core::GeneratedArtifact;
use serde::Serialize;

/// Compile-order group. Variant order is compile order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileGroup {
    Package,
    Source,
    Transactor,
    HdlModule,
    Wrapper,
}

/// One fileset entry: a pass-through source file or a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    Source { group: FileGroup, path: String },
    Artifact { group: FileGroup, artifact: GeneratedArtifact },
}

impl FileEntry {
    pub fn group(&self) -> FileGroup {
        match self {
            FileEntry::Source { group, .. } | FileEntry::Artifact { group, .. } => *group,
        }
    }

    /// Path for sources, file name for generated artifacts.
    pub fn file_name(&self) -> &str {
        match self {
            FileEntry::Source { path, .. } => path,
            FileEntry::Artifact { artifact, .. } => artifact.file_name(),
        }
    }

    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        match self {
            FileEntry::Artifact { artifact, .. } => Some(artifact),
            FileEntry::Source { .. } => None,
        }
    }
}

/// Serializable reference to one entry, as reported by the build task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub group: FileGroup,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Ordered list of files to compile plus aggregated include dirs and defines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fileset {
    entries: Vec<FileEntry>,
    incdirs: Vec<String>,
    defines: Vec<String>,
}

impl Fileset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn incdirs(&self) -> &[String] {
        &self.incdirs
    }

    pub fn defines(&self) -> &[String] {
        &self.defines
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generated artifacts in compile order.
    pub fn artifacts(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.entries.iter().filter_map(FileEntry::artifact)
    }

    /// Insert keeping group precedence; within a group, first added stays first.
    pub(crate) fn push(&mut self, entry: FileEntry) {
        let group = entry.group();
        let at = self
            .entries
            .iter()
            .position(|e| e.group() > group)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, entry);
    }

    pub(crate) fn push_source(&mut self, group: FileGroup, path: String) {
        self.push(FileEntry::Source { group, path });
    }

    pub(crate) fn push_artifact(&mut self, group: FileGroup, artifact: GeneratedArtifact) {
        self.push(FileEntry::Artifact { group, artifact });
    }

    pub(crate) fn set_incdirs(&mut self, incdirs: Vec<String>) {
        self.incdirs = incdirs;
    }

    pub(crate) fn set_defines(&mut self, defines: Vec<String>) {
        self.defines = defines;
    }

    /// Entry references in compile order, with `prefix` joined onto generated file names.
    pub fn file_refs(&self, prefix: Option<&str>) -> Vec<FileRef> {
        self.entries
            .iter()
            .map(|e| match e {
                FileEntry::Source { group, path } => FileRef {
                    group: *group,
                    path: path.clone(),
                    hash: None,
                },
                FileEntry::Artifact { group, artifact } => FileRef {
                    group: *group,
                    path: match prefix {
                        Some(dir) => format!("{dir}/{}", artifact.file_name()),
                        None => artifact.file_name().to_string(),
                    },
                    hash: Some(artifact.hash().to_string()),
                },
            })
            .collect()
    }
}

/// Insertion-ordered set of strings.
#[derive(Debug, Default)]
pub(crate) struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    pub(crate) fn insert(&mut self, item: String) -> bool {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub(crate) fn extend<I: IntoIterator<Item = String>>(&mut self, items: I) {
        for item in items {
            self.insert(item);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.items
    }
}
