//! Immutable generated artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::text_hash;

/// What a generated artifact is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Hardware source: a generated transactor or the `<Root>_hdl` wiring module.
    HdlModule,
    /// The `<Root>` top wrapper that bridges into the host domain.
    WrapperModule,
    /// JSON description of a transactor's callable surface.
    ApiManifest,
    /// Host-side entry stub.
    HostWrapper,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::HdlModule => "hdl_module",
            ArtifactKind::WrapperModule => "wrapper_module",
            ArtifactKind::ApiManifest => "api_manifest",
            ArtifactKind::HostWrapper => "host_wrapper",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated file body plus the metadata needed to order and persist it.
///
/// Fields are private so the hash always matches the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    logical_name: String,
    kind: ArtifactKind,
    file_name: String,
    content: String,
    ordering_key: String,
    hash: String,
}

impl GeneratedArtifact {
    pub fn new(
        logical_name: impl Into<String>,
        kind: ArtifactKind,
        file_name: impl Into<String>,
        content: String,
        ordering_key: impl Into<String>,
    ) -> Self {
        let hash = text_hash(&content);
        GeneratedArtifact {
            logical_name: logical_name.into(),
            kind,
            file_name: file_name.into(),
            content,
            ordering_key: ordering_key.into(),
            hash,
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn ordering_key(&self) -> &str {
        &self.ordering_key
    }

    /// Hex SHA-256 of the content.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_tracks_content() {
        let a = GeneratedArtifact::new(
            "Top_hdl",
            ArtifactKind::HdlModule,
            "Top_hdl.sv",
            "module Top_hdl; endmodule\n".into(),
            "Top_hdl@",
        );
        let b = GeneratedArtifact::new(
            "Top_hdl",
            ArtifactKind::HdlModule,
            "Top_hdl.sv",
            "module Top_hdl; endmodule\n".into(),
            "Top_hdl@",
        );
        assert_eq!(a, b);
        assert_eq!(a.hash().len(), 64);
        assert_eq!(a.hash(), text_hash(a.content()));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ArtifactKind::WrapperModule).unwrap();
        assert_eq!(json, "\"wrapper_module\"");
        assert_eq!(ArtifactKind::ApiManifest.to_string(), "api_manifest");
    }
}
