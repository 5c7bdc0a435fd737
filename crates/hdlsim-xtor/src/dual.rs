//! Per-type transactor dual generation.

use hdlsim_core::{ArtifactKind, ComponentType, GeneratedArtifact, Role};
use tracing::debug;

use crate::error::{Result, XtorError};
use crate::hdl;
use crate::manifest::ApiManifest;
use crate::marshal::check_signature;

/// The two artifacts generated for one Transactor type.
#[derive(Debug, Clone)]
pub struct TransactorDual {
    /// Qualified type name.
    pub type_name: String,
    /// Hardware module name (`<X>`).
    pub module_name: String,
    pub hdl_artifact: GeneratedArtifact,
    pub api_artifact: GeneratedArtifact,
    pub manifest: ApiManifest,
}

impl TransactorDual {
    /// Name of the generated package (`<X>_pkg`).
    pub fn package_name(&self) -> String {
        format!("{}_pkg", self.module_name)
    }

    /// Name of the bridge wrapper class (`<X>_api_impl`).
    pub fn api_class(&self) -> String {
        format!("{}_api_impl", self.module_name)
    }
}

/// Generate the hardware implementation and API manifest for a Transactor.
///
/// Output depends only on the type's name, ports, protocol and declared
/// source names, so identical input yields byte-identical artifacts.
pub fn generate(xtor: &ComponentType) -> Result<TransactorDual> {
    if xtor.role != Role::Transactor {
        return Err(XtorError::NotATransactor {
            name: xtor.name.clone(),
        });
    }
    let protocol = xtor.protocol.as_ref().ok_or_else(|| XtorError::MissingProtocol {
        name: xtor.name.clone(),
    })?;
    for method in &protocol.methods {
        check_signature(method)?;
    }

    let module_name = xtor.hdl_name().to_string();
    let sv = hdl::emit(xtor, protocol)?;
    let manifest = ApiManifest::from_component(xtor);
    let json = manifest.to_json()?;

    let hdl_artifact = GeneratedArtifact::new(
        module_name.clone(),
        ArtifactKind::HdlModule,
        format!("{module_name}.sv"),
        sv,
        format!("{}@transactor", xtor.name),
    );
    let api_artifact = GeneratedArtifact::new(
        format!("{module_name}_api"),
        ArtifactKind::ApiManifest,
        format!("{module_name}_api.json"),
        json,
        format!("{}@api", xtor.name),
    );
    debug!(
        transactor = %xtor.name,
        methods = protocol.methods.len(),
        hash = hdl_artifact.hash(),
        "generated transactor dual"
    );

    Ok(TransactorDual {
        type_name: xtor.name.clone(),
        module_name,
        hdl_artifact,
        api_artifact,
        manifest,
    })
}
