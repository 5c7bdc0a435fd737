//! API manifest: the host-facing description of a transactor.

use hdlsim_core::{ComponentType, DataType, Direction, MethodSig};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Calling convention of a method on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// May consume simulation time.
    ImpTask,
    /// Completes without advancing simulation time.
    ImpFunc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPort {
    pub name: String,
    pub direction: Direction,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMethod {
    pub name: String,
    pub kind: MethodKind,
    pub params: Vec<ApiParam>,
    pub return_type: String,
}

/// One transactor's callable surface plus its port list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiManifest {
    pub module_name: String,
    pub ports: Vec<ApiPort>,
    pub methods: Vec<ApiMethod>,
}

/// Host-side type name for a protocol type.
///
/// Integer widths round up to the next host integer size.
pub fn api_type_name(ty: &DataType) -> String {
    fn sized(prefix: &str, width: u32) -> String {
        let bits = match width {
            0..=8 => 8,
            9..=16 => 16,
            17..=32 => 32,
            _ => 64,
        };
        format!("{prefix}{bits}")
    }
    match ty {
        DataType::Void => "void".to_string(),
        DataType::Bit | DataType::Bool | DataType::UInt(1) => "bool".to_string(),
        DataType::UInt(w) => sized("uint", *w),
        DataType::Int(w) => sized("int", *w),
        DataType::Str => "string".to_string(),
        DataType::Tuple(_) | DataType::Named(_) => "pyobject".to_string(),
    }
}

fn api_method(method: &MethodSig) -> ApiMethod {
    ApiMethod {
        name: method.name.clone(),
        kind: if method.blocking {
            MethodKind::ImpTask
        } else {
            MethodKind::ImpFunc
        },
        params: method
            .params
            .iter()
            .map(|p| ApiParam {
                name: p.name.clone(),
                ty: api_type_name(&p.ty),
            })
            .collect(),
        return_type: api_type_name(&method.returns),
    }
}

impl ApiManifest {
    /// Describe a transactor. Methods keep protocol order.
    pub fn from_component(xtor: &ComponentType) -> Self {
        ApiManifest {
            module_name: xtor.hdl_name().to_string(),
            ports: xtor
                .ports
                .iter()
                .map(|p| ApiPort {
                    name: p.name.clone(),
                    direction: p.signal.direction,
                    width: p.signal.width,
                })
                .collect(),
            methods: xtor
                .protocol
                .iter()
                .flat_map(|proto| proto.methods.iter().map(api_method))
                .collect(),
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}
