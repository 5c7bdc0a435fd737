//! Roles, signals, and protocol data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Role tag of a component type.
///
/// The role decides which execution domain implements the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Pre-existing hardware source with no host counterpart.
    Extern,
    /// Dual-generated: hardware implementation plus host-callable API.
    /// The only role allowed to span domains.
    Transactor,
    /// Implemented entirely in the host process.
    Plain,
}

/// The execution domain a role lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Hardware,
    Host,
}

impl Role {
    /// The domain that implements components of this role.
    pub fn domain(&self) -> Domain {
        match self {
            Role::Extern | Role::Transactor => Domain::Hardware,
            Role::Plain => Domain::Host,
        }
    }

    /// Whether this role is implemented in the hardware domain.
    pub fn is_hardware(&self) -> bool {
        self.domain() == Domain::Hardware
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Extern => write!(f, "extern"),
            Role::Transactor => write!(f, "transactor"),
            Role::Plain => write!(f, "plain"),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Hardware => write!(f, "hardware"),
            Domain::Host => write!(f, "host"),
        }
    }
}

/// Direction of a port, seen from outside the component that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

impl Direction {
    /// The direction as seen from inside the owning component.
    ///
    /// A component's own input drives its children, so it acts as a producer
    /// for bindings declared inside that component.
    pub fn flipped(&self) -> Direction {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
            Direction::Inout => Direction::Inout,
        }
    }

    /// SystemVerilog port keyword.
    pub fn sv_keyword(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sv_keyword())
    }
}

/// A typed port: direction plus bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    1
}

impl Signal {
    pub fn input(width: u32) -> Self {
        Signal {
            direction: Direction::Input,
            width,
        }
    }

    pub fn output(width: u32) -> Self {
        Signal {
            direction: Direction::Output,
            width,
        }
    }

    pub fn inout(width: u32) -> Self {
        Signal {
            direction: Direction::Inout,
            width,
        }
    }
}

/// Type of a protocol method parameter or return value.
///
/// Text forms: `void`, `bit`, `bool`, `str`, `u<N>`, `i<N>`, `(a, b, ...)`,
/// and any other identifier as a named host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Void,
    Bit,
    Bool,
    Str,
    UInt(u32),
    Int(u32),
    Tuple(Vec<DataType>),
    Named(String),
}

impl DataType {
    pub fn u8() -> Self {
        DataType::UInt(8)
    }

    pub fn u16() -> Self {
        DataType::UInt(16)
    }

    pub fn u32() -> Self {
        DataType::UInt(32)
    }

    pub fn u64() -> Self {
        DataType::UInt(64)
    }

    pub fn i32() -> Self {
        DataType::Int(32)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    /// Bit width for scalar types, `None` for everything else.
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            DataType::Bit | DataType::Bool => Some(1),
            DataType::UInt(w) | DataType::Int(w) => Some(*w),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, DataType::Int(_))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Void => write!(f, "void"),
            DataType::Bit => write!(f, "bit"),
            DataType::Bool => write!(f, "bool"),
            DataType::Str => write!(f, "str"),
            DataType::UInt(w) => write!(f, "u{w}"),
            DataType::Int(w) => write!(f, "i{w}"),
            DataType::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            DataType::Named(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = |detail: &str| ModelError::InvalidDataType {
            text: s.to_string(),
            detail: detail.to_string(),
        };

        if text.is_empty() {
            return Err(invalid("empty type"));
        }

        if let Some(inner) = text.strip_prefix('(') {
            let inner = inner
                .strip_suffix(')')
                .ok_or_else(|| invalid("unterminated tuple"))?;
            let items = split_top_level(inner)
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .map(DataType::from_str)
                .collect::<Result<Vec<_>>>()?;
            return Ok(DataType::Tuple(items));
        }

        match text {
            "void" | "None" => return Ok(DataType::Void),
            "bit" => return Ok(DataType::Bit),
            "bool" => return Ok(DataType::Bool),
            "str" | "string" => return Ok(DataType::Str),
            _ => {}
        }

        for (prefix, signed) in [("u", false), ("i", true)] {
            if let Some(digits) = text.strip_prefix(prefix) {
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    let width: u32 = digits.parse().map_err(|_| invalid("width too large"))?;
                    if width == 0 {
                        return Err(invalid("zero-width integer"));
                    }
                    return Ok(if signed {
                        DataType::Int(width)
                    } else {
                        DataType::UInt(width)
                    });
                }
            }
        }

        if !text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(invalid("not an identifier"));
        }
        Ok(DataType::Named(text.to_string()))
    }
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

impl TryFrom<String> for DataType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}
