//! Protocol type marshaling.
//!
//! Every argument and result crosses the domain boundary in a 64-bit slot.
//! Values must fit their declared width on the way in; signed values are
//! sign-extended from their declared width on the way out. The method
//! identity on the wire is the method's index in the protocol.

use std::fmt;

use hdlsim_core::{DataType, MethodSig};

use crate::error::{Result, XtorError};

/// Width of one argument/result slot.
pub const SLOT_BITS: u32 = 64;

/// A host-side value passed to or returned from a transactor method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Unit,
    Bool(bool),
    UInt(u64),
    Int(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
        }
    }
}

fn mask(width: u32) -> u64 {
    if width >= SLOT_BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn unsupported(method: &MethodSig, ty: &DataType) -> XtorError {
    XtorError::UnsupportedSignature {
        method: method.name.clone(),
        ty: ty.to_string(),
    }
}

/// Bit width of a type that fits in one slot; `None` when it does not.
fn slot_width(ty: &DataType) -> Option<u32> {
    ty.bit_width().filter(|w| (1..=SLOT_BITS).contains(w))
}

/// Verify every parameter and the return type of `method` can be marshaled.
///
/// Non-blocking methods are fire-and-forget, so they must return void.
pub fn check_signature(method: &MethodSig) -> Result<()> {
    if !method.blocking && !method.returns.is_void() {
        return Err(XtorError::NonBlockingReturn {
            method: method.name.clone(),
        });
    }
    for param in &method.params {
        if slot_width(&param.ty).is_none() {
            return Err(unsupported(method, &param.ty));
        }
    }
    if !method.returns.is_void() && slot_width(&method.returns).is_none() {
        return Err(unsupported(method, &method.returns));
    }
    Ok(())
}

/// SystemVerilog data type for a marshalable scalar (`bit`, `bit [31:0]`,
/// `bit signed [15:0]`).
pub fn sv_type(ty: &DataType) -> Option<String> {
    let width = slot_width(ty)?;
    let signed = if ty.is_signed() { " signed" } else { "" };
    Some(if width == 1 && !ty.is_signed() {
        "bit".to_string()
    } else {
        format!("bit{signed} [{}:0]", width - 1)
    })
}

/// Slice expression selecting a value of `ty` out of slot `slot`.
pub fn sv_slice(slot: &str, ty: &DataType) -> Option<String> {
    let width = slot_width(ty)?;
    Some(if width == 1 {
        format!("{slot}[0]")
    } else {
        format!("{slot}[{}:0]", width - 1)
    })
}

/// Whether `v` lies in the two's complement range of a `width`-bit integer.
fn fits_signed(v: i64, width: u32) -> bool {
    if width >= SLOT_BITS {
        return true;
    }
    let max = (1i64 << (width - 1)) - 1;
    (-max - 1..=max).contains(&v)
}

/// Encode a value into a slot. Values that do not fit the declared width
/// are rejected rather than truncated.
pub fn encode(ty: &DataType, value: &Value) -> Result<u64> {
    let mismatch = || XtorError::TypeMismatch {
        ty: ty.to_string(),
        value: value.to_string(),
    };
    match (ty, value) {
        (DataType::Void, Value::Unit) => Ok(0),
        (DataType::Bit | DataType::Bool, Value::Bool(b)) => Ok(u64::from(*b)),
        (DataType::Bit | DataType::Bool, Value::UInt(v)) if *v <= 1 => Ok(*v),
        (DataType::UInt(w), Value::UInt(v)) if (1..=SLOT_BITS).contains(w) && *v <= mask(*w) => Ok(*v),
        (DataType::UInt(w), Value::Bool(b)) if (1..=SLOT_BITS).contains(w) => Ok(u64::from(*b)),
        (DataType::Int(w), Value::Int(v)) if (1..=SLOT_BITS).contains(w) && fits_signed(*v, *w) => {
            Ok((*v as u64) & mask(*w))
        }
        _ => Err(mismatch()),
    }
}

/// Decode a slot into a value of the declared type.
pub fn decode(ty: &DataType, slot: u64) -> Result<Value> {
    match ty {
        DataType::Void => Ok(Value::Unit),
        DataType::Bit | DataType::Bool => Ok(Value::Bool(slot & 1 != 0)),
        DataType::UInt(w) if (1..=SLOT_BITS).contains(w) => Ok(Value::UInt(slot & mask(*w))),
        DataType::Int(w) if (1..=SLOT_BITS).contains(w) => {
            let shift = SLOT_BITS - w;
            Ok(Value::Int(((slot << shift) as i64) >> shift))
        }
        _ => Err(XtorError::TypeMismatch {
            ty: ty.to_string(),
            value: format!("{slot:#x}"),
        }),
    }
}

/// Encode a full argument list for `method`, checking arity and types.
pub fn encode_args(method: &MethodSig, args: &[Value]) -> Result<Vec<u64>> {
    if args.len() != method.params.len() {
        return Err(XtorError::ArityMismatch {
            method: method.name.clone(),
            expected: method.params.len(),
            found: args.len(),
        });
    }
    method
        .params
        .iter()
        .zip(args)
        .map(|(param, value)| encode(&param.ty, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(encode(&DataType::u8(), &Value::UInt(0xff)).unwrap(), 0xff);
        match encode(&DataType::u8(), &Value::UInt(0x1ff)) {
            Err(XtorError::TypeMismatch { ty, value }) => {
                assert_eq!(ty, DataType::u8().to_string());
                assert_eq!(value, "511");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
        assert_eq!(encode(&DataType::u64(), &Value::UInt(u64::MAX)).unwrap(), u64::MAX);

        let i8 = DataType::Int(8);
        assert_eq!(encode(&i8, &Value::Int(127)).unwrap(), 0x7f);
        assert_eq!(encode(&i8, &Value::Int(-128)).unwrap(), 0x80);
        assert!(encode(&i8, &Value::Int(128)).is_err());
        assert!(encode(&i8, &Value::Int(-129)).is_err());
        assert_eq!(encode(&DataType::Int(64), &Value::Int(i64::MIN)).unwrap(), 1 << 63);
        assert!(encode(&DataType::UInt(0), &Value::UInt(0)).is_err());

        assert_eq!(decode(&DataType::UInt(4), 0xfa).unwrap(), Value::UInt(0xa));
    }

    #[test]
    fn non_blocking_methods_return_void() {
        let post = MethodSig::new("post").param("data", DataType::u8()).non_blocking();
        assert!(check_signature(&post).is_ok());
        let peek = MethodSig::new("peek").returns(DataType::u8()).non_blocking();
        assert!(matches!(
            check_signature(&peek),
            Err(XtorError::NonBlockingReturn { method }) if method == "peek"
        ));
    }

    #[test]
    fn signed_values_sign_extend() {
        let ty = DataType::Int(8);
        let slot = encode(&ty, &Value::Int(-3)).unwrap();
        assert_eq!(slot, 0xfd);
        assert_eq!(decode(&ty, slot).unwrap(), Value::Int(-3));
        assert_eq!(decode(&ty, 0x7f).unwrap(), Value::Int(127));
        assert_eq!(decode(&DataType::Int(64), u64::MAX).unwrap(), Value::Int(-1));
    }

    #[test]
    fn bools_and_unit() {
        assert_eq!(encode(&DataType::Bool, &Value::Bool(true)).unwrap(), 1);
        assert_eq!(decode(&DataType::Bit, 0b10).unwrap(), Value::Bool(false));
        assert_eq!(decode(&DataType::Void, 42).unwrap(), Value::Unit);
        assert!(encode(&DataType::Bool, &Value::UInt(2)).is_err());
        assert!(encode(&DataType::u32(), &Value::Int(1)).is_err());
    }

    #[test]
    fn signature_support() {
        let ok = MethodSig::new("read")
            .param("addr", DataType::u32())
            .param("en", DataType::Bool)
            .returns(DataType::u64());
        assert!(check_signature(&ok).is_ok());

        for bad in [
            DataType::Str,
            DataType::UInt(65),
            DataType::Tuple(vec![DataType::u8()]),
            DataType::Named("pkg.Packet".into()),
            DataType::Void,
        ] {
            let m = MethodSig::new("send").param("x", bad.clone());
            match check_signature(&m) {
                Err(XtorError::UnsupportedSignature { method, ty }) => {
                    assert_eq!(method, "send");
                    assert_eq!(ty, bad.to_string());
                }
                other => panic!("expected UnsupportedSignature, got {other:?}"),
            }
        }

        let tuple_ret = MethodSig::new("pair").returns(DataType::Tuple(vec![DataType::u8(), DataType::u8()]));
        assert!(check_signature(&tuple_ret).is_err());
    }

    #[test]
    fn sv_types() {
        assert_eq!(sv_type(&DataType::Bool).unwrap(), "bit");
        assert_eq!(sv_type(&DataType::u32()).unwrap(), "bit [31:0]");
        assert_eq!(sv_type(&DataType::Int(16)).unwrap(), "bit signed [15:0]");
        assert_eq!(sv_type(&DataType::Int(1)).unwrap(), "bit signed [0:0]");
        assert!(sv_type(&DataType::Str).is_none());
        assert_eq!(sv_slice("args[0]", &DataType::u8()).unwrap(), "args[0][7:0]");
        assert_eq!(sv_slice("args[1]", &DataType::Bit).unwrap(), "args[1][0]");
    }

    #[test]
    fn arity_is_checked() {
        let m = MethodSig::new("write").param("addr", DataType::u32()).param("data", DataType::u32());
        assert!(matches!(
            encode_args(&m, &[Value::UInt(1)]),
            Err(XtorError::ArityMismatch { expected: 2, found: 1, .. })
        ));
        assert_eq!(encode_args(&m, &[Value::UInt(1), Value::UInt(2)]).unwrap(), vec![1, 2]);
    }
}
