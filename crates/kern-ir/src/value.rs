//! Typed immediate values.

use core::fmt;

use crate::types::Type;

/// An immediate constant: raw bits plus the type that gives them meaning.
///
/// The bits are zero-extended into a `u64` (floats are stored by their IEEE
/// bit pattern), so they are not self-describing without `ty`. Values are
/// created from a native Rust scalar and never converted at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value {
    bits: u64,
    ty: Type,
}

impl Value {
    /// Build a value from raw bits and a type tag.
    ///
    /// Bits above the type's width are cleared.
    pub fn from_bits(bits: u64, ty: Type) -> Self {
        let width = ty.size_bytes() * 8;
        let bits = if width == 64 {
            bits
        } else {
            bits & ((1u64 << width) - 1)
        };
        Self { bits, ty }
    }

    /// Raw bit payload
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Type of the value
    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn as_s8(&self) -> Option<i8> {
        (self.ty == Type::S8).then(|| self.bits as u8 as i8)
    }

    pub fn as_u8(&self) -> Option<u8> {
        (self.ty == Type::U8).then(|| self.bits as u8)
    }

    pub fn as_s16(&self) -> Option<i16> {
        (self.ty == Type::S16).then(|| self.bits as u16 as i16)
    }

    pub fn as_u16(&self) -> Option<u16> {
        (self.ty == Type::U16).then(|| self.bits as u16)
    }

    pub fn as_s32(&self) -> Option<i32> {
        (self.ty == Type::S32).then(|| self.bits as u32 as i32)
    }

    pub fn as_u32(&self) -> Option<u32> {
        (self.ty == Type::U32).then(|| self.bits as u32)
    }

    pub fn as_s64(&self) -> Option<i64> {
        (self.ty == Type::S64).then(|| self.bits as i64)
    }

    pub fn as_u64(&self) -> Option<u64> {
        (self.ty == Type::U64).then_some(self.bits)
    }

    pub fn as_f32(&self) -> Option<f32> {
        (self.ty == Type::F32).then(|| f32::from_bits(self.bits as u32))
    }

    pub fn as_f64(&self) -> Option<f64> {
        (self.ty == Type::F64).then(|| f64::from_bits(self.bits))
    }
}

macro_rules! value_from {
    ($native:ty, $ty:expr, |$v:ident| $bits:expr) => {
        impl From<$native> for Value {
            fn from($v: $native) -> Self {
                Value {
                    bits: $bits,
                    ty: $ty,
                }
            }
        }
    };
}

value_from!(i8, Type::S8, |v| v as u8 as u64);
value_from!(u8, Type::U8, |v| v as u64);
value_from!(i16, Type::S16, |v| v as u16 as u64);
value_from!(u16, Type::U16, |v| v as u64);
value_from!(i32, Type::S32, |v| v as u32 as u64);
value_from!(u32, Type::U32, |v| v as u64);
value_from!(i64, Type::S64, |v| v as u64);
value_from!(u64, Type::U64, |v| v);
value_from!(f32, Type::F32, |v| v.to_bits() as u64);
value_from!(f64, Type::F64, |v| v.to_bits());

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.ty)?;
        match self.ty {
            Type::S8 => write!(f, "{}", self.bits as u8 as i8),
            Type::U8 => write!(f, "{}", self.bits as u8),
            Type::S16 => write!(f, "{}", self.bits as u16 as i16),
            Type::U16 => write!(f, "{}", self.bits as u16),
            Type::S32 => write!(f, "{}", self.bits as u32 as i32),
            Type::U32 => write!(f, "{}", self.bits as u32),
            Type::S64 => write!(f, "{}", self.bits as i64),
            Type::U64 => write!(f, "{}", self.bits),
            Type::F32 => write!(f, "{:?}", f32::from_bits(self.bits as u32)),
            Type::F64 => write!(f, "{:?}", f64::from_bits(self.bits)),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_value_keeps_type() {
        let v = Value::from(3.14f32);
        assert_eq!(v.ty(), Type::F32);
        assert_eq!(v.bits(), 3.14f32.to_bits() as u64);
        assert_eq!(v.as_f32(), Some(3.14));
        assert_eq!(v.as_u32(), None);
    }

    #[test]
    fn test_negative_integers_are_zero_extended() {
        let v = Value::from(-1i8);
        assert_eq!(v.bits(), 0xff);
        assert_eq!(v.as_s8(), Some(-1));

        let v = Value::from(-2i32);
        assert_eq!(v.bits(), 0xffff_fffe);
        assert_eq!(v.as_s32(), Some(-2));
    }

    #[test]
    fn test_same_bits_different_type() {
        let a = Value::from(1u32);
        let b = Value::from(1i32);
        assert_eq!(a.bits(), b.bits());
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_bits_masks_width() {
        let v = Value::from_bits(0x1_2345, Type::U16);
        assert_eq!(v.as_u16(), Some(0x2345));
        assert_eq!(Value::from_bits(u64::MAX, Type::U64).as_u64(), Some(u64::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::from(3.14f32)), "f32 3.14");
        assert_eq!(format!("{}", Value::from(1.0f64)), "f64 1.0");
        assert_eq!(format!("{}", Value::from(-7i16)), "s16 -7");
        assert_eq!(format!("{}", Value::from(u64::MAX)), "u64 18446744073709551615");
    }
}
