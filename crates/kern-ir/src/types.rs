//! Scalar value types and memory spaces.

use core::fmt;

use crate::register::Family;

/// A scalar type manipulated by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// 8-bit signed integer
    S8,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit signed integer
    S16,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit signed integer
    S32,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit signed integer
    S64,
    /// 64-bit unsigned integer
    U64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl Type {
    /// Every type, in declaration order.
    pub const ALL: [Type; 10] = [
        Type::S8,
        Type::U8,
        Type::S16,
        Type::U16,
        Type::S32,
        Type::U32,
        Type::S64,
        Type::U64,
        Type::F32,
        Type::F64,
    ];

    /// Get the size of this type in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            Type::S8 | Type::U8 => 1,
            Type::S16 | Type::U16 => 2,
            Type::S32 | Type::U32 | Type::F32 => 4,
            Type::S64 | Type::U64 | Type::F64 => 8,
        }
    }

    /// Check if this is an integer type.
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Check if this is a signed integer type.
    pub fn is_signed(&self) -> bool {
        matches!(self, Type::S8 | Type::S16 | Type::S32 | Type::S64)
    }

    /// Check if this is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Type::F32 | Type::F64)
    }

    /// Register family able to hold a value of this type.
    pub fn family(&self) -> Family {
        match self.size_bytes() {
            1 => Family::Byte,
            2 => Family::Word,
            4 => Family::DWord,
            _ => Family::QWord,
        }
    }

    /// Textual name, as used by the printer and the parser.
    pub fn name(&self) -> &'static str {
        match self {
            Type::S8 => "s8",
            Type::U8 => "u8",
            Type::S16 => "s16",
            Type::U16 => "u16",
            Type::S32 => "s32",
            Type::U32 => "u32",
            Type::S64 => "s64",
            Type::U64 => "u64",
            Type::F32 => "f32",
            Type::F64 => "f64",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Addressing domain of a load, store or fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemorySpace {
    /// Global memory, visible to every work item
    Global,
    /// Local memory, shared by a work group
    Local,
    /// Per work item private memory
    Private,
}

impl MemorySpace {
    /// Textual name, as used by the printer and the parser.
    pub fn name(&self) -> &'static str {
        match self {
            MemorySpace::Global => "global",
            MemorySpace::Local => "local",
            MemorySpace::Private => "private",
        }
    }
}

impl fmt::Display for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_type_sizes() {
        assert_eq!(Type::S8.size_bytes(), 1);
        assert_eq!(Type::U16.size_bytes(), 2);
        assert_eq!(Type::S32.size_bytes(), 4);
        assert_eq!(Type::F32.size_bytes(), 4);
        assert_eq!(Type::U64.size_bytes(), 8);
        assert_eq!(Type::F64.size_bytes(), 8);
    }

    #[test]
    fn test_type_kinds() {
        assert!(Type::S32.is_integer());
        assert!(Type::U8.is_integer());
        assert!(!Type::F32.is_integer());
        assert!(Type::F64.is_float());
        assert!(Type::S16.is_signed());
        assert!(!Type::U16.is_signed());
        assert!(!Type::F32.is_signed());
    }

    #[test]
    fn test_type_family() {
        assert_eq!(Type::S8.family(), Family::Byte);
        assert_eq!(Type::U16.family(), Family::Word);
        assert_eq!(Type::F32.family(), Family::DWord);
        assert_eq!(Type::U32.family(), Family::DWord);
        assert_eq!(Type::F64.family(), Family::QWord);
        assert_eq!(Type::S64.family(), Family::QWord);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Type::F32), "f32");
        assert_eq!(format!("{}", Type::S64), "s64");
        assert_eq!(format!("{}", MemorySpace::Local), "local");
    }
}
