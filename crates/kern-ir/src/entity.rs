//! Index newtypes for the per-function arenas.
//!
//! Registers, tuples, immediates and labels are never referenced by pointer.
//! Each is named by a dense integer into an arena owned by the `Function`,
//! wrapped in a newtype so that a register index cannot be passed where a
//! tuple index is expected.

use core::fmt;

/// Base trait for arena indices.
///
/// Indices provide O(1) conversion to/from `usize` while keeping the
/// different arenas apart at the type level.
pub trait EntityRef: Copy + Clone + PartialEq + Eq + core::hash::Hash + fmt::Debug {
    /// Largest index representable by this entity.
    const MAX: usize;

    /// Get the index of this entity
    fn index(self) -> usize;

    /// Create an entity from an index
    ///
    /// Panics if `index` does not fit in the entity's width.
    fn from_index(index: usize) -> Self;

    /// Get the next available index (for entity creation)
    fn next_index(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

macro_rules! entity_impl {
    ($name:ident, $repr:ty, $prefix:expr, $what:expr) => {
        impl $name {
            /// Create a new index
            pub const fn new(index: $repr) -> Self {
                $name(index)
            }

            /// Get the raw index
            pub const fn as_raw(self) -> $repr {
                self.0
            }
        }

        impl EntityRef for $name {
            const MAX: usize = <$repr>::MAX as usize;

            fn index(self) -> usize {
                self.0 as usize
            }

            fn from_index(index: usize) -> Self {
                match <$repr>::try_from(index) {
                    Ok(raw) => $name(raw),
                    Err(_) => panic!(
                        "{} index {} exceeds the maximum of {}",
                        $what,
                        index,
                        <$repr>::MAX
                    ),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

/// Position of a register in its function's register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterIndex(u16);
entity_impl!(RegisterIndex, u16, "%", "register");

/// Position of the first element of a tuple in the tuple arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleIndex(u32);
entity_impl!(TupleIndex, u32, "t", "tuple");

/// Position of an immediate in its function's value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueIndex(u32);
entity_impl!(ValueIndex, u32, "$", "immediate");

/// Label targeted by branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelIndex(u16);
entity_impl!(LabelIndex, u16, "L", "label");

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_entity_ref_trait() {
        let reg = RegisterIndex::from_index(5);
        assert_eq!(reg.index(), 5);

        let next = reg.next_index();
        assert_eq!(next.index(), 6);
        assert_eq!(next, RegisterIndex::new(6));
    }

    #[test]
    fn test_entity_ordering() {
        let r1 = RegisterIndex::new(1);
        let r2 = RegisterIndex::new(2);
        assert!(r1 < r2);
        assert_eq!(r1, RegisterIndex::new(1));
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(format!("{}", RegisterIndex::new(42)), "%42");
        assert_eq!(format!("{}", ValueIndex::new(3)), "$3");
        assert_eq!(format!("{}", LabelIndex::new(7)), "L7");
        assert_eq!(format!("{}", TupleIndex::new(0)), "t0");
    }

    #[test]
    fn test_register_index_limit() {
        assert_eq!(RegisterIndex::MAX, 65535);
        assert_eq!(RegisterIndex::from_index(65535).as_raw(), u16::MAX);
    }

    #[test]
    #[should_panic(expected = "register index 65536 exceeds the maximum of 65535")]
    fn test_register_index_overflow() {
        let _ = RegisterIndex::from_index(65536);
    }

    #[test]
    #[should_panic(expected = "label index 70000 exceeds")]
    fn test_label_index_overflow() {
        let _ = LabelIndex::from_index(70000);
    }
}
