//! Registers and the per-function register file.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    entity::{EntityRef, RegisterIndex, TupleIndex},
    entity_map::PrimaryMap,
};

/// Register family, i.e. the size of one register lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Boolean (predicate) register
    Bool,
    /// 8-bit register
    Byte,
    /// 16-bit register
    Word,
    /// 32-bit register
    DWord,
    /// 64-bit register
    QWord,
}

impl Family {
    /// Size of one lane in bits.
    pub fn size_bits(&self) -> usize {
        match self {
            Family::Bool => 1,
            Family::Byte => 8,
            Family::Word => 16,
            Family::DWord => 32,
            Family::QWord => 64,
        }
    }

    /// Size of one lane in bytes. Booleans occupy a full byte.
    pub fn size_bytes(&self) -> usize {
        (self.size_bits() + 7) / 8
    }

    /// Textual name, as used by the printer and the parser.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Bool => "bool",
            Family::Byte => "byte",
            Family::Word => "word",
            Family::DWord => "dword",
            Family::QWord => "qword",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A register descriptor. Registers carry only their family; their identity
/// is the `RegisterIndex` they were allocated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    family: Family,
}

impl Register {
    pub fn new(family: Family) -> Self {
        Self { family }
    }

    pub fn family(&self) -> Family {
        self.family
    }
}

/// All registers and register tuples of one function.
///
/// Both arenas are append-only. Tuples group several register indices into
/// one contiguous run so that an instruction can reference a variable number
/// of operands through a single `TupleIndex`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterFile {
    regs: PrimaryMap<RegisterIndex, Register>,
    tuples: Vec<RegisterIndex>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a register of the given family at the end of the file.
    ///
    /// Panics once the 16-bit index space is exhausted.
    pub fn append(&mut self, family: Family) -> RegisterIndex {
        if self.regs.next_key().is_none() {
            panic!(
                "register file is full: at most {} registers per function",
                RegisterIndex::MAX + 1
            );
        }
        self.regs.push(Register::new(family))
    }

    /// Append the given registers as one contiguous tuple and return the
    /// index of its first element.
    ///
    /// An empty tuple takes no entries, so its index is the one the next
    /// non-empty tuple receives. Tuple indices are unique only among
    /// non-empty tuples; an empty tuple is only ever read with length 0.
    pub fn append_tuple(&mut self, regs: &[RegisterIndex]) -> TupleIndex {
        let first = self.tuples.len();
        let end = first + regs.len();
        if end > 0 && end - 1 > TupleIndex::MAX {
            panic!(
                "tuple arena is full: {} + {} entries exceed the 32-bit index space",
                first,
                regs.len()
            );
        }
        debug_assert!(
            regs.iter().all(|reg| self.regs.is_valid(*reg)),
            "tuple references a register that was not allocated"
        );
        self.tuples.extend_from_slice(regs);
        TupleIndex::from_index(first)
    }

    /// Get the register at `index`. Panics if it was never allocated.
    pub fn get(&self, index: RegisterIndex) -> Register {
        match self.regs.get(index) {
            Some(reg) => *reg,
            None => panic!(
                "register {} out of range ({} registers allocated)",
                index,
                self.regs.len()
            ),
        }
    }

    /// Get element `which` of the tuple starting at `tuple`.
    /// Panics if `tuple + which` is past the end of the arena.
    pub fn get_tuple(&self, tuple: TupleIndex, which: usize) -> RegisterIndex {
        let offset = tuple.index() + which;
        match self.tuples.get(offset) {
            Some(reg) => *reg,
            None => panic!(
                "tuple element {}+{} out of range ({} tuple entries)",
                tuple,
                which,
                self.tuples.len()
            ),
        }
    }

    /// The `len` registers of the tuple starting at `tuple`, if in range.
    pub fn try_tuple_slice(&self, tuple: TupleIndex, len: usize) -> Option<&[RegisterIndex]> {
        let start = tuple.index();
        self.tuples.get(start..start.checked_add(len)?)
    }

    /// The `len` registers of the tuple starting at `tuple`.
    pub fn tuple_slice(&self, tuple: TupleIndex, len: usize) -> &[RegisterIndex] {
        match self.try_tuple_slice(tuple, len) {
            Some(slice) => slice,
            None => panic!(
                "tuple {} of length {} out of range ({} tuple entries)",
                tuple,
                len,
                self.tuples.len()
            ),
        }
    }

    /// Check whether `index` names an allocated register.
    pub fn is_valid(&self, index: RegisterIndex) -> bool {
        self.regs.is_valid(index)
    }

    /// Number of allocated registers
    pub fn reg_num(&self) -> usize {
        self.regs.len()
    }

    /// Number of entries in the tuple arena
    pub fn tuple_num(&self) -> usize {
        self.tuples.len()
    }

    /// Iterate over registers in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (RegisterIndex, Register)> + '_ {
        self.regs.iter().map(|(index, reg)| (index, *reg))
    }
}
