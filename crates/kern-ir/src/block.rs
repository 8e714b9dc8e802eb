//! Basic blocks.

use alloc::vec::Vec;

use crate::inst::Instruction;

/// A straight-line run of instructions.
///
/// A block starts either at the beginning of the function, at a label, or
/// right after a branch. Blocks own their instructions; there are no
/// back-pointers into the function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    insts: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instructions in program order
    pub fn insts(&self) -> &[Instruction] {
        &self.insts
    }

    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Append an instruction at the end of the block.
    pub fn push(&mut self, inst: Instruction) {
        self.insts.push(inst);
    }

    /// Last instruction, if any
    pub fn last(&self) -> Option<&Instruction> {
        self.insts.last()
    }
}
