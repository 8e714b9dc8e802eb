//! Text form of one instruction.

use core::fmt;

use super::Instruction;
use crate::{
    entity::{RegisterIndex, TupleIndex},
    function::Function,
};

/// Displays an instruction with its tuples resolved through `func`.
///
/// Instructions alone cannot be printed: their multi-operand forms only hold
/// a tuple index.
pub struct DisplayInst<'a> {
    inst: &'a Instruction,
    func: &'a Function,
}

impl<'a> DisplayInst<'a> {
    pub fn new(inst: &'a Instruction, func: &'a Function) -> Self {
        Self { inst, func }
    }

    fn tuple(&self, f: &mut fmt::Formatter<'_>, tuple: TupleIndex, len: usize) -> fmt::Result {
        match self.func.register_file().try_tuple_slice(tuple, len) {
            Some(regs) => write_list(f, regs),
            // Out of range; keep the dump readable rather than panic.
            None => write!(f, "{{{}:{}}}", tuple, len),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, regs: &[RegisterIndex]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, reg) in regs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", reg)?;
    }
    write!(f, "}}")
}

impl fmt::Display for DisplayInst<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.inst.opcode();
        match self.inst {
            Instruction::Unary(inst) => {
                write!(f, "{}.{} {}, {}", opcode, inst.ty, inst.dst, inst.src)
            }
            Instruction::Binary(inst) => write!(
                f,
                "{}.{} {}, {}, {}",
                opcode, inst.ty, inst.dst, inst.src[0], inst.src[1]
            ),
            Instruction::Ternary(inst) => {
                write!(f, "{}.{} {}", opcode, inst.ty, inst.dst)?;
                match self.func.register_file().try_tuple_slice(inst.src, 3) {
                    Some(regs) => {
                        for reg in regs {
                            write!(f, ", {}", reg)?;
                        }
                        Ok(())
                    }
                    None => write!(f, ", {{{}:3}}", inst.src),
                }
            }
            Instruction::Convert(inst) => write!(
                f,
                "{}.{}.{} {}, {}",
                opcode, inst.dst_ty, inst.src_ty, inst.dst, inst.src
            ),
            Instruction::LoadImm(inst) => {
                write!(f, "{}.{} {}, {}", opcode, inst.ty, inst.dst, inst.value)
            }
            Instruction::Load(inst) => {
                write!(f, "{}.{}.{} ", opcode, inst.ty, inst.space)?;
                self.tuple(f, inst.values, inst.value_num())?;
                write!(f, ", [{}]", inst.address)
            }
            Instruction::Store(inst) => {
                write!(f, "{}.{}.{} [{}], ", opcode, inst.ty, inst.space, inst.address)?;
                self.tuple(f, inst.values, inst.value_num())
            }
            Instruction::Branch(inst) => match inst.predicate {
                Some(pred) => write!(f, "{} {}, {}", opcode, pred, inst.label),
                None => write!(f, "{} {}", opcode, inst.label),
            },
            Instruction::Label(inst) => write!(f, "{} {}", opcode, inst.label),
            Instruction::Texture(inst) => {
                write!(f, "{} ", opcode)?;
                self.tuple(f, inst.dst, inst.dst_num())?;
                write!(f, ", ")?;
                self.tuple(f, inst.src, inst.src_num())
            }
            Instruction::Fence(inst) => write!(f, "{}.{}", opcode, inst.space),
        }
    }
}
