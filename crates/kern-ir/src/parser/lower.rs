//! Rebuilds a `Function` from its parsed form.
//!
//! Declarations must be dense and in order, as the printer writes them.
//! Tuples are allocated again in order of appearance, so a printed function
//! parses back to one that prints identically.

use alloc::{format, string::String};

use super::{
    error::{parse_error, ParseError},
    function::RawFunction,
    instructions::{RawInst, RawKind},
};
use crate::{
    entity::{EntityRef, RegisterIndex},
    function::Function,
    inst::Instruction,
};

struct Lowering<'a> {
    original: &'a str,
    func: Function,
}

impl<'a> Lowering<'a> {
    fn error(&self, at: &str, message: String) -> ParseError {
        parse_error(self.original, at, message)
    }

    fn check_registers(&self, at: &str, regs: &[RegisterIndex]) -> Result<(), ParseError> {
        for reg in regs {
            if !self.func.register_file().is_valid(*reg) {
                return Err(self.error(at, format!("undeclared register {}", reg)));
            }
        }
        Ok(())
    }

    fn lower_inst(&mut self, raw: &RawInst<'_>) -> Result<Instruction, ParseError> {
        self.check_registers(raw.at, &raw.kind.registers())?;
        let inst = match &raw.kind {
            RawKind::Unary(opcode, ty, dst, src) => Instruction::unary(*opcode, *ty, *dst, *src),
            RawKind::Binary(opcode, ty, dst, [a, b]) => {
                Instruction::binary(*opcode, *ty, *dst, *a, *b)
            }
            RawKind::Ternary(opcode, ty, dst, src) => {
                let tuple = self.func.new_tuple(src);
                Instruction::ternary(*opcode, *ty, *dst, tuple)
            }
            RawKind::Convert(dst_ty, src_ty, dst, src) => {
                Instruction::convert(*dst_ty, *src_ty, *dst, *src)
            }
            RawKind::LoadImm(ty, dst, value) => Instruction::load_imm(*ty, *dst, *value),
            RawKind::Load(ty, space, values, address) => {
                self.check_value_count(raw.at, values.len())?;
                let tuple = self.func.new_tuple(values);
                Instruction::load(*ty, *space, *address, tuple, values.len())
            }
            RawKind::Store(ty, space, address, values) => {
                self.check_value_count(raw.at, values.len())?;
                let tuple = self.func.new_tuple(values);
                Instruction::store(*ty, *space, *address, tuple, values.len())
            }
            RawKind::Branch(Some(pred), label) => Instruction::branch_if(*pred, *label),
            RawKind::Branch(None, label) => Instruction::branch(*label),
            RawKind::Label(label) => Instruction::label(*label),
            RawKind::Texture(dst, src) => {
                if dst.len() > u8::MAX as usize || src.len() > u8::MAX as usize {
                    return Err(self.error(raw.at, String::from("too many texture operands")));
                }
                let dst_tuple = self.func.new_tuple(dst);
                let src_tuple = self.func.new_tuple(src);
                Instruction::texture(dst_tuple, dst.len(), src_tuple, src.len())
            }
            RawKind::Fence(space) => Instruction::fence(*space),
        };
        Ok(inst)
    }

    fn check_value_count(&self, at: &str, count: usize) -> Result<(), ParseError> {
        if count > u16::MAX as usize {
            return Err(self.error(at, format!("{} values in one memory access", count)));
        }
        Ok(())
    }
}

pub(crate) fn lower_function(original: &str, raw: &RawFunction<'_>) -> Result<Function, ParseError> {
    let mut lowering = Lowering {
        original,
        func: Function::new(raw.name.clone()),
    };

    for decl in &raw.regs {
        let expected = lowering.func.reg_num();
        if decl.index.index() != expected {
            return Err(lowering.error(
                decl.at,
                format!("register {} declared out of order, expected %{}", decl.index, expected),
            ));
        }
        lowering.func.new_register(decl.family);
    }

    for decl in &raw.imms {
        let expected = lowering.func.value_num();
        if decl.index.index() != expected {
            return Err(lowering.error(
                decl.at,
                format!("immediate {} declared out of order, expected ${}", decl.index, expected),
            ));
        }
        lowering.func.new_value(decl.value);
    }

    // Without `labels N` the highest label named sets the count.
    let used = raw
        .blocks
        .iter()
        .flatten()
        .filter_map(|inst| inst.kind.label().map(|label| (inst.at, label)))
        .max_by_key(|(_, label)| label.index());
    let label_num = match (raw.labels, used) {
        (Some((_, count)), Some((at, label))) if label.index() >= count => {
            return Err(lowering.error(
                at,
                format!("label {} out of range ({} labels declared)", label, count),
            ));
        }
        (Some((at, count)), _) if count > u16::MAX as usize + 1 => {
            return Err(lowering.error(at, format!("{} labels declared", count)));
        }
        (Some((_, count)), _) => count,
        (None, used) => used.map_or(0, |(_, label)| label.index() + 1),
    };
    for _ in 0..label_num {
        lowering.func.new_label();
    }

    lowering.check_registers(raw.at, &raw.inputs)?;
    lowering.check_registers(raw.at, &raw.outputs)?;
    for reg in &raw.inputs {
        lowering.func.push_input(*reg);
    }
    for reg in &raw.outputs {
        lowering.func.push_output(*reg);
    }

    for block in &raw.blocks {
        lowering.func.push_block();
        for raw_inst in block {
            let inst = lowering.lower_inst(raw_inst)?;
            lowering.func.push_inst(inst);
        }
    }

    Ok(lowering.func)
}
