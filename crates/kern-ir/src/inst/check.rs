//! Per-instruction validity checks.

use thiserror::Error;

use super::{InstClass, Instruction, Opcode};
use crate::{
    entity::{EntityRef, LabelIndex, RegisterIndex, TupleIndex, ValueIndex},
    function::Function,
    register::Family,
    types::Type,
};

/// Largest number of values a single load or store may move.
pub const MAX_VALUE_NUM: usize = 16;

/// Why an instruction is not valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("{opcode} does not accept type {ty}")]
    UnsupportedType { opcode: Opcode, ty: Type },

    #[error("conversion from {ty} to itself")]
    IdentityConversion { ty: Type },

    #[error("{opcode} moves {count} values, expected 1 to {max}", max = MAX_VALUE_NUM)]
    ValueCount { opcode: Opcode, count: usize },

    #[error("texture access needs at least one source and one destination")]
    EmptyTexture,

    #[error("register {register} out of range ({reg_num} registers)")]
    RegisterOutOfRange {
        register: RegisterIndex,
        reg_num: usize,
    },

    #[error("tuple {tuple} of length {len} out of range ({tuple_num} tuple entries)")]
    TupleOutOfRange {
        tuple: TupleIndex,
        len: usize,
        tuple_num: usize,
    },

    #[error("register {register} is {found}, expected {expected}")]
    FamilyMismatch {
        register: RegisterIndex,
        expected: Family,
        found: Family,
    },

    #[error("immediate {value} out of range ({value_num} immediates)")]
    ValueOutOfRange { value: ValueIndex, value_num: usize },

    #[error("immediate {value} is {found}, expected {expected}")]
    ValueTypeMismatch {
        value: ValueIndex,
        expected: Type,
        found: Type,
    },

    #[error("label {label} out of range ({label_num} labels)")]
    LabelOutOfRange { label: LabelIndex, label_num: usize },
}

/// Which scalar types an opcode accepts.
fn accepts(opcode: Opcode, ty: Type) -> bool {
    match opcode {
        Opcode::And
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Shl
        | Opcode::Shr
        | Opcode::Asr
        | Opcode::Bsf
        | Opcode::Bsb
        | Opcode::Rem => ty.is_integer(),
        Opcode::Cos
        | Opcode::Sin
        | Opcode::Tan
        | Opcode::Log
        | Opcode::Sqr
        | Opcode::Rsq
        | Opcode::Exp2
        | Opcode::Pow
        | Opcode::Mad => ty.is_float(),
        _ => true,
    }
}

fn check_type(opcode: Opcode, ty: Type) -> Result<(), InstructionError> {
    if accepts(opcode, ty) {
        Ok(())
    } else {
        Err(InstructionError::UnsupportedType { opcode, ty })
    }
}

fn check_value_num(opcode: Opcode, count: usize) -> Result<(), InstructionError> {
    if (1..=MAX_VALUE_NUM).contains(&count) {
        Ok(())
    } else {
        Err(InstructionError::ValueCount { opcode, count })
    }
}

/// Operand checks that need the owning function's tables.
struct Operands<'a> {
    func: &'a Function,
}

impl<'a> Operands<'a> {
    fn register(&self, register: RegisterIndex) -> Result<Family, InstructionError> {
        let file = self.func.register_file();
        if !file.is_valid(register) {
            return Err(InstructionError::RegisterOutOfRange {
                register,
                reg_num: file.reg_num(),
            });
        }
        Ok(file.get(register).family())
    }

    fn typed(&self, register: RegisterIndex, ty: Type) -> Result<(), InstructionError> {
        self.family(register, ty.family())
    }

    fn family(&self, register: RegisterIndex, expected: Family) -> Result<(), InstructionError> {
        let found = self.register(register)?;
        if found != expected {
            return Err(InstructionError::FamilyMismatch {
                register,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn tuple(&self, tuple: TupleIndex, len: usize) -> Result<&'a [RegisterIndex], InstructionError> {
        let file = self.func.register_file();
        match file.try_tuple_slice(tuple, len) {
            Some(regs) => Ok(regs),
            None => Err(InstructionError::TupleOutOfRange {
                tuple,
                len,
                tuple_num: file.tuple_num(),
            }),
        }
    }

    fn typed_tuple(&self, tuple: TupleIndex, len: usize, ty: Type) -> Result<(), InstructionError> {
        for reg in self.tuple(tuple, len)? {
            self.typed(*reg, ty)?;
        }
        Ok(())
    }

    fn label(&self, label: LabelIndex) -> Result<(), InstructionError> {
        let label_num = self.func.label_num();
        if label.index() >= label_num {
            return Err(InstructionError::LabelOutOfRange { label, label_num });
        }
        Ok(())
    }
}

impl Instruction {
    /// Check the instruction on its own: opcode/type compatibility and
    /// operand counts. Does not look at any register or table.
    pub fn check(&self) -> Result<(), InstructionError> {
        match self {
            Instruction::Unary(inst) => check_type(inst.opcode, inst.ty),
            Instruction::Binary(inst) => check_type(inst.opcode, inst.ty),
            Instruction::Ternary(inst) => check_type(inst.opcode, inst.ty),
            Instruction::Convert(inst) => {
                if inst.dst_ty == inst.src_ty {
                    Err(InstructionError::IdentityConversion { ty: inst.dst_ty })
                } else {
                    Ok(())
                }
            }
            Instruction::Load(inst) => check_value_num(Opcode::Load, inst.value_num()),
            Instruction::Store(inst) => check_value_num(Opcode::Store, inst.value_num()),
            Instruction::Texture(inst) => {
                if inst.src_num == 0 || inst.dst_num == 0 {
                    Err(InstructionError::EmptyTexture)
                } else {
                    Ok(())
                }
            }
            Instruction::LoadImm(_)
            | Instruction::Branch(_)
            | Instruction::Label(_)
            | Instruction::Fence(_) => Ok(()),
        }
    }

    /// Check the instruction against the function it belongs to: every
    /// register, tuple, immediate and label it names must exist, and every
    /// register must have the family its type requires.
    ///
    /// Memory addresses are only checked for existence here. Their family
    /// depends on the unit's pointer size, see `verify`.
    pub fn well_formed(&self, func: &Function) -> Result<(), InstructionError> {
        self.check()?;
        let ops = Operands { func };
        match self {
            Instruction::Unary(inst) => {
                ops.typed(inst.dst, inst.ty)?;
                ops.typed(inst.src, inst.ty)
            }
            Instruction::Binary(inst) => {
                ops.typed(inst.dst, inst.ty)?;
                ops.typed(inst.src[0], inst.ty)?;
                ops.typed(inst.src[1], inst.ty)
            }
            Instruction::Ternary(inst) => {
                ops.typed(inst.dst, inst.ty)?;
                ops.typed_tuple(inst.src, 3, inst.ty)
            }
            Instruction::Convert(inst) => {
                ops.typed(inst.dst, inst.dst_ty)?;
                ops.typed(inst.src, inst.src_ty)
            }
            Instruction::LoadImm(inst) => {
                ops.typed(inst.dst, inst.ty)?;
                let value_num = func.value_num();
                if inst.value.index() >= value_num {
                    return Err(InstructionError::ValueOutOfRange {
                        value: inst.value,
                        value_num,
                    });
                }
                let found = func.get_value(inst.value).ty();
                if found != inst.ty {
                    return Err(InstructionError::ValueTypeMismatch {
                        value: inst.value,
                        expected: inst.ty,
                        found,
                    });
                }
                Ok(())
            }
            Instruction::Load(inst) => {
                ops.register(inst.address)?;
                ops.typed_tuple(inst.values, inst.value_num(), inst.ty)
            }
            Instruction::Store(inst) => {
                ops.register(inst.address)?;
                ops.typed_tuple(inst.values, inst.value_num(), inst.ty)
            }
            Instruction::Branch(inst) => {
                if let Some(pred) = inst.predicate {
                    ops.family(pred, Family::Bool)?;
                }
                ops.label(inst.label)
            }
            Instruction::Label(inst) => ops.label(inst.label),
            Instruction::Texture(inst) => {
                for reg in ops.tuple(inst.dst, inst.dst_num())? {
                    ops.register(*reg)?;
                }
                for reg in ops.tuple(inst.src, inst.src_num())? {
                    ops.register(*reg)?;
                }
                Ok(())
            }
            Instruction::Fence(_) => Ok(()),
        }
    }

    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        self.class() == InstClass::Branch
    }
}
