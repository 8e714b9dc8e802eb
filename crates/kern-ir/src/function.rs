//! Functions.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::{
    block::BasicBlock,
    entity::{LabelIndex, RegisterIndex, TupleIndex, ValueIndex},
    entity_map::PrimaryMap,
    inst::{DisplayInst, Instruction},
    register::{Family, Register, RegisterFile},
    value::Value,
};

/// A kernel function.
///
/// A function owns everything its instructions refer to by index: the
/// register file (registers and tuples), the immediate table and the label
/// space. All of them are append-only, so an index handed out once stays
/// valid for the lifetime of the function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    name: String,
    inputs: Vec<RegisterIndex>,
    outputs: Vec<RegisterIndex>,
    registers: RegisterFile,
    values: PrimaryMap<ValueIndex, Value>,
    labels: PrimaryMap<LabelIndex, ()>,
    blocks: Vec<BasicBlock>,
}

impl Function {
    /// Create an empty function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            registers: RegisterFile::new(),
            values: PrimaryMap::new(),
            labels: PrimaryMap::new(),
            blocks: Vec::new(),
        }
    }

    /// Whether `name` can be printed after `%` and parsed back: one or more
    /// ASCII letters, digits, `_`, `.` or `-`.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && name.chars().all(is_name_char)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input registers, in declaration order
    pub fn inputs(&self) -> &[RegisterIndex] {
        &self.inputs
    }

    /// Output registers, in declaration order
    pub fn outputs(&self) -> &[RegisterIndex] {
        &self.outputs
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Get a block by position.
    pub fn block(&self, index: usize) -> Option<&BasicBlock> {
        self.blocks.get(index)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// All instructions in block order.
    pub fn insts(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.blocks.iter().flat_map(|block| block.insts().iter())
    }

    pub fn register_file(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn reg_num(&self) -> usize {
        self.registers.reg_num()
    }

    pub fn tuple_num(&self) -> usize {
        self.registers.tuple_num()
    }

    pub fn value_num(&self) -> usize {
        self.values.len()
    }

    pub fn label_num(&self) -> usize {
        self.labels.len()
    }

    /// Register descriptor at `index`. Panics when out of range.
    pub fn get_register(&self, index: RegisterIndex) -> Register {
        self.registers.get(index)
    }

    /// Element `which` of `tuple`. Panics when out of range.
    pub fn get_register_index(&self, tuple: TupleIndex, which: usize) -> RegisterIndex {
        self.registers.get_tuple(tuple, which)
    }

    /// Immediate at `index`. Panics when out of range.
    pub fn get_value(&self, index: ValueIndex) -> Value {
        match self.values.get(index) {
            Some(value) => *value,
            None => panic!(
                "immediate {} out of range ({} immediates)",
                index,
                self.values.len()
            ),
        }
    }

    /// Immediates in allocation order.
    pub fn values(&self) -> impl Iterator<Item = (ValueIndex, Value)> + '_ {
        self.values.iter().map(|(index, value)| (index, *value))
    }

    pub fn new_register(&mut self, family: Family) -> RegisterIndex {
        self.registers.append(family)
    }

    pub fn new_tuple(&mut self, regs: &[RegisterIndex]) -> TupleIndex {
        self.registers.append_tuple(regs)
    }

    pub fn new_value(&mut self, value: Value) -> ValueIndex {
        self.values.push(value)
    }

    pub fn new_label(&mut self) -> LabelIndex {
        self.labels.push(())
    }

    pub fn push_input(&mut self, reg: RegisterIndex) {
        self.inputs.push(reg);
    }

    pub fn push_output(&mut self, reg: RegisterIndex) {
        self.outputs.push(reg);
    }

    /// Open a new, empty block at the end of the function.
    pub fn push_block(&mut self) -> usize {
        self.blocks.push(BasicBlock::new());
        self.blocks.len() - 1
    }

    /// Append an instruction to the last block.
    ///
    /// Panics if the function has no block yet.
    pub fn push_inst(&mut self, inst: Instruction) {
        match self.blocks.last_mut() {
            Some(block) => block.push(inst),
            None => panic!("function %{} has no block to append to", self.name),
        }
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn write_regs(f: &mut fmt::Formatter<'_>, regs: &[RegisterIndex]) -> fmt::Result {
    write!(f, "(")?;
    for (i, reg) in regs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", reg)?;
    }
    write!(f, ")")
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function %{}", self.name)?;
        write_regs(f, &self.inputs)?;
        if !self.outputs.is_empty() {
            write!(f, " -> ")?;
            write_regs(f, &self.outputs)?;
        }
        writeln!(f, " {{")?;

        for (index, reg) in self.registers.iter() {
            writeln!(f, "    reg {}: {}", index, reg.family())?;
        }
        for (index, value) in self.values.iter() {
            writeln!(f, "    imm {} = {}", index, value)?;
        }
        if !self.labels.is_empty() {
            writeln!(f, "    labels {}", self.labels.len())?;
        }

        for (i, block) in self.blocks.iter().enumerate() {
            writeln!(f, "block{}:", i)?;
            for inst in block.insts() {
                writeln!(f, "    {}", DisplayInst::new(inst, self))?;
            }
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec::Vec};

    use super::*;
    use crate::{inst::Opcode, types::Type};

    #[test]
    fn test_function_creation() {
        let func = Function::new("empty");
        assert_eq!(func.name(), "empty");
        assert_eq!(func.block_count(), 0);
        assert_eq!(func.reg_num(), 0);
        assert_eq!(func.insts().count(), 0);
    }

    #[test]
    fn test_valid_names() {
        for name in ["k", "my-kernel", "k.0", "_main2"] {
            assert!(Function::is_valid_name(name), "{}", name);
        }
        for name in ["", "a b", "k(", "%k", "k{"] {
            assert!(!Function::is_valid_name(name), "{:?}", name);
        }
    }

    #[test]
    fn test_function_tables() {
        let mut func = Function::new("k");
        let a = func.new_register(Family::DWord);
        let b = func.new_register(Family::QWord);
        let t = func.new_tuple(&[b, a]);
        let v = func.new_value(Value::from(7u32));
        let l = func.new_label();

        assert_eq!(func.get_register(b).family(), Family::QWord);
        assert_eq!(func.get_register_index(t, 1), a);
        assert_eq!(func.get_value(v).as_u32(), Some(7));
        assert_eq!(func.label_num(), 1);
        assert_eq!(l, LabelIndex::new(0));
        assert_eq!(func.tuple_num(), 2);
        assert_eq!(func.value_num(), 1);
    }

    #[test]
    fn test_insts_in_block_order() {
        let mut func = Function::new("k");
        let a = func.new_register(Family::DWord);
        func.push_block();
        func.push_inst(Instruction::unary(Opcode::Mov, Type::F32, a, a));
        func.push_block();
        func.push_inst(Instruction::unary(Opcode::Sin, Type::F32, a, a));
        func.push_inst(Instruction::unary(Opcode::Cos, Type::F32, a, a));

        let opcodes: Vec<_> = func.insts().map(|inst| inst.opcode()).collect();
        assert_eq!(opcodes, [Opcode::Mov, Opcode::Sin, Opcode::Cos]);
        assert_eq!(func.block(1).map(|b| b.inst_count()), Some(2));
    }

    #[test]
    #[should_panic(expected = "immediate $2 out of range (0 immediates)")]
    fn test_get_value_out_of_range() {
        let func = Function::new("k");
        func.get_value(ValueIndex::new(2));
    }

    #[test]
    #[should_panic(expected = "function %k has no block to append to")]
    fn test_push_inst_without_block() {
        let mut func = Function::new("k");
        func.push_inst(Instruction::label(LabelIndex::new(0)));
    }

    #[test]
    fn test_function_display() {
        let mut func = Function::new("scale");
        let x = func.new_register(Family::DWord);
        let y = func.new_register(Family::DWord);
        let k = func.new_value(Value::from(2.5f32));
        func.push_input(x);
        func.push_output(y);
        func.new_label();
        func.push_block();
        func.push_inst(Instruction::load_imm(Type::F32, y, k));
        func.push_inst(Instruction::binary(Opcode::Mul, Type::F32, y, x, y));

        let expected = "\
function %scale(%0) -> (%1) {
    reg %0: dword
    reg %1: dword
    imm $0 = f32 2.5
    labels 1
block0:
    loadi.f32 %1, $0
    mul.f32 %1, %0, %1
}
";
        assert_eq!(format!("{}", func), expected);
    }
}
