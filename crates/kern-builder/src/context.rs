//! Function construction context.

use alloc::{format, string::String, vec::Vec};

use kern_ir::{
    EntityRef, Family, Function, Instruction, LabelIndex, MemorySpace, Opcode, RegisterIndex,
    TupleIndex, Type, Unit, Value, ValueIndex,
};

/// Per-label bookkeeping for the function under construction.
#[derive(Debug, Clone, Copy, Default)]
struct LabelState {
    used: bool,
    defined: bool,
}

/// A function being built, plus the state the emission rules need.
#[derive(Debug)]
struct FunctionState {
    func: Function,
    /// Whether the last block of `func` still accepts instructions.
    block_open: bool,
    labels: Vec<LabelState>,
}

impl FunctionState {
    fn new(name: String) -> Self {
        Self {
            func: Function::new(name),
            block_open: false,
            labels: Vec::new(),
        }
    }

    fn open_block(&mut self) {
        let index = self.func.push_block();
        self.block_open = true;
        log::trace!("%{}: opened block{}", self.func.name(), index);
    }

    fn label_state(&mut self, label: LabelIndex) -> &mut LabelState {
        let name = self.func.name();
        match self.labels.get_mut(label.index()) {
            Some(state) => state,
            None => panic!("label {} was not allocated in function %{}", label, name),
        }
    }
}

/// Builds functions into a `Unit`.
///
/// Functions are built one at a time: `start_function` opens a function and
/// `end_function` moves it into the unit. Starting a function while another
/// is open suspends the outer one; it becomes active again once the inner
/// function ends.
///
/// Instructions go into the open block of the active function. A new block
/// is opened for the first instruction, for every label, and for the first
/// instruction after a branch.
#[derive(Debug)]
pub struct Context<'u> {
    unit: &'u mut Unit,
    stack: Vec<FunctionState>,
}

impl<'u> Context<'u> {
    /// Create a context building into `unit`.
    pub fn new(unit: &'u mut Unit) -> Self {
        Self {
            unit,
            stack: Vec::new(),
        }
    }

    /// The unit being built into
    pub fn unit(&self) -> &Unit {
        self.unit
    }

    /// Number of functions currently open, the active one included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn active(&mut self) -> &mut FunctionState {
        match self.stack.last_mut() {
            Some(state) => state,
            None => panic!("no active function"),
        }
    }

    /// Begin a new function and make it the active one.
    ///
    /// # Panics
    ///
    /// Panics if the name is not a valid function name (see
    /// [`Function::is_valid_name`]), or if a function with the same name is
    /// already in the unit or still under construction.
    pub fn start_function(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !Function::is_valid_name(&name) {
            panic!("invalid function name {:?}", name);
        }
        if self.unit.contains(&name) || self.stack.iter().any(|s| s.func.name() == name) {
            panic!("function %{} already exists", name);
        }
        log::debug!("start function %{} (depth {})", name, self.stack.len() + 1);
        self.stack.push(FunctionState::new(name));
    }

    /// Seal the active function, add it to the unit and resume the function
    /// that was active before it, if any.
    ///
    /// # Panics
    ///
    /// Panics with no active function, or if a branch targets a label that
    /// was never placed.
    pub fn end_function(&mut self) {
        let state = match self.stack.pop() {
            Some(state) => state,
            None => panic!("end_function called with no active function"),
        };
        let func = state.func;

        let undefined: Vec<String> = state
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.used && !label.defined)
            .map(|(index, _)| format!("{}", LabelIndex::from_index(index)))
            .collect();
        if !undefined.is_empty() {
            panic!(
                "function %{} branches to undefined label(s): {}",
                func.name(),
                undefined.join(", ")
            );
        }

        log::debug!(
            "end function %{}: {} block(s), {} instruction(s), {} register(s)",
            func.name(),
            func.block_count(),
            func.insts().count(),
            func.reg_num()
        );
        self.unit.add_function(func);
    }

    /// The function under construction.
    pub fn function(&self) -> &Function {
        match self.stack.last() {
            Some(state) => &state.func,
            None => panic!("no active function"),
        }
    }

    /// Allocate a register in the active function.
    pub fn reg(&mut self, family: Family) -> RegisterIndex {
        self.active().func.new_register(family)
    }

    /// Allocate a label in the active function.
    pub fn label(&mut self) -> LabelIndex {
        let state = self.active();
        let label = state.func.new_label();
        state.labels.push(LabelState::default());
        label
    }

    /// Add an immediate to the active function's value table.
    pub fn immediate(&mut self, value: Value) -> ValueIndex {
        self.active().func.new_value(value)
    }

    /// Append `reg` to the active function's inputs.
    pub fn input(&mut self, reg: RegisterIndex) {
        let state = self.active();
        assert!(
            state.func.register_file().is_valid(reg),
            "input {} was not allocated in function %{}",
            reg,
            state.func.name()
        );
        state.func.push_input(reg);
    }

    /// Append `reg` to the active function's outputs.
    pub fn output(&mut self, reg: RegisterIndex) {
        let state = self.active();
        assert!(
            state.func.register_file().is_valid(reg),
            "output {} was not allocated in function %{}",
            reg,
            state.func.name()
        );
        state.func.push_output(reg);
    }

    /// Append a tuple to the active function's register file.
    pub fn tuple(&mut self, regs: &[RegisterIndex]) -> TupleIndex {
        self.active().func.new_tuple(regs)
    }

    /// Append an instruction to the active function, splitting blocks at
    /// labels and after branches.
    pub fn append(&mut self, inst: Instruction) {
        let state = self.active();
        match inst {
            Instruction::Label(label) => {
                let label = label.label();
                let slot = state.label_state(label);
                let redefined = slot.defined;
                slot.defined = true;
                if redefined {
                    panic!("label {} defined twice in function %{}", label, state.func.name());
                }
                log::trace!("%{}: defined {}", state.func.name(), label);
                state.block_open = false;
                state.open_block();
                state.func.push_inst(inst);
            }
            Instruction::Branch(branch) => {
                state.label_state(branch.label()).used = true;
                if !state.block_open {
                    state.open_block();
                }
                state.func.push_inst(inst);
                state.block_open = false;
            }
            _ => {
                if !state.block_open {
                    state.open_block();
                }
                state.func.push_inst(inst);
            }
        }
    }

    /// Fused multiply-add; allocates the source tuple.
    pub fn mad(
        &mut self,
        ty: Type,
        dst: RegisterIndex,
        src0: RegisterIndex,
        src1: RegisterIndex,
        src2: RegisterIndex,
    ) {
        let src = self.tuple(&[src0, src1, src2]);
        self.append(Instruction::ternary(Opcode::Mad, ty, dst, src));
    }

    /// Convert `src` from `src_ty` to `dst_ty`.
    pub fn cvt(&mut self, dst_ty: Type, src_ty: Type, dst: RegisterIndex, src: RegisterIndex) {
        self.append(Instruction::convert(dst_ty, src_ty, dst, src));
    }

    /// Load an immediate from the value table.
    pub fn loadi(&mut self, ty: Type, dst: RegisterIndex, value: ValueIndex) {
        self.append(Instruction::load_imm(ty, dst, value));
    }

    /// Load `dst.len()` values from `address`; allocates the value tuple.
    pub fn load(&mut self, ty: Type, space: MemorySpace, address: RegisterIndex, dst: &[RegisterIndex]) {
        let values = self.tuple(dst);
        self.append(Instruction::load(ty, space, address, values, dst.len()));
    }

    /// Store `src.len()` values at `address`; allocates the value tuple.
    pub fn store(&mut self, ty: Type, space: MemorySpace, address: RegisterIndex, src: &[RegisterIndex]) {
        let values = self.tuple(src);
        self.append(Instruction::store(ty, space, address, values, src.len()));
    }

    pub fn bra(&mut self, label: LabelIndex) {
        self.append(Instruction::branch(label));
    }

    pub fn bra_if(&mut self, predicate: RegisterIndex, label: LabelIndex) {
        self.append(Instruction::branch_if(predicate, label));
    }

    /// Place `label` here, starting a new block.
    pub fn label_here(&mut self, label: LabelIndex) {
        self.append(Instruction::label(label));
    }

    /// Texture access; allocates both tuples.
    pub fn tex(&mut self, dst: &[RegisterIndex], src: &[RegisterIndex]) {
        let dst_tuple = self.tuple(dst);
        let src_tuple = self.tuple(src);
        self.append(Instruction::texture(dst_tuple, dst.len(), src_tuple, src.len()));
    }

    pub fn fence(&mut self, space: MemorySpace) {
        self.append(Instruction::fence(space));
    }
}

macro_rules! unary_ops {
    ($($name:ident => $opcode:ident,)*) => {
        impl Context<'_> {
            $(
                pub fn $name(&mut self, ty: Type, dst: RegisterIndex, src: RegisterIndex) {
                    self.append(Instruction::unary(Opcode::$opcode, ty, dst, src));
                }
            )*
        }
    };
}

macro_rules! binary_ops {
    ($($name:ident => $opcode:ident,)*) => {
        impl Context<'_> {
            $(
                pub fn $name(
                    &mut self,
                    ty: Type,
                    dst: RegisterIndex,
                    src0: RegisterIndex,
                    src1: RegisterIndex,
                ) {
                    self.append(Instruction::binary(Opcode::$opcode, ty, dst, src0, src1));
                }
            )*
        }
    };
}

unary_ops! {
    mov => Mov,
    cos => Cos,
    sin => Sin,
    tan => Tan,
    log => Log,
    sqr => Sqr,
    rsq => Rsq,
    exp2 => Exp2,
}

binary_ops! {
    pow => Pow,
    mul => Mul,
    add => Add,
    sub => Sub,
    div => Div,
    rem => Rem,
    shl => Shl,
    shr => Shr,
    asr => Asr,
    bsf => Bsf,
    bsb => Bsb,
    or => Or,
    xor => Xor,
    and => And,
}

#[cfg(test)]
mod tests {
    use kern_ir::{BranchInst, LabelInst, PointerSize, UnaryInst};

    use super::*;

    #[test]
    fn test_first_instruction_opens_block() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let r = ctx.reg(Family::DWord);
        assert_eq!(ctx.function().block_count(), 0);
        ctx.mov(Type::S32, r, r);
        ctx.add(Type::S32, r, r, r);
        assert_eq!(ctx.function().block_count(), 1);
        ctx.end_function();
        assert_eq!(unit.get_function("k").map(|f| f.insts().count()), Some(2));
    }

    #[test]
    fn test_label_splits_block() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let r = ctx.reg(Family::DWord);
        let l = ctx.label();
        ctx.mov(Type::F32, r, r);
        ctx.label_here(l);
        ctx.sin(Type::F32, r, r);
        ctx.end_function();

        let func = unit.get_function("k").unwrap();
        assert_eq!(func.block_count(), 2);
        assert_eq!(func.block(0).unwrap().inst_count(), 1);
        let second = func.block(1).unwrap();
        assert!(second.insts()[0].is_member_of::<LabelInst>());
        assert_eq!(second.inst_count(), 2);
    }

    #[test]
    fn test_label_at_start_does_not_leave_empty_block() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let l = ctx.label();
        ctx.label_here(l);
        ctx.fence(MemorySpace::Global);
        ctx.end_function();

        let func = unit.get_function("k").unwrap();
        assert_eq!(func.block_count(), 1);
        assert_eq!(func.block(0).unwrap().inst_count(), 2);
    }

    #[test]
    fn test_branch_closes_block() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let p = ctx.reg(Family::Bool);
        let l = ctx.label();
        ctx.bra_if(p, l);
        ctx.fence(MemorySpace::Local);
        ctx.label_here(l);
        ctx.end_function();

        let func = unit.get_function("k").unwrap();
        assert_eq!(func.block_count(), 3);
        let bra = func.block(0).unwrap().insts()[0].cast::<BranchInst>();
        assert_eq!(bra.predicate(), Some(p));
        assert_eq!(func.block(1).unwrap().inst_count(), 1);
    }

    #[test]
    fn test_nested_functions_resume() {
        let mut unit = Unit::new(PointerSize::Ptr32);
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("outer");
        let a = ctx.reg(Family::DWord);
        ctx.start_function("inner");
        let b = ctx.reg(Family::Word);
        let c = ctx.reg(Family::Word);
        ctx.mov(Type::U16, c, b);
        assert_eq!(ctx.depth(), 2);
        ctx.end_function();

        assert_eq!(ctx.function().name(), "outer");
        let d = ctx.reg(Family::DWord);
        ctx.mov(Type::U32, d, a);
        ctx.end_function();
        assert_eq!(ctx.depth(), 0);

        let names: Vec<_> = unit.functions().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["inner", "outer"]);
        assert_eq!(unit.get_function("outer").unwrap().reg_num(), 2);
        let inst = unit.get_function("inner").unwrap().insts().next().copied().unwrap();
        assert_eq!(inst.cast::<UnaryInst>().dst(), c);
    }

    #[test]
    fn test_immediate_and_tuple() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let a = ctx.reg(Family::DWord);
        let b = ctx.reg(Family::DWord);
        let t = ctx.tuple(&[b, a]);
        let v = ctx.immediate(Value::from(2u32));
        assert_eq!(ctx.function().get_register_index(t, 0), b);
        assert_eq!(ctx.function().get_value(v), Value::from(2u32));
        ctx.end_function();
    }

    #[test]
    #[should_panic(expected = "no active function")]
    fn test_reg_without_function() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.reg(Family::DWord);
    }

    #[test]
    #[should_panic(expected = "no active function")]
    fn test_tuple_after_end_function() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let r = ctx.reg(Family::DWord);
        ctx.end_function();
        ctx.tuple(&[r]);
    }

    #[test]
    #[should_panic(expected = "end_function called with no active function")]
    fn test_end_without_start() {
        let mut unit = Unit::default();
        Context::new(&mut unit).end_function();
    }

    #[test]
    #[should_panic(expected = "function %k already exists")]
    fn test_duplicate_open_function() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        ctx.start_function("k");
    }

    #[test]
    #[should_panic(expected = "label L0 defined twice in function %k")]
    fn test_label_defined_twice() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let l = ctx.label();
        ctx.label_here(l);
        ctx.label_here(l);
    }

    #[test]
    #[should_panic(expected = "function %k branches to undefined label(s): L1")]
    fn test_branch_to_undefined_label() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        let l0 = ctx.label();
        let l1 = ctx.label();
        ctx.bra(l0);
        ctx.bra(l1);
        ctx.label_here(l0);
        ctx.end_function();
    }

    #[test]
    #[should_panic(expected = "label L3 was not allocated in function %k")]
    fn test_unallocated_label() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        ctx.bra(LabelIndex::new(3));
    }

    #[test]
    #[should_panic(expected = "input %0 was not allocated in function %k")]
    fn test_input_not_allocated() {
        let mut unit = Unit::default();
        let mut ctx = Context::new(&mut unit);
        ctx.start_function("k");
        ctx.input(RegisterIndex::new(0));
    }
}
