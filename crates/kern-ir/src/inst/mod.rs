//! Fixed-width instructions.
//!
//! Every instruction is one `Instruction` value of constant size. The opcode
//! selects one of eleven operand shapes, each a small `Copy` struct wrapped by
//! one `Instruction` variant. Operands that do not fit in the cell (three
//! sources, several loaded or stored values, immediates) live out of line in
//! the owning `Function` and are referenced by index.

mod check;
mod display;
mod opcode;

use core::any::type_name;

pub use check::{InstructionError, MAX_VALUE_NUM};
pub use display::DisplayInst;
pub use opcode::{InstClass, Opcode};

use crate::{
    entity::{LabelIndex, RegisterIndex, TupleIndex, ValueIndex},
    function::Function,
    register::Register,
    types::{MemorySpace, Type},
    value::Value,
};

/// One-source arithmetic: `dst = op(src)`. Destination and source share `ty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnaryInst {
    opcode: Opcode,
    ty: Type,
    dst: RegisterIndex,
    src: RegisterIndex,
}

impl UnaryInst {
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn dst(&self) -> RegisterIndex {
        self.dst
    }

    pub fn src(&self) -> RegisterIndex {
        self.src
    }
}

/// Two-source arithmetic and logic: `dst = src0 op src1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryInst {
    opcode: Opcode,
    ty: Type,
    dst: RegisterIndex,
    src: [RegisterIndex; 2],
}

impl BinaryInst {
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn dst(&self) -> RegisterIndex {
        self.dst
    }

    pub fn src(&self) -> [RegisterIndex; 2] {
        self.src
    }
}

/// Three-source arithmetic (MAD). The sources do not fit in the cell and are
/// stored as a three-element tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TernaryInst {
    opcode: Opcode,
    ty: Type,
    dst: RegisterIndex,
    src: TupleIndex,
}

impl TernaryInst {
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn dst(&self) -> RegisterIndex {
        self.dst
    }

    /// Tuple holding the three sources
    pub fn src_tuple(&self) -> TupleIndex {
        self.src
    }
}

/// Conversion from `src_ty` to `dst_ty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvertInst {
    dst_ty: Type,
    src_ty: Type,
    dst: RegisterIndex,
    src: RegisterIndex,
}

impl ConvertInst {
    pub fn dst_ty(&self) -> Type {
        self.dst_ty
    }

    pub fn src_ty(&self) -> Type {
        self.src_ty
    }

    pub fn dst(&self) -> RegisterIndex {
        self.dst
    }

    pub fn src(&self) -> RegisterIndex {
        self.src
    }
}

/// Loads an immediate into `dst`. The immediate itself sits in the owning
/// function's value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadImmInst {
    ty: Type,
    dst: RegisterIndex,
    value: ValueIndex,
}

impl LoadImmInst {
    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn dst(&self) -> RegisterIndex {
        self.dst
    }

    pub fn value_index(&self) -> ValueIndex {
        self.value
    }

    /// Resolve the immediate through the owning function.
    pub fn value(&self, func: &Function) -> Value {
        func.get_value(self.value)
    }
}

/// Loads `value_num` contiguous values of type `ty` from `address`. The
/// destinations are a tuple, one register per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadInst {
    ty: Type,
    space: MemorySpace,
    address: RegisterIndex,
    values: TupleIndex,
    value_num: u16,
}

impl LoadInst {
    /// Type of every loaded value
    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn space(&self) -> MemorySpace {
        self.space
    }

    pub fn address(&self) -> RegisterIndex {
        self.address
    }

    pub fn values(&self) -> TupleIndex {
        self.values
    }

    pub fn value_num(&self) -> usize {
        self.value_num as usize
    }

    /// Register receiving loaded value `which`
    pub fn value(&self, func: &Function, which: usize) -> RegisterIndex {
        assert!(which < self.value_num(), "load value {} out of range", which);
        func.get_register_index(self.values, which)
    }
}

/// Stores `value_num` contiguous values of type `ty` at `address`. The first
/// logical source is the address, the remaining sources are the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreInst {
    ty: Type,
    space: MemorySpace,
    address: RegisterIndex,
    values: TupleIndex,
    value_num: u16,
}

impl StoreInst {
    /// Type of every stored value
    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn space(&self) -> MemorySpace {
        self.space
    }

    pub fn address(&self) -> RegisterIndex {
        self.address
    }

    pub fn values(&self) -> TupleIndex {
        self.values
    }

    pub fn value_num(&self) -> usize {
        self.value_num as usize
    }

    /// Register holding stored value `which`
    pub fn value(&self, func: &Function, which: usize) -> RegisterIndex {
        assert!(which < self.value_num(), "store value {} out of range", which);
        func.get_register_index(self.values, which)
    }
}

/// Branch to `label`, conditional when a predicate register is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchInst {
    predicate: Option<RegisterIndex>,
    label: LabelIndex,
}

impl BranchInst {
    pub fn is_predicated(&self) -> bool {
        self.predicate.is_some()
    }

    pub fn predicate(&self) -> Option<RegisterIndex> {
        self.predicate
    }

    pub fn label(&self) -> LabelIndex {
        self.label
    }
}

/// No-op marker that branches may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelInst {
    label: LabelIndex,
}

impl LabelInst {
    pub fn label(&self) -> LabelIndex {
        self.label
    }
}

/// Texture access. Sampler and coordinate operands are opaque tuples at this
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureInst {
    dst: TupleIndex,
    src: TupleIndex,
    dst_num: u8,
    src_num: u8,
}

impl TextureInst {
    pub fn dst_tuple(&self) -> TupleIndex {
        self.dst
    }

    pub fn src_tuple(&self) -> TupleIndex {
        self.src
    }

    pub fn dst_num(&self) -> usize {
        self.dst_num as usize
    }

    pub fn src_num(&self) -> usize {
        self.src_num as usize
    }
}

/// Orders the loads and stores of one memory space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FenceInst {
    space: MemorySpace,
}

impl FenceInst {
    pub fn space(&self) -> MemorySpace {
        self.space
    }
}

/// One instruction cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Unary(UnaryInst),
    Binary(BinaryInst),
    Ternary(TernaryInst),
    Convert(ConvertInst),
    LoadImm(LoadImmInst),
    Load(LoadInst),
    Store(StoreInst),
    Branch(BranchInst),
    Label(LabelInst),
    Texture(TextureInst),
    Fence(FenceInst),
}

// Every opcode occupies the same cell.
const _: () = assert!(core::mem::size_of::<Instruction>() <= 16);

fn expect_class(opcode: Opcode, class: InstClass) {
    if opcode.class() != class {
        panic!(
            "opcode {} is a {:?} instruction, not {:?}",
            opcode,
            opcode.class(),
            class
        );
    }
}

fn value_count(value_num: usize) -> u16 {
    match u16::try_from(value_num) {
        Ok(n) if n > 0 => n,
        _ => panic!("memory access must move between 1 and 65535 values, got {}", value_num),
    }
}

impl Instruction {
    /// Build a unary instruction. Panics if `opcode` is not unary.
    pub fn unary(opcode: Opcode, ty: Type, dst: RegisterIndex, src: RegisterIndex) -> Self {
        expect_class(opcode, InstClass::Unary);
        Instruction::Unary(UnaryInst {
            opcode,
            ty,
            dst,
            src,
        })
    }

    /// Build a binary instruction. Panics if `opcode` is not binary.
    pub fn binary(
        opcode: Opcode,
        ty: Type,
        dst: RegisterIndex,
        src0: RegisterIndex,
        src1: RegisterIndex,
    ) -> Self {
        expect_class(opcode, InstClass::Binary);
        Instruction::Binary(BinaryInst {
            opcode,
            ty,
            dst,
            src: [src0, src1],
        })
    }

    /// Build a ternary instruction whose three sources start at `src`.
    pub fn ternary(opcode: Opcode, ty: Type, dst: RegisterIndex, src: TupleIndex) -> Self {
        expect_class(opcode, InstClass::Ternary);
        Instruction::Ternary(TernaryInst {
            opcode,
            ty,
            dst,
            src,
        })
    }

    pub fn convert(dst_ty: Type, src_ty: Type, dst: RegisterIndex, src: RegisterIndex) -> Self {
        Instruction::Convert(ConvertInst {
            dst_ty,
            src_ty,
            dst,
            src,
        })
    }

    pub fn load_imm(ty: Type, dst: RegisterIndex, value: ValueIndex) -> Self {
        Instruction::LoadImm(LoadImmInst { ty, dst, value })
    }

    /// Load `value_num` values into the registers of tuple `values`.
    pub fn load(
        ty: Type,
        space: MemorySpace,
        address: RegisterIndex,
        values: TupleIndex,
        value_num: usize,
    ) -> Self {
        Instruction::Load(LoadInst {
            ty,
            space,
            address,
            values,
            value_num: value_count(value_num),
        })
    }

    /// Store the `value_num` registers of tuple `values`.
    pub fn store(
        ty: Type,
        space: MemorySpace,
        address: RegisterIndex,
        values: TupleIndex,
        value_num: usize,
    ) -> Self {
        Instruction::Store(StoreInst {
            ty,
            space,
            address,
            values,
            value_num: value_count(value_num),
        })
    }

    /// Unconditional branch
    pub fn branch(label: LabelIndex) -> Self {
        Instruction::Branch(BranchInst {
            predicate: None,
            label,
        })
    }

    /// Branch taken when `predicate` is set
    pub fn branch_if(predicate: RegisterIndex, label: LabelIndex) -> Self {
        Instruction::Branch(BranchInst {
            predicate: Some(predicate),
            label,
        })
    }

    pub fn label(label: LabelIndex) -> Self {
        Instruction::Label(LabelInst { label })
    }

    pub fn texture(dst: TupleIndex, dst_num: usize, src: TupleIndex, src_num: usize) -> Self {
        let count = |n: usize| match u8::try_from(n) {
            Ok(n) => n,
            Err(_) => panic!("texture instruction takes at most 255 operands, got {}", n),
        };
        Instruction::Texture(TextureInst {
            dst,
            src,
            dst_num: count(dst_num),
            src_num: count(src_num),
        })
    }

    pub fn fence(space: MemorySpace) -> Self {
        Instruction::Fence(FenceInst { space })
    }

    /// Get the instruction opcode
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Unary(inst) => inst.opcode,
            Instruction::Binary(inst) => inst.opcode,
            Instruction::Ternary(inst) => inst.opcode,
            Instruction::Convert(_) => Opcode::Cvt,
            Instruction::LoadImm(_) => Opcode::LoadI,
            Instruction::Load(_) => Opcode::Load,
            Instruction::Store(_) => Opcode::Store,
            Instruction::Branch(_) => Opcode::Bra,
            Instruction::Label(_) => Opcode::Label,
            Instruction::Texture(_) => Opcode::Tex,
            Instruction::Fence(_) => Opcode::Fence,
        }
    }

    /// Variant holding the operands
    pub fn class(&self) -> InstClass {
        self.opcode().class()
    }

    /// Number of source operands
    pub fn src_num(&self) -> usize {
        match self {
            Instruction::Unary(_) | Instruction::Convert(_) | Instruction::Load(_) => 1,
            Instruction::Binary(_) => 2,
            Instruction::Ternary(_) => 3,
            Instruction::Store(inst) => 1 + inst.value_num(),
            Instruction::Branch(inst) => inst.is_predicated() as usize,
            Instruction::Texture(inst) => inst.src_num(),
            Instruction::LoadImm(_) | Instruction::Label(_) | Instruction::Fence(_) => 0,
        }
    }

    /// Number of destination operands
    pub fn dst_num(&self) -> usize {
        match self {
            Instruction::Unary(_)
            | Instruction::Binary(_)
            | Instruction::Ternary(_)
            | Instruction::Convert(_)
            | Instruction::LoadImm(_) => 1,
            Instruction::Load(inst) => inst.value_num(),
            Instruction::Texture(inst) => inst.dst_num(),
            Instruction::Store(_)
            | Instruction::Branch(_)
            | Instruction::Label(_)
            | Instruction::Fence(_) => 0,
        }
    }

    /// Register index of source `which`. Panics if `which >= src_num()`.
    pub fn src_index(&self, func: &Function, which: usize) -> RegisterIndex {
        if which >= self.src_num() {
            panic!(
                "source {} out of range for {} ({} sources)",
                which,
                self.opcode(),
                self.src_num()
            );
        }
        match self {
            Instruction::Unary(inst) => inst.src,
            Instruction::Binary(inst) => inst.src[which],
            Instruction::Ternary(inst) => func.get_register_index(inst.src, which),
            Instruction::Convert(inst) => inst.src,
            Instruction::Load(inst) => inst.address,
            Instruction::Store(inst) if which == 0 => inst.address,
            Instruction::Store(inst) => func.get_register_index(inst.values, which - 1),
            Instruction::Branch(BranchInst {
                predicate: Some(pred),
                ..
            }) => *pred,
            Instruction::Texture(inst) => func.get_register_index(inst.src, which),
            Instruction::Branch(_)
            | Instruction::LoadImm(_)
            | Instruction::Label(_)
            | Instruction::Fence(_) => unreachable!("{} has no sources", self.opcode()),
        }
    }

    /// Register index of destination `which`. Panics if `which >= dst_num()`.
    pub fn dst_index(&self, func: &Function, which: usize) -> RegisterIndex {
        if which >= self.dst_num() {
            panic!(
                "destination {} out of range for {} ({} destinations)",
                which,
                self.opcode(),
                self.dst_num()
            );
        }
        match self {
            Instruction::Unary(inst) => inst.dst,
            Instruction::Binary(inst) => inst.dst,
            Instruction::Ternary(inst) => inst.dst,
            Instruction::Convert(inst) => inst.dst,
            Instruction::LoadImm(inst) => inst.dst,
            Instruction::Load(inst) => func.get_register_index(inst.values, which),
            Instruction::Texture(inst) => func.get_register_index(inst.dst, which),
            Instruction::Store(_)
            | Instruction::Branch(_)
            | Instruction::Label(_)
            | Instruction::Fence(_) => unreachable!("{} has no destinations", self.opcode()),
        }
    }

    /// Register descriptor of source `which`
    pub fn src(&self, func: &Function, which: usize) -> Register {
        func.get_register(self.src_index(func, which))
    }

    /// Register descriptor of destination `which`
    pub fn dst(&self, func: &Function, which: usize) -> Register {
        func.get_register(self.dst_index(func, which))
    }

    /// Whether this instruction is held by variant `V`.
    pub fn is_member_of<V: InstVariant>(&self) -> bool {
        V::is_class_of(self)
    }

    /// View this instruction as variant `V`. Panics on a mismatch.
    pub fn cast<V: InstVariant>(&self) -> &V {
        match V::from_inst(self) {
            Some(inst) => inst,
            None => panic!(
                "cannot view {} instruction as {}",
                self.opcode(),
                type_name::<V>()
            ),
        }
    }

    /// View this instruction as variant `V`, if it is one.
    pub fn try_cast<V: InstVariant>(&self) -> Option<&V> {
        V::from_inst(self)
    }
}

/// Implemented by each variant struct to recover it from an `Instruction`.
pub trait InstVariant: Sized {
    /// Operand shape of this variant
    const CLASS: InstClass;

    /// Whether `inst` holds this variant
    fn is_class_of(inst: &Instruction) -> bool {
        inst.class() == Self::CLASS
    }

    fn from_inst(inst: &Instruction) -> Option<&Self>;
}

macro_rules! inst_variant {
    ($($ty:ident => $variant:ident,)*) => {
        $(
            impl InstVariant for $ty {
                const CLASS: InstClass = InstClass::$variant;

                fn from_inst(inst: &Instruction) -> Option<&Self> {
                    match inst {
                        Instruction::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Instruction {
                fn from(inst: $ty) -> Self {
                    Instruction::$variant(inst)
                }
            }
        )*
    };
}

inst_variant! {
    UnaryInst => Unary,
    BinaryInst => Binary,
    TernaryInst => Ternary,
    ConvertInst => Convert,
    LoadImmInst => LoadImm,
    LoadInst => Load,
    StoreInst => Store,
    BranchInst => Branch,
    LabelInst => Label,
    TextureInst => Texture,
    FenceInst => Fence,
}
