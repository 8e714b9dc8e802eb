//! Instruction parser.
//!
//! Instructions are parsed into `RawInst`, which still spells out register
//! lists. Tuples are only allocated once the enclosing function is built.

use alloc::vec::Vec;

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{map, map_opt, opt},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::{
    primitives::{
        comma, parse_address, parse_label, parse_register, parse_space, parse_type,
        parse_value_index,
    },
    whitespace::blank,
};
use crate::{
    entity::{LabelIndex, RegisterIndex, ValueIndex},
    inst::{InstClass, Opcode},
    types::{MemorySpace, Type},
};

/// Operands of one parsed instruction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawKind {
    Unary(Opcode, Type, RegisterIndex, RegisterIndex),
    Binary(Opcode, Type, RegisterIndex, [RegisterIndex; 2]),
    Ternary(Opcode, Type, RegisterIndex, [RegisterIndex; 3]),
    Convert(Type, Type, RegisterIndex, RegisterIndex),
    LoadImm(Type, RegisterIndex, ValueIndex),
    Load(Type, MemorySpace, Vec<RegisterIndex>, RegisterIndex),
    Store(Type, MemorySpace, RegisterIndex, Vec<RegisterIndex>),
    Branch(Option<RegisterIndex>, LabelIndex),
    Label(LabelIndex),
    Texture(Vec<RegisterIndex>, Vec<RegisterIndex>),
    Fence(MemorySpace),
}

/// A parsed instruction and where it started.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawInst<'a> {
    pub at: &'a str,
    pub kind: RawKind,
}

impl RawKind {
    /// Every register the instruction names
    pub fn registers(&self) -> Vec<RegisterIndex> {
        match self {
            RawKind::Unary(_, _, dst, src) | RawKind::Convert(_, _, dst, src) => {
                Vec::from([*dst, *src])
            }
            RawKind::Binary(_, _, dst, src) => Vec::from([*dst, src[0], src[1]]),
            RawKind::Ternary(_, _, dst, src) => Vec::from([*dst, src[0], src[1], src[2]]),
            RawKind::LoadImm(_, dst, _) => Vec::from([*dst]),
            RawKind::Load(_, _, values, address) | RawKind::Store(_, _, address, values) => {
                let mut regs = Vec::from([*address]);
                regs.extend_from_slice(values);
                regs
            }
            RawKind::Branch(pred, _) => pred.iter().copied().collect(),
            RawKind::Texture(dst, src) => dst.iter().chain(src).copied().collect(),
            RawKind::Label(_) | RawKind::Fence(_) => Vec::new(),
        }
    }

    /// The label the instruction names, if any
    pub fn label(&self) -> Option<LabelIndex> {
        match self {
            RawKind::Branch(_, label) | RawKind::Label(label) => Some(*label),
            _ => None,
        }
    }
}

fn opcode(input: &str) -> IResult<&str, Opcode> {
    map_opt(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        Opcode::from_mnemonic,
    )(input)
}

/// `.ty` suffix followed by blanks
fn suffix_type(input: &str) -> IResult<&str, Type> {
    preceded(char('.'), parse_type)(input)
}

fn suffix_space(input: &str) -> IResult<&str, MemorySpace> {
    preceded(char('.'), parse_space)(input)
}

/// A braced register list: {%1, %2}
fn register_list(input: &str) -> IResult<&str, Vec<RegisterIndex>> {
    delimited(
        terminated(char('{'), blank),
        separated_list0(comma, parse_register),
        preceded(blank, char('}')),
    )(input)
}

/// A braced register list with at least one element
fn register_list1(input: &str) -> IResult<&str, Vec<RegisterIndex>> {
    delimited(
        terminated(char('{'), blank),
        separated_list1(comma, parse_register),
        preceded(blank, char('}')),
    )(input)
}

fn operands(opcode: Opcode, input: &str) -> IResult<&str, RawKind> {
    match opcode.class() {
        InstClass::Unary => map(
            tuple((suffix_type, blank, parse_register, comma, parse_register)),
            |(ty, _, dst, _, src)| RawKind::Unary(opcode, ty, dst, src),
        )(input),
        InstClass::Binary => map(
            tuple((
                suffix_type,
                blank,
                parse_register,
                comma,
                parse_register,
                comma,
                parse_register,
            )),
            |(ty, _, dst, _, a, _, b)| RawKind::Binary(opcode, ty, dst, [a, b]),
        )(input),
        InstClass::Ternary => map(
            tuple((
                suffix_type,
                blank,
                parse_register,
                comma,
                parse_register,
                comma,
                parse_register,
                comma,
                parse_register,
            )),
            |(ty, _, dst, _, a, _, b, _, c)| RawKind::Ternary(opcode, ty, dst, [a, b, c]),
        )(input),
        InstClass::Convert => map(
            tuple((
                suffix_type,
                suffix_type,
                blank,
                parse_register,
                comma,
                parse_register,
            )),
            |(dst_ty, src_ty, _, dst, _, src)| RawKind::Convert(dst_ty, src_ty, dst, src),
        )(input),
        InstClass::LoadImm => map(
            tuple((suffix_type, blank, parse_register, comma, parse_value_index)),
            |(ty, _, dst, _, value)| RawKind::LoadImm(ty, dst, value),
        )(input),
        InstClass::Load => map(
            tuple((
                suffix_type,
                suffix_space,
                blank,
                register_list1,
                comma,
                parse_address,
            )),
            |(ty, space, _, values, _, address)| RawKind::Load(ty, space, values, address),
        )(input),
        InstClass::Store => map(
            tuple((
                suffix_type,
                suffix_space,
                blank,
                parse_address,
                comma,
                register_list1,
            )),
            |(ty, space, _, address, _, values)| RawKind::Store(ty, space, address, values),
        )(input),
        InstClass::Branch => map(
            preceded(blank, tuple((opt(terminated(parse_register, comma)), parse_label))),
            |(pred, label)| RawKind::Branch(pred, label),
        )(input),
        InstClass::Label => map(preceded(blank, parse_label), RawKind::Label)(input),
        InstClass::Texture => map(
            preceded(blank, tuple((register_list, comma, register_list))),
            |(dst, _, src)| RawKind::Texture(dst, src),
        )(input),
        InstClass::Fence => map(suffix_space, RawKind::Fence)(input),
    }
}

/// Parse one instruction. Does not consume trailing blanks.
pub(crate) fn parse_instruction(input: &str) -> IResult<&str, RawInst<'_>> {
    let at = input;
    let (input, opcode) = opcode(input)?;
    let (input, kind) = operands(opcode, input)?;
    Ok((input, RawInst { at, kind }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(i: u16) -> RegisterIndex {
        RegisterIndex::new(i)
    }

    fn kind(input: &str) -> RawKind {
        let result = parse_instruction(input);
        assert!(result.is_ok(), "parse_instruction failed: {:?}", result);
        let (remaining, inst) = result.unwrap();
        assert_eq!(remaining, "", "Should consume all input");
        inst.kind
    }

    #[test]
    fn test_parse_register_forms() {
        assert_eq!(
            kind("mov.f32 %1, %0"),
            RawKind::Unary(Opcode::Mov, Type::F32, reg(1), reg(0))
        );
        assert_eq!(
            kind("exp2.f64 %1,%0"),
            RawKind::Unary(Opcode::Exp2, Type::F64, reg(1), reg(0))
        );
        assert_eq!(
            kind("add.s32 %2, %0, %1"),
            RawKind::Binary(Opcode::Add, Type::S32, reg(2), [reg(0), reg(1)])
        );
        assert_eq!(
            kind("mad.f32 %2, %0, %1, %1"),
            RawKind::Ternary(Opcode::Mad, Type::F32, reg(2), [reg(0), reg(1), reg(1)])
        );
        assert_eq!(
            kind("cvt.s32.f32 %2, %1"),
            RawKind::Convert(Type::S32, Type::F32, reg(2), reg(1))
        );
        assert_eq!(
            kind("loadi.f32 %1, $0"),
            RawKind::LoadImm(Type::F32, reg(1), ValueIndex::new(0))
        );
    }

    #[test]
    fn test_parse_memory_forms() {
        assert_eq!(
            kind("load.f32.global {%1, %2}, [%0]"),
            RawKind::Load(Type::F32, MemorySpace::Global, Vec::from([reg(1), reg(2)]), reg(0))
        );
        assert_eq!(
            kind("store.u8.local [%0], {%3}"),
            RawKind::Store(Type::U8, MemorySpace::Local, reg(0), Vec::from([reg(3)]))
        );
        assert_eq!(kind("fence.private"), RawKind::Fence(MemorySpace::Private));
        assert!(parse_instruction("load.f32.global {}, [%0]").is_err());
    }

    #[test]
    fn test_parse_control_forms() {
        assert_eq!(kind("bra L0"), RawKind::Branch(None, LabelIndex::new(0)));
        assert_eq!(
            kind("bra %3, L1"),
            RawKind::Branch(Some(reg(3)), LabelIndex::new(1))
        );
        assert_eq!(kind("label L2"), RawKind::Label(LabelIndex::new(2)));
        assert_eq!(
            kind("tex {%1}, {%0, %2}"),
            RawKind::Texture(Vec::from([reg(1)]), Vec::from([reg(0), reg(2)]))
        );
    }

    #[test]
    fn test_parse_instruction_stops_at_block_header() {
        assert!(parse_instruction("block1:").is_err());
        assert!(parse_instruction("}").is_err());
        let (remaining, _) = parse_instruction("fence.global\nblock1:").unwrap();
        assert_eq!(remaining, "\nblock1:");
    }

    #[test]
    fn test_parse_instruction_rejects_bad_operands() {
        assert!(parse_instruction("mov.i32 %1, %0").is_err());
        assert!(parse_instruction("add.s32 %2, %0").is_err());
        assert!(parse_instruction("frob.s32 %2, %0").is_err());
        assert!(parse_instruction("load.f32.shared {%1}, [%0]").is_err());
    }

    #[test]
    fn test_raw_registers() {
        let raw = kind("store.f32.global [%0], {%1, %2}");
        assert_eq!(raw.registers(), [reg(0), reg(1), reg(2)]);
        assert_eq!(raw.label(), None);
        let raw = kind("bra %4, L3");
        assert_eq!(raw.registers(), [reg(4)]);
        assert_eq!(raw.label(), Some(LabelIndex::new(3)));
    }
}
