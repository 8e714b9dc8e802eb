//! Primitive parsers for names, indices, types and literals.

use alloc::string::{String, ToString};

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{map, map_opt, map_res},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::whitespace::blank;
use crate::{
    entity::{LabelIndex, RegisterIndex, ValueIndex},
    function::is_name_char,
    register::Family,
    types::{MemorySpace, Type},
    unit::PointerSize,
    value::Value,
};

fn digits(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit())(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

/// Parse a `,` with surrounding blanks
pub(crate) fn comma(input: &str) -> IResult<&str, ()> {
    map(tuple((blank, char(','), blank)), |_| ())(input)
}

/// Parse a scalar type (s8 ... f64)
pub(crate) fn parse_type(input: &str) -> IResult<&str, Type> {
    map_opt(word, |s| Type::ALL.into_iter().find(|ty| ty.name() == s))(input)
}

/// Parse a register family (bool, byte, word, dword, qword)
pub(crate) fn parse_family(input: &str) -> IResult<&str, Family> {
    map_opt(word, |s| {
        [
            Family::Bool,
            Family::Byte,
            Family::Word,
            Family::DWord,
            Family::QWord,
        ]
        .into_iter()
        .find(|family| family.name() == s)
    })(input)
}

/// Parse a memory space (global, local, private)
pub(crate) fn parse_space(input: &str) -> IResult<&str, MemorySpace> {
    map_opt(word, |s| {
        [MemorySpace::Global, MemorySpace::Local, MemorySpace::Private]
            .into_iter()
            .find(|space| space.name() == s)
    })(input)
}

/// Parse a pointer size (ptr32, ptr64)
pub(crate) fn parse_pointer_size(input: &str) -> IResult<&str, PointerSize> {
    map_opt(word, |s| {
        [PointerSize::Ptr32, PointerSize::Ptr64]
            .into_iter()
            .find(|size| size.name() == s)
    })(input)
}

/// Parse a register (%0, %1, etc.)
pub(crate) fn parse_register(input: &str) -> IResult<&str, RegisterIndex> {
    map(
        map_res(preceded(char('%'), digits), |s: &str| s.parse::<u16>()),
        RegisterIndex::new,
    )(input)
}

/// Parse an immediate reference ($0, $1, etc.)
pub(crate) fn parse_value_index(input: &str) -> IResult<&str, ValueIndex> {
    map(
        map_res(preceded(char('$'), digits), |s: &str| s.parse::<u32>()),
        ValueIndex::new,
    )(input)
}

/// Parse a label count (labels 2)
pub(crate) fn parse_label_count(input: &str) -> IResult<&str, usize> {
    map_res(preceded(terminated(tag("labels"), blank), digits), |s: &str| {
        s.parse::<usize>()
    })(input)
}

/// Parse a label (L0, L1, etc.)
pub(crate) fn parse_label(input: &str) -> IResult<&str, LabelIndex> {
    map(
        map_res(preceded(char('L'), digits), |s: &str| s.parse::<u16>()),
        LabelIndex::new,
    )(input)
}

/// Parse an address operand: [%0]
pub(crate) fn parse_address(input: &str) -> IResult<&str, RegisterIndex> {
    delimited(
        terminated(char('['), blank),
        parse_register,
        preceded(blank, char(']')),
    )(input)
}

/// Parse a function name (%name)
pub(crate) fn parse_function_name(input: &str) -> IResult<&str, String> {
    map(
        preceded(
            char('%'),
            take_while1(is_name_char),
        ),
        |s: &str| s.to_string(),
    )(input)
}

/// Parse a block header (block0, block1, etc.)
pub(crate) fn parse_block_index(input: &str) -> IResult<&str, u32> {
    map_res(preceded(tag("block"), digits), |s: &str| s.parse::<u32>())(input)
}

fn literal_of(ty: Type, s: &str) -> Option<Value> {
    Some(match ty {
        Type::S8 => s.parse::<i8>().ok()?.into(),
        Type::U8 => s.parse::<u8>().ok()?.into(),
        Type::S16 => s.parse::<i16>().ok()?.into(),
        Type::U16 => s.parse::<u16>().ok()?.into(),
        Type::S32 => s.parse::<i32>().ok()?.into(),
        Type::U32 => s.parse::<u32>().ok()?.into(),
        Type::S64 => s.parse::<i64>().ok()?.into(),
        Type::U64 => s.parse::<u64>().ok()?.into(),
        Type::F32 => s.parse::<f32>().ok()?.into(),
        Type::F64 => s.parse::<f64>().ok()?.into(),
    })
}

/// Parse a typed immediate: f32 3.14, s32 -7, ...
pub(crate) fn parse_immediate(input: &str) -> IResult<&str, Value> {
    let (input, ty) = terminated(parse_type, blank)(input)?;
    map_opt(
        take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.')),
        move |s: &str| literal_of(ty, s),
    )(input)
}
