//! Function parser.

use alloc::{string::String, vec::Vec};

use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::opt,
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::{
    block::parse_block,
    instructions::RawInst,
    primitives::{
        comma, parse_family, parse_function_name, parse_immediate, parse_label_count,
        parse_register, parse_value_index,
    },
    whitespace::blank,
};
use crate::{
    entity::{RegisterIndex, ValueIndex},
    register::Family,
    value::Value,
};

/// A register declaration: reg %0: qword
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegDecl<'a> {
    pub at: &'a str,
    pub index: RegisterIndex,
    pub family: Family,
}

/// An immediate declaration: imm $0 = f32 3.14
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImmDecl<'a> {
    pub at: &'a str,
    pub index: ValueIndex,
    pub value: Value,
}

/// A function as written, before its tables are rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawFunction<'a> {
    pub at: &'a str,
    pub name: String,
    pub inputs: Vec<RegisterIndex>,
    pub outputs: Vec<RegisterIndex>,
    pub regs: Vec<RegDecl<'a>>,
    pub imms: Vec<ImmDecl<'a>>,
    /// `labels N`, with the text it was read from
    pub labels: Option<(&'a str, usize)>,
    pub blocks: Vec<Vec<RawInst<'a>>>,
}

/// Parse a parenthesized register list: (%0, %1)
fn parse_register_tuple(input: &str) -> IResult<&str, Vec<RegisterIndex>> {
    delimited(
        terminated(char('('), blank),
        separated_list0(comma, parse_register),
        preceded(blank, char(')')),
    )(input)
}

fn parse_reg_decl(input: &str) -> IResult<&str, RegDecl<'_>> {
    let at = input;
    let (input, (_, _, index, _, _, _, family)) = tuple((
        tag("reg"),
        blank,
        parse_register,
        blank,
        char(':'),
        blank,
        parse_family,
    ))(input)?;
    Ok((input, RegDecl { at, index, family }))
}

fn parse_imm_decl(input: &str) -> IResult<&str, ImmDecl<'_>> {
    let at = input;
    let (input, (_, _, index, _, _, _, value)) = tuple((
        tag("imm"),
        blank,
        parse_value_index,
        blank,
        char('='),
        blank,
        parse_immediate,
    ))(input)?;
    Ok((input, ImmDecl { at, index, value }))
}

/// Parse a function. Consumes trailing blanks.
pub(crate) fn parse_function_internal(input: &str) -> IResult<&str, RawFunction<'_>> {
    let at = input;
    let (input, _) = terminated(tag("function"), blank)(input)?;
    let (input, name) = terminated(parse_function_name, blank)(input)?;
    let (input, inputs) = terminated(parse_register_tuple, blank)(input)?;
    let (input, outputs) = opt(preceded(
        terminated(tag("->"), blank),
        terminated(parse_register_tuple, blank),
    ))(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;

    let (input, regs) = many0(terminated(parse_reg_decl, blank))(input)?;
    let (input, imms) = many0(terminated(parse_imm_decl, blank))(input)?;
    let labels_at = input;
    let (input, labels) = opt(terminated(parse_label_count, blank))(input)?;
    let (input, blocks) = many0(parse_block)(input)?;

    let (input, _) = terminated(char('}'), blank)(input)?;

    Ok((
        input,
        RawFunction {
            at,
            name,
            inputs,
            outputs: outputs.unwrap_or_default(),
            regs,
            imms,
            labels: labels.map(|count| (labels_at, count)),
            blocks,
        },
    ))
}
