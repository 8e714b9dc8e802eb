//! Block parser.

use alloc::vec::Vec;

use nom::{
    character::complete::char,
    multi::many0,
    sequence::terminated,
    IResult,
};

use super::{
    instructions::{parse_instruction, RawInst},
    primitives::parse_block_index,
    whitespace::blank,
};

/// Parse a block: its header and the instructions up to the next header or
/// the closing brace. Consumes trailing blanks.
pub(crate) fn parse_block(input: &str) -> IResult<&str, Vec<RawInst<'_>>> {
    let (input, _block_index) = terminated(parse_block_index, blank)(input)?;
    let (input, _) = terminated(char(':'), blank)(input)?;
    many0(terminated(parse_instruction, blank))(input)
}
