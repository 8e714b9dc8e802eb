//! Unit parser.

use alloc::vec::Vec;

use nom::{
    bytes::complete::tag,
    character::complete::char,
    multi::many0,
    sequence::terminated,
    IResult,
};

use super::{
    function::{parse_function_internal, RawFunction},
    primitives::parse_pointer_size,
    whitespace::blank,
};
use crate::unit::PointerSize;

/// Parse a unit: unit ptr64 { functions... }. Consumes trailing blanks.
pub(crate) fn parse_unit_internal(input: &str) -> IResult<&str, (PointerSize, Vec<RawFunction<'_>>)> {
    let (input, _) = terminated(tag("unit"), blank)(input)?;
    let (input, pointer_size) = terminated(parse_pointer_size, blank)(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;
    let (input, functions) = many0(parse_function_internal)(input)?;
    let (input, _) = terminated(char('}'), blank)(input)?;
    Ok((input, (pointer_size, functions)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_internal() {
        let input = "unit ptr32 {\n\nfunction %a() {\n}\n\nfunction %b() {\nblock0:\n    fence.global\n}\n}\n";
        let result = parse_unit_internal(input);
        assert!(result.is_ok(), "parse_unit_internal failed: {:?}", result);
        let (remaining, (pointer_size, functions)) = result.unwrap();
        assert_eq!(remaining, "");
        assert_eq!(pointer_size, PointerSize::Ptr32);
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[1].name, "b");
    }

    #[test]
    fn test_parse_unit_requires_pointer_size() {
        assert!(parse_unit_internal("unit {\n}").is_err());
    }
}
